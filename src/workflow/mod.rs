pub mod generation_flow;
pub mod session;

pub use generation_flow::{Generation, GenerationFlow};
pub use session::Session;
