pub mod request;
pub mod test_case;

pub use request::{
    GenerationRequest, ModelVariant, ResponseShape, TestCaseCategory, DEFAULT_CASE_COUNT,
    DOCUMENT_COLUMNS, MAX_CASE_COUNT, MIN_CASE_COUNT,
};
pub use test_case::{Batch, TestCase};
