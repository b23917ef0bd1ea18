pub mod document_reader;
pub mod export;
pub mod llm_service;
pub mod prompt;
pub mod response_parser;
pub mod verdict;

pub use llm_service::{LlmService, TextGenerator};
pub use response_parser::{parse_response, ParseOutcome};
