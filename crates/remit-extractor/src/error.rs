//! Error types for the extractor

use remit_report::ReportError;
use thiserror::Error;

/// Errors that can occur during extraction and batch processing
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Document loader error
    #[error("Loader error: {0}")]
    Loader(String),

    /// Extraction timeout
    #[error("Extraction timeout")]
    Timeout,

    /// The model's response is not a valid invoice object
    #[error("Invalid invoice format: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Report sink failure, surfaced after store state is persisted
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}
