//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Memory store error
    #[error("Store error: {0}")]
    Store(#[from] remit_memory::StoreError),

    /// Batch processing error
    #[error("Processing error: {0}")]
    Extractor(#[from] remit_extractor::ExtractorError),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] remit_llm::LlmError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
