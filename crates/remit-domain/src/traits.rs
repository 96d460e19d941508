//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use std::path::Path;

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (remit-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate a text completion for a fully assembled prompt
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;
}

/// Trait for turning a source document into raw text
///
/// Text extraction itself (PDF parsing etc.) is an external concern;
/// implementations hand the pipeline a plain string to work with.
pub trait DocumentLoader {
    /// Error type for load operations
    type Error;

    /// Read the document at `path` and return its text content
    fn load_text(&self, path: &Path) -> Result<String, Self::Error>;
}
