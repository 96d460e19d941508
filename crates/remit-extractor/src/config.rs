//! Configuration for the processing pipeline

use remit_memory::RunSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the batch processor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Extract with the LLM; when false, invoices come from the mock source
    pub use_llm: bool,

    /// Skip files the memory store has already seen
    pub skip_already_processed: bool,

    /// Maximum time for a single extraction call (seconds)
    pub extraction_timeout_secs: u64,

    /// Parser version tag recorded with each run
    pub parser_version: String,

    /// Application identifier recorded with each run
    pub app: String,
}

impl ProcessorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// The run snapshot this configuration produces
    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            app: self.app.clone(),
            parser_version: self.parser_version.clone(),
            use_llm: self.use_llm,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        if self.app.is_empty() {
            return Err("app must not be empty".to_string());
        }
        if self.parser_version.is_empty() {
            return Err("parser_version must not be empty".to_string());
        }
        Ok(())
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            use_llm: false,
            skip_already_processed: false,
            extraction_timeout_secs: 120,
            parser_version: "v1".to_string(),
            app: "remit".to_string(),
        }
    }
}
