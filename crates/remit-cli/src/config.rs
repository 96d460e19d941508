//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Memory store path
    #[serde(default = "default_memory_path")]
    pub memory_path: PathBuf,

    /// Directory of input documents
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Report artifact path
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,

    /// Model used for LLM extraction
    #[serde(default = "default_model")]
    pub model: String,

    /// API endpoint override (proxies, test servers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Extract with the LLM by default
    #[serde(default)]
    pub use_llm: bool,

    /// Skip already-processed files by default
    #[serde(default)]
    pub skip_already_processed: bool,
}

impl Config {
    /// Get the configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".remit").join("config.toml"))
    }

    /// Load configuration from file or create default.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, contents)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory_path: default_memory_path(),
            input_dir: default_input_dir(),
            report_path: default_report_path(),
            model: default_model(),
            endpoint: None,
            use_llm: false,
            skip_already_processed: false,
        }
    }
}

fn default_memory_path() -> PathBuf {
    PathBuf::from("memory_bank.json")
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("invoices")
}

fn default_report_path() -> PathBuf {
    PathBuf::from("invoices.json")
}

fn default_model() -> String {
    remit_llm::anthropic::DEFAULT_MODEL.to_string()
}
