//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// remit - batch invoice extraction with persistent vendor memory.
#[derive(Debug, Parser)]
#[command(name = "remit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Memory store path (overrides the config file)
    #[arg(short, long, global = true)]
    pub memory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process a batch of invoice documents
    Run(RunArgs),

    /// Show memory summary, flagged vendors, and per-file status
    Status(StatusArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Directory of pre-extracted invoice text files
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Report artifact path
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Extract with the LLM (reads ANTHROPIC_API_KEY)
    #[arg(long, conflicts_with = "mock")]
    pub llm: bool,

    /// Use the mock invoice source instead of the LLM
    #[arg(long, conflicts_with = "llm")]
    pub mock: bool,

    /// Skip files the memory store has already seen
    #[arg(long)]
    pub skip_processed: bool,
}

/// Arguments for the status command.
#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Directory whose files should be listed with their last status
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command() {
        let cli = Cli::parse_from(["remit", "run", "--input", "invoices", "--mock"]);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.input.as_deref().unwrap().to_str(), Some("invoices"));
                assert!(args.mock);
                assert!(!args.llm);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_status_command() {
        let cli = Cli::parse_from(["remit", "status"]);
        assert!(matches!(cli.command, Command::Status(_)));
    }

    #[test]
    fn test_global_memory_override() {
        let cli = Cli::parse_from(["remit", "--memory", "bank.json", "status"]);
        assert_eq!(cli.memory.as_deref().unwrap().to_str(), Some("bank.json"));
    }

    #[test]
    fn test_llm_and_mock_conflict() {
        let result = Cli::try_parse_from(["remit", "run", "--llm", "--mock"]);
        assert!(result.is_err());
    }
}
