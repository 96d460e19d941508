//! remit - batch invoice extraction with persistent vendor memory.

use clap::Parser;
use remit_cli::output::Formatter;
use remit_cli::{commands, Cli, Command, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> remit_cli::Result<()> {
    let cli = Cli::parse();

    // Load or create config
    let config = Config::load().unwrap_or_else(|_| {
        let cfg = Config::default();
        cfg.save().ok();
        cfg
    });

    let formatter = Formatter::new(!cli.no_color);

    match cli.command {
        Command::Run(args) => {
            commands::execute_run(args, cli.memory, &config, &formatter).await?;
        }
        Command::Status(args) => {
            commands::execute_status(args, cli.memory, &config, &formatter)?;
        }
    }

    Ok(())
}
