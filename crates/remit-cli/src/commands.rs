//! Command execution.

use crate::cli::{RunArgs, StatusArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use remit_domain::traits::LlmProvider;
use remit_extractor::{PlainTextLoader, Processor, ProcessorConfig};
use remit_llm::{AnthropicProvider, MockProvider};
use remit_memory::MemoryStore;
use remit_report::JsonReportSink;
use std::path::{Path, PathBuf};

/// Run a batch over the input directory.
pub async fn execute_run(
    args: RunArgs,
    memory_override: Option<PathBuf>,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let memory_path = memory_override.unwrap_or_else(|| config.memory_path.clone());
    let input_dir = args.input.unwrap_or_else(|| config.input_dir.clone());
    let report_path = args.report.unwrap_or_else(|| config.report_path.clone());

    let use_llm = if args.llm {
        true
    } else if args.mock {
        false
    } else {
        config.use_llm
    };

    let paths = collect_input_files(&input_dir)?;
    if paths.is_empty() {
        println!(
            "{}",
            formatter.warning(&format!("No .txt files found in {}", input_dir.display()))
        );
        return Ok(());
    }

    let processor_config = ProcessorConfig {
        use_llm,
        skip_already_processed: args.skip_processed || config.skip_already_processed,
        ..Default::default()
    };

    let mut store = MemoryStore::open_or_default(&memory_path);
    let sink = JsonReportSink::new(&report_path);

    println!("use_llm = {}", use_llm);
    if use_llm {
        let mut provider = AnthropicProvider::from_env(config.model.as_str())?;
        if let Some(endpoint) = &config.endpoint {
            provider = provider.with_endpoint(endpoint.as_str());
        }
        run_batch(provider, &paths, processor_config, &mut store, &sink, formatter).await?;
    } else {
        run_batch(
            MockProvider::new("{}"),
            &paths,
            processor_config,
            &mut store,
            &sink,
            formatter,
        )
        .await?;
    }

    println!("{}", formatter.success(&format!("Saved: {}", report_path.display())));
    print!("{}", store.summary_text());
    Ok(())
}

async fn run_batch<L>(
    provider: L,
    paths: &[PathBuf],
    processor_config: ProcessorConfig,
    store: &mut MemoryStore,
    sink: &JsonReportSink,
    formatter: &Formatter,
) -> Result<()>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    let processor = Processor::new(provider, PlainTextLoader, processor_config);
    let (summary, rows) = processor.process_batch(paths, store, sink).await?;

    println!("{}", formatter.format_rows(&rows));
    println!(
        "{}",
        formatter.success(&format!(
            "{} processed, {} failed, {} skipped",
            summary.files_processed, summary.files_failed, summary.files_skipped
        ))
    );
    Ok(())
}

/// Show the memory summary, flagged vendors, and per-file status markers.
pub fn execute_status(
    args: StatusArgs,
    memory_override: Option<PathBuf>,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let memory_path = memory_override.unwrap_or_else(|| config.memory_path.clone());
    let store = MemoryStore::open_or_default(&memory_path);

    print!("{}", store.summary_text());
    println!();
    println!("{}", formatter.format_vendors(store.flagged_vendors()));

    let input_dir = args.input.unwrap_or_else(|| config.input_dir.clone());
    if input_dir.is_dir() {
        println!();
        println!("Files in {}:", input_dir.display());
        for path in collect_input_files(&input_dir)? {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let marker = formatter.status_marker(store.last_status(&name));
            println!("  {}{}", name, marker);
        }
    }

    Ok(())
}

/// All `.txt` files in a directory, sorted by name.
fn collect_input_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CliError::InvalidInput(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().map(|ext| ext == "txt").unwrap_or(false)
        })
        .collect();
    paths.sort();
    Ok(paths)
}
