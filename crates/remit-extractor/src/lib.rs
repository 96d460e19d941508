//! Remit Extractor
//!
//! Turns raw document text into structured invoices and drives the per-file
//! processing pipeline.
//!
//! # Architecture
//!
//! ```text
//! Text → PromptBuilder → LLM → Invoice → vendor policy → MemoryStore
//!                                   ↘ rows → ReportSink
//! ```
//!
//! Extraction is two-pass: a draft extraction identifies the vendor, and when
//! that vendor is flagged in the memory store a second pass re-asks the
//! extractor with the vendor's history injected as context. The second
//! result supersedes the first.
//!
//! # Example Usage
//!
//! ```no_run
//! use remit_extractor::{PlainTextLoader, Processor, ProcessorConfig};
//! use remit_llm::MockProvider;
//! use remit_memory::MemoryStore;
//! use remit_report::VecSink;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new("{}");
//! let mut store = MemoryStore::open("memory_bank.json")?;
//! let processor = Processor::new(llm, PlainTextLoader, ProcessorConfig::default());
//!
//! let sink = VecSink::new();
//! let (summary, _rows) = processor
//!     .process_batch(&["invoices/inv-001.txt".into()], &mut store, &sink)
//!     .await?;
//! println!("processed {} files", summary.files_processed);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod mock;
mod parser;
mod pipeline;
mod prompt;
mod types;

pub use config::ProcessorConfig;
pub use error::ExtractorError;
pub use loader::{LoaderError, PlainTextLoader};
pub use mock::MockInvoiceSource;
pub use parser::parse_invoice_response;
pub use pipeline::Processor;
pub use prompt::{vendor_context_message, PromptBuilder};
pub use types::{BatchSummary, ExtractionPass};
