//! The per-file pipeline and batch orchestrator

use crate::config::ProcessorConfig;
use crate::error::ExtractorError;
use crate::mock::MockInvoiceSource;
use crate::parser::parse_invoice_response;
use crate::prompt::{vendor_context_message, PromptBuilder};
use crate::types::{BatchSummary, ExtractionPass};
use remit_domain::traits::{DocumentLoader, LlmProvider};
use remit_domain::Invoice;
use remit_memory::{policy, FileOutcome, MemoryStore};
use remit_report::{rows_for_invoice, InvoiceRow, ReportSink};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Drives per-file extraction and batch processing.
///
/// Files are processed strictly sequentially; the only suspension point is
/// the LLM call. A failure in one file becomes an ERROR record and never
/// aborts the rest of the batch, and a store save failure is logged rather
/// than propagated — the memory store is allowed to lag, the batch is not
/// allowed to die.
pub struct Processor<L, D>
where
    L: LlmProvider,
    D: DocumentLoader,
{
    llm: Arc<L>,
    loader: D,
    mock: MockInvoiceSource,
    config: ProcessorConfig,
}

impl<L, D> Processor<L, D>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
    D: DocumentLoader,
    D::Error: std::fmt::Display,
{
    /// Create a new processor
    pub fn new(llm: L, loader: D, config: ProcessorConfig) -> Self {
        Self {
            llm: Arc::new(llm),
            loader,
            mock: MockInvoiceSource::new(),
            config,
        }
    }

    /// The processor's configuration
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Extract an invoice from document text, consulting vendor memory.
    ///
    /// Runs the draft pass, and when the draft names a flagged vendor runs a
    /// second, informed pass whose result supersedes the draft.
    pub async fn extract_invoice(
        &self,
        text: &str,
        store: &MemoryStore,
    ) -> Result<Invoice, ExtractorError> {
        let draft = self.run_pass(text, &ExtractionPass::Draft).await?;

        match informed_pass(store, &draft) {
            Some(pass) => {
                if let ExtractionPass::Informed { vendor_name, .. } = &pass {
                    info!("Vendor '{}' is flagged - re-extracting with context", vendor_name);
                }
                self.run_pass(text, &pass).await
            }
            None => Ok(draft),
        }
    }

    /// Run one extraction pass
    async fn run_pass(
        &self,
        text: &str,
        pass: &ExtractionPass,
    ) -> Result<Invoice, ExtractorError> {
        let builder = PromptBuilder::new(text);
        let builder = match pass {
            ExtractionPass::Draft => builder,
            ExtractionPass::Informed { context, .. } => {
                builder.with_vendor_context(context.as_str())
            }
        };
        let prompt = builder.build();

        debug!("Prompt length: {} chars", prompt.len());

        let response = timeout(self.config.extraction_timeout(), self.call_llm(&prompt))
            .await
            .map_err(|_| ExtractorError::Timeout)??;

        debug!("LLM response length: {} chars", response.len());

        parse_invoice_response(&response)
    }

    /// Call the LLM provider
    async fn call_llm(&self, prompt: &str) -> Result<String, ExtractorError> {
        let llm = Arc::clone(&self.llm);
        let prompt = prompt.to_string();

        // Call in a blocking context since LlmProvider is not async
        tokio::task::spawn_blocking(move || {
            llm.generate(&prompt)
                .map_err(|e| ExtractorError::Llm(e.to_string()))
        })
        .await
        .map_err(|e| ExtractorError::Llm(format!("Task join error: {}", e)))?
    }

    /// Process one file: extract, apply the vendor policy, record, and
    /// produce report rows.
    ///
    /// Returns the rows and whether extraction succeeded. Failures are
    /// converted into ERROR records here and never propagate.
    pub async fn process_file(
        &self,
        path: &Path,
        store: &mut MemoryStore,
    ) -> (Vec<InvoiceRow>, bool) {
        let filename = file_name(path);
        info!("Processing: {}", filename);

        let extracted = if self.config.use_llm {
            match self.loader.load_text(path) {
                Ok(text) => self.extract_invoice(&text, store).await,
                Err(e) => Err(ExtractorError::Loader(e.to_string())),
            }
        } else {
            Ok(self.mock.next_invoice())
        };

        match extracted {
            Ok(mut invoice) => {
                policy::apply_vendor_policy(store, &mut invoice);
                let rows = rows_for_invoice(&invoice, &filename);
                let outcome = FileOutcome::from_invoice(&invoice, self.config.use_llm);
                if let Err(e) = store.record_result(&filename, outcome) {
                    warn!("Could not persist result for {}: {}", filename, e);
                }
                (rows, true)
            }
            Err(e) => {
                error!("ERROR: {} {}", filename, e);
                let outcome = FileOutcome::error(self.config.use_llm, e.to_string());
                if let Err(save_err) = store.record_result(&filename, outcome) {
                    warn!("Could not persist error for {}: {}", filename, save_err);
                }
                (Vec::new(), false)
            }
        }
    }

    /// Process a batch of files.
    ///
    /// Brackets the per-file loop with run tracking, hands all produced rows
    /// to the sink, and returns a summary along with the rows. A sink failure
    /// is returned as an error — but only after every record is persisted and
    /// the run is closed, so memory state is never the casualty of a lost
    /// report.
    pub async fn process_batch<S: ReportSink>(
        &self,
        paths: &[PathBuf],
        store: &mut MemoryStore,
        sink: &S,
    ) -> Result<(BatchSummary, Vec<InvoiceRow>), ExtractorError> {
        if let Err(e) = store.start_run(&self.config.run_settings()) {
            warn!("Could not persist run start: {}", e);
        }

        let mut summary = BatchSummary::default();
        let mut all_rows: Vec<InvoiceRow> = Vec::new();

        for path in paths {
            let filename = file_name(path);
            if self.config.skip_already_processed && store.seen(&filename) {
                info!("Skipping already-processed file: {}", filename);
                if let Err(e) = store.mark_skipped(&filename, "already_processed") {
                    warn!("Could not persist skip for {}: {}", filename, e);
                }
                summary.files_skipped += 1;
                continue;
            }

            let (rows, ok) = self.process_file(path, store).await;
            if ok {
                summary.files_processed += 1;
            } else {
                summary.files_failed += 1;
            }
            all_rows.extend(rows);
        }

        summary.rows_written = all_rows.len();
        let report_result = sink.write(&all_rows);

        if let Err(e) = store.end_run() {
            warn!("Could not persist run end: {}", e);
        }

        report_result?;
        info!(
            "Batch complete: {} processed, {} failed, {} skipped, {} rows",
            summary.files_processed,
            summary.files_failed,
            summary.files_skipped,
            summary.rows_written
        );
        Ok((summary, all_rows))
    }
}

/// Pick an informed pass when the draft's vendor is flagged
fn informed_pass(store: &MemoryStore, draft: &Invoice) -> Option<ExtractionPass> {
    let vendor = draft.vendor_name.as_deref()?;
    let entry = store.vendor_flag(vendor)?;
    Some(ExtractionPass::Informed {
        vendor_name: vendor.to_string(),
        context: vendor_context_message(vendor, entry),
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use remit_llm::MockProvider;
    use remit_report::VecSink;
    use tempfile::TempDir;

    const OK_RESPONSE: &str = r#"{
        "vendor_name": "Acme Corp",
        "invoice_number": "INV-1",
        "total_amount": 100.0,
        "currency": "USD",
        "status": "OK"
    }"#;

    fn llm_config() -> ProcessorConfig {
        ProcessorConfig {
            use_llm: true,
            ..Default::default()
        }
    }

    fn store_in(dir: &TempDir) -> MemoryStore {
        MemoryStore::open(dir.path().join("memory_bank.json")).unwrap()
    }

    fn write_doc(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, "Invoice from Acme Corp\nTotal: 100 USD\n").unwrap();
        path
    }

    #[tokio::test]
    async fn test_extract_invoice_single_pass_for_clean_vendor() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let llm = MockProvider::new(OK_RESPONSE);
        let processor = Processor::new(llm.clone(), crate::PlainTextLoader, llm_config());

        let invoice = processor.extract_invoice("some text", &store).await.unwrap();
        assert_eq!(invoice.vendor_name.as_deref(), Some("Acme Corp"));
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_extract_invoice_two_passes_for_flagged_vendor() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.flag_vendor("Acme Corp", "prior error").unwrap();

        let llm = MockProvider::new("{}");
        llm.push_response(OK_RESPONSE);
        llm.push_response(
            r#"{"vendor_name": "Acme Corp", "invoice_number": "INV-1-informed", "status": "OK"}"#,
        );
        let processor = Processor::new(llm.clone(), crate::PlainTextLoader, llm_config());

        let invoice = processor.extract_invoice("some text", &store).await.unwrap();
        // Second pass supersedes the draft
        assert_eq!(invoice.invoice_number.as_deref(), Some("INV-1-informed"));
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_process_file_failure_becomes_error_record() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let path = write_doc(&dir, "inv-001.txt");

        let llm = MockProvider::failing("simulated outage");
        let processor = Processor::new(llm, crate::PlainTextLoader, llm_config());

        let (rows, ok) = processor.process_file(&path, &mut store).await;
        assert!(!ok);
        assert!(rows.is_empty());

        let record = store.processed_file("inv-001.txt").unwrap();
        assert_eq!(record.status.as_deref(), Some("ERROR"));
        assert!(record.vendor_name.is_none());
        assert!(record.invoice_number.is_none());
        assert!(record.error.as_deref().unwrap().contains("simulated outage"));
        assert_eq!(store.stats().error_files, 1);
    }

    #[tokio::test]
    async fn test_process_batch_mock_mode_never_calls_llm() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let paths = vec![write_doc(&dir, "a.txt"), write_doc(&dir, "b.txt")];

        let llm = MockProvider::failing("must not be called");
        let processor =
            Processor::new(llm.clone(), crate::PlainTextLoader, ProcessorConfig::default());
        let sink = VecSink::new();

        let (summary, rows) = processor
            .process_batch(&paths, &mut store, &sink)
            .await
            .unwrap();
        assert_eq!(summary.files_processed, 2);
        assert_eq!(summary.files_failed, 0);
        assert_eq!(llm.call_count(), 0);
        assert_eq!(store.stats().total_files_processed, 2);
        assert_eq!(store.stats().llm_used_files, 0);
        assert_eq!(rows.len(), sink.rows().len());
        assert!(!rows.is_empty());
    }

    #[tokio::test]
    async fn test_process_batch_skips_seen_files_when_configured() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let paths = vec![write_doc(&dir, "a.txt"), write_doc(&dir, "b.txt")];

        let config = ProcessorConfig {
            skip_already_processed: true,
            ..Default::default()
        };
        let processor = Processor::new(MockProvider::new("{}"), crate::PlainTextLoader, config);
        let sink = VecSink::new();

        let (first, _) = processor
            .process_batch(&paths, &mut store, &sink)
            .await
            .unwrap();
        assert_eq!(first.files_processed, 2);
        assert_eq!(first.files_skipped, 0);

        let (second, rows) = processor
            .process_batch(&paths, &mut store, &sink)
            .await
            .unwrap();
        assert_eq!(second.files_processed, 0);
        assert_eq!(second.files_skipped, 2);
        assert!(rows.is_empty());
        assert_eq!(store.stats().skipped_already_processed, 2);
        assert_eq!(store.stats().total_runs, 2);
    }

    #[tokio::test]
    async fn test_policy_escalates_before_recording() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.flag_vendor("Acme Corp", "prior error").unwrap();
        let path = write_doc(&dir, "inv-002.txt");

        let llm = MockProvider::new(OK_RESPONSE);
        let processor = Processor::new(llm, crate::PlainTextLoader, llm_config());

        let (rows, ok) = processor.process_file(&path, &mut store).await;
        assert!(ok);
        assert_eq!(rows[0].status, "NEEDS_REVIEW");

        let record = store.processed_file("inv-002.txt").unwrap();
        assert_eq!(record.status.as_deref(), Some("NEEDS_REVIEW"));
        assert_eq!(
            record.review_reason.as_deref(),
            Some(policy::ESCALATION_REASON)
        );
        // Escalation fed the ledger: prior flag plus this one
        assert_eq!(store.vendor_flag("Acme Corp").unwrap().count, 2);
    }
}
