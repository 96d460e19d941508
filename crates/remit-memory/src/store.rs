//! The durable memory store.

use crate::schema::{
    MemoryDocument, ProcessedFileRecord, RunConfig, Stats, VendorFlagEntry,
};
use chrono::{SecondsFormat, Utc};
use remit_domain::{Invoice, InvoiceStatus};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Backing file path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The backing file exists but is not a valid memory document
    #[error("backing file {path} is corrupt: {source}")]
    Corrupt {
        /// Backing file path
        path: PathBuf,
        /// Underlying parse error
        source: serde_json::Error,
    },

    /// Serializing the in-memory document failed
    #[error("failed to serialize memory document: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Configuration snapshot recorded at the start of a run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Application identifier
    pub app: String,

    /// Parser version tag
    pub parser_version: String,

    /// Whether the run uses the LLM extractor
    pub use_llm: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            app: "remit".to_string(),
            parser_version: "v1".to_string(),
            use_llm: false,
        }
    }
}

/// The outcome of processing one file, ready to be recorded.
///
/// Build one with [`FileOutcome::from_invoice`] for a completed extraction or
/// [`FileOutcome::error`] for a failed one; the latter carries no vendor or
/// invoice fields at all.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    /// Whether the LLM extractor was used
    pub used_llm: bool,

    /// Vendor name, when known
    pub vendor_name: Option<String>,

    /// Invoice number, when known
    pub invoice_number: Option<String>,

    /// Invoice date as an ISO string
    pub invoice_date: Option<String>,

    /// Invoice grand total
    pub total_amount: Option<f64>,

    /// Currency code
    pub currency: Option<String>,

    /// Final status, after the vendor policy has been applied
    pub status: InvoiceStatus,

    /// Why the file needs review, when it does
    pub review_reason: Option<String>,

    /// Failure detail for error outcomes
    pub error: Option<String>,
}

impl FileOutcome {
    /// Outcome for an invoice the extractor produced.
    ///
    /// The invoice must already have been through the vendor policy; the
    /// store records whatever status it carries.
    pub fn from_invoice(invoice: &Invoice, used_llm: bool) -> Self {
        Self {
            used_llm,
            vendor_name: invoice.vendor_name.clone(),
            invoice_number: invoice.invoice_number.clone(),
            invoice_date: invoice.invoice_date_iso(),
            total_amount: invoice.total_amount,
            currency: invoice.currency.map(|c| c.as_str().to_string()),
            status: invoice.status,
            review_reason: invoice.review_reason.clone(),
            error: None,
        }
    }

    /// Outcome for a file whose extraction failed.
    ///
    /// Vendor and invoice fields stay unset: a failed extraction cannot be
    /// attributed to a vendor.
    pub fn error(used_llm: bool, detail: impl Into<String>) -> Self {
        Self {
            used_llm,
            vendor_name: None,
            invoice_number: None,
            invoice_date: None,
            total_amount: None,
            currency: None,
            status: InvoiceStatus::Error,
            review_reason: None,
            error: Some(detail.into()),
        }
    }
}

/// Persistent memory store for invoice processing.
///
/// One instance owns the backing file. All mutations go through `&mut self`
/// methods that persist before returning, so the file lags the in-memory
/// state by at most the operation in flight. Concurrent stores over the same
/// file are not supported.
pub struct MemoryStore {
    path: PathBuf,
    data: MemoryDocument,
}

impl MemoryStore {
    /// Open the store at `path`.
    ///
    /// A missing file yields an all-defaults document. A file that exists but
    /// cannot be parsed is reported as [`StoreError::Corrupt`] — callers that
    /// prefer availability over strictness use [`MemoryStore::open_or_default`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Ok(Self {
                path,
                data: MemoryDocument::default(),
            });
        }

        let contents = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let data = serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
            path: path.clone(),
            source,
        })?;

        Ok(Self { path, data })
    }

    /// Open the store at `path`, falling back to an empty document if the
    /// backing file is unreadable or corrupt.
    ///
    /// This preserves the availability-first behavior front-ends want: a bad
    /// memory file costs the accumulated knowledge, never the batch.
    pub fn open_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        match Self::open(&path) {
            Ok(store) => store,
            Err(e) => {
                warn!("starting from an empty memory document: {}", e);
                Self {
                    path,
                    data: MemoryDocument::default(),
                }
            }
        }
    }

    /// Serialize the whole document and overwrite the backing file.
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }
        let contents =
            serde_json::to_string_pretty(&self.data).map_err(StoreError::Serialize)?;
        fs::write(&self.path, contents).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Aggregate counters.
    pub fn stats(&self) -> &Stats {
        &self.data.stats
    }

    /// The latest run's configuration snapshot.
    pub fn run_config(&self) -> &RunConfig {
        &self.data.run_config
    }

    /// Whether a file has ever been recorded or skipped.
    pub fn seen(&self, filename: &str) -> bool {
        self.data.processed_files.contains_key(filename)
    }

    /// Last recorded status string for a file, if any.
    pub fn last_status(&self, filename: &str) -> Option<&str> {
        self.data
            .processed_files
            .get(filename)?
            .status
            .as_deref()
    }

    /// The full record for a file, if any.
    pub fn processed_file(&self, filename: &str) -> Option<&ProcessedFileRecord> {
        self.data.processed_files.get(filename)
    }

    /// Whether a vendor is currently flagged.
    pub fn is_flagged(&self, vendor: &str) -> bool {
        self.data.flagged_vendors.contains_key(vendor)
    }

    /// The trust ledger entry for a vendor, if it has ever been flagged.
    pub fn vendor_flag(&self, vendor: &str) -> Option<&VendorFlagEntry> {
        self.data.flagged_vendors.get(vendor)
    }

    /// All flagged vendors with their ledger entries.
    pub fn flagged_vendors(&self) -> impl Iterator<Item = (&str, &VendorFlagEntry)> {
        self.data
            .flagged_vendors
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
    }

    /// Number of vendors in the trust ledger.
    pub fn flagged_vendor_count(&self) -> usize {
        self.data.flagged_vendors.len()
    }

    /// Start a new processing run: bump the run counter and replace the run
    /// snapshot. Runs do not nest; a second `start_run` simply overwrites.
    pub fn start_run(&mut self, settings: &RunSettings) -> Result<(), StoreError> {
        self.data.stats.total_runs += 1;
        self.data.run_config = RunConfig {
            app: Some(settings.app.clone()),
            parser_version: Some(settings.parser_version.clone()),
            use_llm: Some(settings.use_llm),
            started_at: Some(now_iso()),
            ended_at: None,
        };
        self.save()
    }

    /// Stamp the current run snapshot with an end time.
    pub fn end_run(&mut self) -> Result<(), StoreError> {
        self.data.run_config.ended_at = Some(now_iso());
        self.save()
    }

    /// Count a file as skipped and stamp its record, creating a bare record
    /// if the file has none yet.
    pub fn mark_skipped(
        &mut self,
        filename: &str,
        reason: &str,
    ) -> Result<(), StoreError> {
        self.data.stats.skipped_already_processed += 1;
        let record = self
            .data
            .processed_files
            .entry(filename.to_string())
            .or_default();
        record.last_skipped_at = Some(now_iso());
        record.last_skip_reason = Some(reason.to_string());
        self.save()
    }

    /// Flag a vendor in the trust ledger.
    ///
    /// Creates the entry on first flag, then increments the count and
    /// replaces the reason and timestamp on every call. There is no unflag.
    pub fn flag_vendor(&mut self, vendor: &str, reason: &str) -> Result<(), StoreError> {
        let entry = self
            .data
            .flagged_vendors
            .entry(vendor.to_string())
            .or_default();
        entry.count += 1;
        entry.last_reason = Some(reason.to_string());
        entry.last_seen = Some(now_iso());
        self.save()
    }

    /// Record the outcome of processing one file.
    ///
    /// Overwrites the file's record, bumps the counters, and feeds the trust
    /// ledger: any NEEDS_REVIEW or ERROR outcome attributed to a vendor flags
    /// that vendor, whoever set the status. The vendor policy must therefore
    /// run on the invoice before the outcome is recorded.
    pub fn record_result(
        &mut self,
        filename: &str,
        outcome: FileOutcome,
    ) -> Result<(), StoreError> {
        let record = ProcessedFileRecord {
            processed_at: Some(now_iso()),
            used_llm: outcome.used_llm,
            vendor_name: outcome.vendor_name.clone(),
            invoice_number: outcome.invoice_number,
            invoice_date: outcome.invoice_date,
            total_amount: outcome.total_amount,
            currency: outcome.currency,
            status: Some(outcome.status.as_str().to_string()),
            review_reason: outcome.review_reason.clone(),
            error: outcome.error.clone(),
            last_skipped_at: None,
            last_skip_reason: None,
        };
        self.data
            .processed_files
            .insert(filename.to_string(), record);

        self.data.stats.total_files_processed += 1;
        if outcome.used_llm {
            self.data.stats.llm_used_files += 1;
        }
        if outcome.status == InvoiceStatus::NeedsReview {
            self.data.stats.needs_review_files += 1;
        }
        if outcome.status == InvoiceStatus::Error {
            self.data.stats.error_files += 1;
        }

        if let Some(vendor) = outcome.vendor_name.as_deref() {
            if matches!(
                outcome.status,
                InvoiceStatus::NeedsReview | InvoiceStatus::Error
            ) {
                let reason = outcome
                    .review_reason
                    .as_deref()
                    .or(outcome.error.as_deref())
                    .unwrap_or(outcome.status.as_str())
                    .to_string();
                self.flag_vendor(vendor, &reason)?;
            }
        }

        self.save()
    }

    /// Human-readable summary of the aggregate counters.
    pub fn summary_text(&self) -> String {
        let s = &self.data.stats;
        format!(
            "Memory summary:\n\
             - total_runs: {}\n\
             - total_files_processed: {}\n\
             - llm_used_files: {}\n\
             - needs_review_files: {}\n\
             - error_files: {}\n\
             - skipped_already_processed: {}\n\
             - flagged_vendors: {}\n",
            s.total_runs,
            s.total_files_processed,
            s.llm_used_files,
            s.needs_review_files,
            s.error_files,
            s.skipped_already_processed,
            self.data.flagged_vendors.len(),
        )
    }
}

/// Current time as an RFC 3339 string, seconds precision, UTC.
pub(crate) fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> MemoryStore {
        MemoryStore::open(dir.path().join("memory_bank.json")).unwrap()
    }

    fn ok_outcome(vendor: &str) -> FileOutcome {
        let invoice = Invoice {
            vendor_name: Some(vendor.to_string()),
            ..Default::default()
        };
        FileOutcome::from_invoice(&invoice, true)
    }

    #[test]
    fn test_open_missing_file_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.stats().total_files_processed, 0);
        assert_eq!(store.flagged_vendor_count(), 0);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_open_corrupt_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory_bank.json");
        fs::write(&path, "not json at all {{{").unwrap();

        let result = MemoryStore::open(&path);
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_open_or_default_falls_back_on_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory_bank.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let store = MemoryStore::open_or_default(&path);
        assert_eq!(store.stats().total_files_processed, 0);
    }

    #[test]
    fn test_round_trip_preserves_aggregate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory_bank.json");

        let mut store = MemoryStore::open(&path).unwrap();
        store.start_run(&RunSettings::default()).unwrap();
        store.record_result("a.txt", ok_outcome("Acme")).unwrap();
        store
            .record_result("b.txt", FileOutcome::error(true, "boom"))
            .unwrap();
        store.flag_vendor("Acme", "late invoices").unwrap();
        store.end_run().unwrap();

        let reloaded = MemoryStore::open(&path).unwrap();
        assert_eq!(reloaded.stats().total_runs, 1);
        assert_eq!(reloaded.stats().total_files_processed, 2);
        assert_eq!(reloaded.stats().error_files, 1);
        assert_eq!(reloaded.vendor_flag("Acme").unwrap().count, 1);
        assert_eq!(
            reloaded.vendor_flag("Acme").unwrap().last_reason.as_deref(),
            Some("late invoices")
        );
        assert!(reloaded.run_config().ended_at.is_some());
        assert_eq!(reloaded.last_status("b.txt"), Some("ERROR"));
    }

    #[test]
    fn test_record_result_counters() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.record_result("ok.txt", ok_outcome("Clean Co")).unwrap();

        let review = Invoice {
            vendor_name: Some("Late Co".to_string()),
            status: InvoiceStatus::NeedsReview,
            review_reason: Some("missing totals".to_string()),
            ..Default::default()
        };
        store
            .record_result("review.txt", FileOutcome::from_invoice(&review, true))
            .unwrap();
        store
            .record_result("err.txt", FileOutcome::error(false, "parse failure"))
            .unwrap();

        let stats = store.stats();
        assert_eq!(stats.total_files_processed, 3);
        assert_eq!(stats.llm_used_files, 2);
        assert_eq!(stats.needs_review_files, 1);
        assert_eq!(stats.error_files, 1);
        assert!(stats.needs_review_files + stats.error_files <= stats.total_files_processed);
    }

    #[test]
    fn test_record_result_flags_vendor_on_review_and_error() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        // Clean outcome never touches the ledger
        store.record_result("a.txt", ok_outcome("Acme")).unwrap();
        assert!(!store.is_flagged("Acme"));

        let review = Invoice {
            vendor_name: Some("Acme".to_string()),
            status: InvoiceStatus::NeedsReview,
            review_reason: Some("illegible totals".to_string()),
            ..Default::default()
        };
        store
            .record_result("b.txt", FileOutcome::from_invoice(&review, true))
            .unwrap();
        assert!(store.is_flagged("Acme"));
        let entry = store.vendor_flag("Acme").unwrap();
        assert_eq!(entry.count, 1);
        assert_eq!(entry.last_reason.as_deref(), Some("illegible totals"));
    }

    #[test]
    fn test_error_outcome_without_vendor_does_not_flag() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store
            .record_result("bad.txt", FileOutcome::error(true, "timeout"))
            .unwrap();
        assert_eq!(store.flagged_vendor_count(), 0);
        assert_eq!(store.stats().error_files, 1);
    }

    #[test]
    fn test_flag_reason_falls_back_to_status_name() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        let review = Invoice {
            vendor_name: Some("Quiet Co".to_string()),
            status: InvoiceStatus::NeedsReview,
            ..Default::default()
        };
        store
            .record_result("q.txt", FileOutcome::from_invoice(&review, false))
            .unwrap();
        assert_eq!(
            store.vendor_flag("Quiet Co").unwrap().last_reason.as_deref(),
            Some("NEEDS_REVIEW")
        );
    }

    #[test]
    fn test_reprocessing_replaces_record() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store
            .record_result("inv.txt", FileOutcome::error(false, "first pass failed"))
            .unwrap();
        store.record_result("inv.txt", ok_outcome("Acme")).unwrap();

        let record = store.processed_file("inv.txt").unwrap();
        assert_eq!(record.status.as_deref(), Some("OK"));
        assert!(record.error.is_none());
        // Counters are append-only: both attempts counted
        assert_eq!(store.stats().total_files_processed, 2);
        assert_eq!(store.stats().error_files, 1);
    }

    #[test]
    fn test_mark_skipped() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.record_result("seen.txt", ok_outcome("Acme")).unwrap();
        let before = *store.stats();

        store.mark_skipped("seen.txt", "already_processed").unwrap();
        store.mark_skipped("new.txt", "already_processed").unwrap();

        let stats = store.stats();
        assert_eq!(stats.skipped_already_processed, 2);
        // Skips touch no other counter
        assert_eq!(stats.total_files_processed, before.total_files_processed);
        assert_eq!(stats.error_files, before.error_files);

        // Skipping a never-recorded file creates a bare, status-less record
        assert!(store.seen("new.txt"));
        assert_eq!(store.last_status("new.txt"), None);
        // Skipping a recorded file keeps its status
        assert_eq!(store.last_status("seen.txt"), Some("OK"));
    }

    #[test]
    fn test_run_tracking_overwrites_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store
            .start_run(&RunSettings {
                app: "remit".to_string(),
                parser_version: "v1".to_string(),
                use_llm: true,
            })
            .unwrap();
        assert_eq!(store.stats().total_runs, 1);
        assert_eq!(store.run_config().use_llm, Some(true));
        assert!(store.run_config().started_at.is_some());
        assert!(store.run_config().ended_at.is_none());

        // Starting again without ending just replaces the snapshot
        store.start_run(&RunSettings::default()).unwrap();
        assert_eq!(store.stats().total_runs, 2);
        assert_eq!(store.run_config().use_llm, Some(false));
        assert!(store.run_config().ended_at.is_none());

        store.end_run().unwrap();
        assert!(store.run_config().ended_at.is_some());
    }

    #[test]
    fn test_summary_text_reflects_counters() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.record_result("a.txt", ok_outcome("Acme")).unwrap();
        store
            .record_result("b.txt", FileOutcome::error(false, "boom"))
            .unwrap();

        let summary = store.summary_text();
        assert!(summary.contains("total_files_processed: 2"));
        assert!(summary.contains("error_files: 1"));
        assert!(summary.contains("flagged_vendors: 0"));
    }
}
