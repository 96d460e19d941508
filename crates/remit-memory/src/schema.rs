//! The backing document schema.
//!
//! This is the `invoice_v1` contract: every well-known field defaults when
//! missing, and unknown top-level keys are carried through a load/save cycle
//! untouched. Schema growth happens by adding defaulted fields here (and, if
//! a change is ever incompatible, by bumping [`SCHEMA_VERSION`] and adding a
//! numbered migration in the loader).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version tag written into every persisted document.
pub const SCHEMA_VERSION: &str = "invoice_v1";

/// The whole persisted aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryDocument {
    /// Every file ever processed, keyed by filename (case-sensitive)
    #[serde(default)]
    pub processed_files: BTreeMap<String, ProcessedFileRecord>,

    /// Vendors with at least one problematic outcome, keyed by vendor name
    #[serde(default)]
    pub flagged_vendors: BTreeMap<String, VendorFlagEntry>,

    /// Monotonic counters over all recorded outcomes
    #[serde(default)]
    pub stats: Stats,

    /// The most recent run's configuration snapshot
    #[serde(default)]
    pub run_config: RunConfig,

    /// Schema version tag
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Unknown top-level keys, preserved for forward compatibility
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self {
            processed_files: BTreeMap::new(),
            flagged_vendors: BTreeMap::new(),
            stats: Stats::default(),
            run_config: RunConfig::default(),
            schema_version: default_schema_version(),
            extra: BTreeMap::new(),
        }
    }
}

/// What happened the last time a file was processed.
///
/// Re-processing a filename replaces the whole record; there is no history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessedFileRecord {
    /// When the file was last recorded (RFC 3339, UTC)
    #[serde(default)]
    pub processed_at: Option<String>,

    /// Whether the LLM extractor was used for this file
    #[serde(default)]
    pub used_llm: bool,

    /// Vendor name, when extraction produced one
    #[serde(default)]
    pub vendor_name: Option<String>,

    /// Invoice number, when extraction produced one
    #[serde(default)]
    pub invoice_number: Option<String>,

    /// Invoice date as an ISO string
    #[serde(default)]
    pub invoice_date: Option<String>,

    /// Invoice grand total
    #[serde(default)]
    pub total_amount: Option<f64>,

    /// Currency code
    #[serde(default)]
    pub currency: Option<String>,

    /// Final status string (`OK`, `NEEDS_REVIEW`, `ERROR`)
    #[serde(default)]
    pub status: Option<String>,

    /// Why the file needs review, when it does
    #[serde(default)]
    pub review_reason: Option<String>,

    /// Failure detail for `ERROR` records
    #[serde(default)]
    pub error: Option<String>,

    /// When the file was last skipped as already processed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_skipped_at: Option<String>,

    /// Why the file was last skipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_skip_reason: Option<String>,
}

/// Per-vendor trust ledger entry.
///
/// Created on the first flag, never deleted. `count` only ever increases;
/// the reason and timestamp describe the most recent flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorFlagEntry {
    /// How many times this vendor has been flagged
    #[serde(default)]
    pub count: u64,

    /// Reason attached to the most recent flag
    #[serde(default)]
    pub last_reason: Option<String>,

    /// When the vendor was most recently flagged (RFC 3339, UTC)
    #[serde(default)]
    pub last_seen: Option<String>,
}

/// Monotonic counters over all recorded outcomes.
///
/// Counters are append-only increments, never recomputed from the maps.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Number of `record_result` calls ever made
    #[serde(default)]
    pub total_files_processed: u64,

    /// Number of runs ever started
    #[serde(default)]
    pub total_runs: u64,

    /// Files whose extraction used the LLM
    #[serde(default)]
    pub llm_used_files: u64,

    /// Files that ended `NEEDS_REVIEW`
    #[serde(default)]
    pub needs_review_files: u64,

    /// Files that ended `ERROR`
    #[serde(default)]
    pub error_files: u64,

    /// Files skipped because they were already processed
    #[serde(default)]
    pub skipped_already_processed: u64,
}

/// The most recent run's configuration snapshot.
///
/// Overwritten by every `start_run`; only the latest run is retained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Application identifier
    #[serde(default)]
    pub app: Option<String>,

    /// Parser version tag
    #[serde(default)]
    pub parser_version: Option<String>,

    /// Whether the run used the LLM extractor
    #[serde(default)]
    pub use_llm: Option<bool>,

    /// When the run started (RFC 3339, UTC)
    #[serde(default)]
    pub started_at: Option<String>,

    /// When the run ended, once `end_run` has been called
    #[serde(default)]
    pub ended_at: Option<String>,
}

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_defaults_everything() {
        let doc: MemoryDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.processed_files.is_empty());
        assert!(doc.flagged_vendors.is_empty());
        assert_eq!(doc.stats.total_files_processed, 0);
        assert_eq!(doc.stats.total_runs, 0);
        assert_eq!(doc.stats.skipped_already_processed, 0);
        assert!(doc.run_config.started_at.is_none());
        assert_eq!(doc.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_partial_stats_default_per_field() {
        let doc: MemoryDocument =
            serde_json::from_str(r#"{"stats": {"total_runs": 3}}"#).unwrap();
        assert_eq!(doc.stats.total_runs, 3);
        assert_eq!(doc.stats.total_files_processed, 0);
        assert_eq!(doc.stats.error_files, 0);
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let doc: MemoryDocument = serde_json::from_str(
            r#"{"stats": {"total_runs": 1}, "operator_notes": {"owner": "finance"}}"#,
        )
        .unwrap();
        let json = serde_json::to_string(&doc).unwrap();
        let reread: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(reread["operator_notes"]["owner"], "finance");
        assert_eq!(reread["stats"]["total_runs"], 1);
    }

    #[test]
    fn test_record_skip_fields_absent_unless_set() {
        let record = ProcessedFileRecord {
            processed_at: Some("2026-08-08T10:00:00Z".to_string()),
            status: Some("OK".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("last_skipped_at").is_none());
        assert!(json.get("last_skip_reason").is_none());
        // Ordinary nullable fields serialize as explicit nulls
        assert!(json["vendor_name"].is_null());
    }
}
