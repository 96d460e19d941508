//! Pipeline state and result types

/// Which extraction pass is being run for a file.
///
/// Every file gets a `Draft` pass. When the draft names a vendor the memory
/// store has flagged, an `Informed` pass re-asks the extractor with the
/// vendor's history as context, and its result supersedes the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionPass {
    /// First extraction, with no memory injected
    Draft,

    /// Re-extraction for a flagged vendor
    Informed {
        /// Vendor the context describes
        vendor_name: String,
        /// Vendor history message injected into the prompt
        context: String,
    },
}

/// What a batch accomplished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Files that went through extraction and were recorded
    pub files_processed: usize,

    /// Files whose extraction failed and were recorded as errors
    pub files_failed: usize,

    /// Files skipped as already processed
    pub files_skipped: usize,

    /// Rows handed to the report sink
    pub rows_written: usize,
}
