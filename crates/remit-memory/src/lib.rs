//! Remit Memory Layer
//!
//! The persistent memory store and vendor-trust policy engine. This is where
//! remit keeps what it has learned across runs: every file ever processed,
//! aggregate run statistics, and which vendors have produced problematic
//! extractions before.
//!
//! # Architecture
//!
//! - A single JSON document on disk holds the whole aggregate
//! - Every mutating operation persists before returning, so a crash loses at
//!   most the file in flight
//! - Loading is tolerant: missing files and missing keys default field by
//!   field (the `invoice_v1` schema contract), and unknown top-level keys
//!   survive a load/save cycle
//!
//! # Examples
//!
//! ```no_run
//! use remit_memory::{FileOutcome, MemoryStore, RunSettings};
//!
//! # fn main() -> Result<(), remit_memory::StoreError> {
//! let mut store = MemoryStore::open("memory_bank.json")?;
//! store.start_run(&RunSettings::default())?;
//! store.record_result("inv-001.txt", FileOutcome::error(false, "unreadable"))?;
//! assert_eq!(store.stats().error_files, 1);
//! store.end_run()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod policy;
mod schema;
mod store;

pub use schema::{
    MemoryDocument, ProcessedFileRecord, RunConfig, Stats, VendorFlagEntry, SCHEMA_VERSION,
};
pub use store::{FileOutcome, MemoryStore, RunSettings, StoreError};
