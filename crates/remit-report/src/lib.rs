//! Remit Report Layer
//!
//! Flattens extracted invoices into one row per line item and hands the rows
//! to a report sink. The sink owns the artifact format; the pipeline only
//! produces rows.

#![warn(missing_docs)]

use remit_domain::Invoice;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Errors that can occur while writing a report
#[derive(Error, Debug)]
pub enum ReportError {
    /// Writing the artifact failed
    #[error("failed to write report to {path}: {source}")]
    Io {
        /// Artifact path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Serializing the rows failed
    #[error("failed to serialize report rows: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One flat report row.
///
/// Invoices with line items produce one row per item; an invoice with no
/// items produces a single row whose item fields are empty and whose `amount`
/// is the invoice total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceRow {
    /// Source filename
    pub file: String,
    /// Vendor name
    pub vendor_name: Option<String>,
    /// Invoice date as an ISO string
    pub invoice_date: Option<String>,
    /// Invoice number
    pub invoice_number: Option<String>,
    /// Currency code
    pub currency: Option<String>,
    /// Billed customer
    pub bill_to: Option<String>,
    /// Final status string
    pub status: String,
    /// Line item description
    pub description: Option<String>,
    /// Line item quantity
    pub quantity: Option<f64>,
    /// Line item unit price
    pub rate: Option<f64>,
    /// Line amount, or the invoice total on the summary row
    pub amount: Option<f64>,
}

/// Flatten an invoice into report rows.
pub fn rows_for_invoice(invoice: &Invoice, filename: &str) -> Vec<InvoiceRow> {
    let base = InvoiceRow {
        file: filename.to_string(),
        vendor_name: invoice.vendor_name.clone(),
        invoice_date: invoice.invoice_date_iso(),
        invoice_number: invoice.invoice_number.clone(),
        currency: invoice.currency.map(|c| c.as_str().to_string()),
        bill_to: invoice.bill_to.clone(),
        status: invoice.status.as_str().to_string(),
        description: None,
        quantity: None,
        rate: None,
        amount: None,
    };

    if invoice.line_items.is_empty() {
        return vec![InvoiceRow {
            amount: invoice.total_amount,
            ..base
        }];
    }

    invoice
        .line_items
        .iter()
        .map(|item| InvoiceRow {
            description: Some(item.description.clone()),
            quantity: item.quantity,
            rate: item.unit_price,
            amount: item.amount,
            ..base.clone()
        })
        .collect()
}

/// Trait for writing the final row set somewhere useful
pub trait ReportSink {
    /// Write all rows produced by a batch
    fn write(&self, rows: &[InvoiceRow]) -> Result<(), ReportError>;
}

/// Sink that writes the rows as a pretty-printed JSON array
pub struct JsonReportSink {
    path: PathBuf,
}

impl JsonReportSink {
    /// Create a sink targeting `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Artifact path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for JsonReportSink {
    fn write(&self, rows: &[InvoiceRow]) -> Result<(), ReportError> {
        let contents = serde_json::to_string_pretty(rows)?;
        fs::write(&self.path, contents).map_err(|source| ReportError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// In-memory sink for tests
#[derive(Default)]
pub struct VecSink {
    rows: Mutex<Vec<InvoiceRow>>,
}

impl VecSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows written so far
    pub fn rows(&self) -> Vec<InvoiceRow> {
        self.rows.lock().unwrap().clone()
    }
}

impl ReportSink for VecSink {
    fn write(&self, rows: &[InvoiceRow]) -> Result<(), ReportError> {
        self.rows.lock().unwrap().extend_from_slice(rows);
        Ok(())
    }
}
