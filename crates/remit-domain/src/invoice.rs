//! Invoice module - the structured result of one document extraction

use chrono::NaiveDate;
use std::fmt;

/// Processing status of an extracted invoice.
///
/// `Ok` means the extraction looked clean. `NeedsReview` marks a result a
/// human should look at, either because the extractor said so or because the
/// vendor policy escalated it. `Error` means extraction failed outright and
/// the invoice fields are not to be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InvoiceStatus {
    /// Extraction completed with no concerns
    #[default]
    Ok,

    /// Extraction completed but needs a human look
    NeedsReview,

    /// Extraction failed
    Error,
}

impl InvoiceStatus {
    /// Wire/storage representation (`OK`, `NEEDS_REVIEW`, `ERROR`)
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Ok => "OK",
            InvoiceStatus::NeedsReview => "NEEDS_REVIEW",
            InvoiceStatus::Error => "ERROR",
        }
    }

    /// Parse the wire/storage representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OK" => Some(InvoiceStatus::Ok),
            "NEEDS_REVIEW" => Some(InvoiceStatus::NeedsReview),
            "ERROR" => Some(InvoiceStatus::Error),
            _ => None,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Currency codes the extractor is allowed to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    /// US dollar
    Usd,
    /// Euro
    Eur,
    /// Israeli new shekel
    Ils,
}

impl Currency {
    /// ISO 4217 code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Ils => "ILS",
        }
    }

    /// Parse an ISO 4217 code (case-sensitive, matching the extraction schema)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "USD" => Some(Currency::Usd),
            "EUR" => Some(Currency::Eur),
            "ILS" => Some(Currency::Ils),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A billed line on an invoice
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    /// What was billed
    pub description: String,

    /// Quantity, when the document states one
    pub quantity: Option<f64>,

    /// Price per unit
    pub unit_price: Option<f64>,

    /// Line total
    pub amount: Option<f64>,
}

/// The structured result of extracting one invoice document.
///
/// Every field except `status` is what the extractor managed to read; any of
/// them can be missing. An `Error` status carries no trustworthy fields at
/// all — the orchestrator builds those invoices with everything unset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Invoice {
    /// Supplier / vendor who issued the invoice (the seller)
    pub vendor_name: Option<String>,

    /// Date the invoice was issued
    pub invoice_date: Option<NaiveDate>,

    /// Vendor-assigned invoice number
    pub invoice_number: Option<String>,

    /// Grand total
    pub total_amount: Option<f64>,

    /// Currency of the total and line amounts
    pub currency: Option<Currency>,

    /// Customer/client who receives the invoice (the buyer)
    pub bill_to: Option<String>,

    /// Billed lines, possibly empty
    pub line_items: Vec<LineItem>,

    /// Processing status
    pub status: InvoiceStatus,

    /// Why the invoice needs review, when it does
    pub review_reason: Option<String>,
}

impl Invoice {
    /// Invoice date as an ISO `YYYY-MM-DD` string, for storage and reporting
    pub fn invoice_date_iso(&self) -> Option<String> {
        self.invoice_date.map(|d| d.format("%Y-%m-%d").to_string())
    }
}
