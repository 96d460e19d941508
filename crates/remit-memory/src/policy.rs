//! Vendor-trust policy.
//!
//! Once a vendor has produced a problematic extraction, every later "clean"
//! extraction from that vendor is treated with suspicion until a human clears
//! it out of band — there is no unflag operation in this layer.

use crate::store::MemoryStore;
use remit_domain::{Invoice, InvoiceStatus};

/// Review reason attached to escalated invoices.
pub const ESCALATION_REASON: &str = "Vendor previously flagged in processing memory";

/// Apply the vendor-trust policy to a freshly extracted invoice.
///
/// An invoice with no vendor cannot be attributed and an `ERROR` invoice is
/// not subject to escalation; both pass through untouched. Otherwise, an `OK`
/// invoice from a flagged vendor is downgraded to `NEEDS_REVIEW` with
/// [`ESCALATION_REASON`]. A `NEEDS_REVIEW` invoice keeps its own status and
/// reason — escalation never happens twice and never un-escalates.
pub fn apply_vendor_policy(store: &MemoryStore, invoice: &mut Invoice) {
    let Some(vendor) = invoice.vendor_name.as_deref() else {
        return;
    };
    if invoice.status == InvoiceStatus::Error {
        return;
    }

    if store.is_flagged(vendor) && invoice.status == InvoiceStatus::Ok {
        invoice.status = InvoiceStatus::NeedsReview;
        invoice.review_reason = Some(ESCALATION_REASON.to_string());
    }
}
