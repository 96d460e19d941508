//! Mock invoice source for runs without the LLM extractor

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use remit_domain::{Currency, Invoice, InvoiceStatus, LineItem};
use std::sync::atomic::{AtomicU32, Ordering};

const VENDORS: &[&str] = &[
    "TechNova Solutions",
    "QuickSupply IL",
    "Stratford & Oak Consulting",
    "Global Services Ltd",
    "Digital Innovations Inc",
];

const BILL_TO_OPTIONS: &[&str] = &[
    "Global Corp Ltd.\nAttn: Finance Dept.\nTel Aviv, Israel",
    "Acme Corporation\n123 Business St.\nNew York, NY 10001",
    "European Trading Co.\nBerlin, Germany",
    "Local Business Solutions\nJerusalem, Israel",
    "International Partners\nLondon, UK",
];

const LINE_ITEM_DESCRIPTIONS: &[&str] = &[
    "Cloud Server Hosting (AWS Reserved)",
    "API Gateway Usage - Tier 2",
    "Dedicated Support Plan (Monthly)",
    "Software License - Annual",
    "Consulting Services - 40 hours",
    "Data Storage - 1TB",
    "Network Bandwidth - Premium",
    "Security Monitoring Service",
    "Backup & Recovery Service",
    "Technical Support - Priority",
];

const CURRENCIES: &[Currency] = &[Currency::Usd, Currency::Eur, Currency::Ils];

/// Generates plausible invoices without touching a document or the LLM.
///
/// Invoice numbers are sequential per source; everything else is random.
#[derive(Debug, Default)]
pub struct MockInvoiceSource {
    counter: AtomicU32,
}

impl MockInvoiceSource {
    /// Create a new source
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the next mock invoice
    pub fn next_invoice(&self) -> Invoice {
        let mut rng = rand::thread_rng();
        let seq = self.counter.fetch_add(1, Ordering::Relaxed) + 1;

        let item_count = rng.gen_range(2..=4);
        let mut line_items = Vec::with_capacity(item_count);
        let mut total = 0.0;
        for _ in 0..item_count {
            let quantity = rng.gen_range(1..=12) as f64;
            let unit_price = (rng.gen_range(20.0..500.0) * 100.0_f64).round() / 100.0;
            let amount = (quantity * unit_price * 100.0).round() / 100.0;
            total += amount;

            line_items.push(LineItem {
                description: LINE_ITEM_DESCRIPTIONS
                    .choose(&mut rng)
                    .unwrap()
                    .to_string(),
                quantity: Some(quantity),
                unit_price: Some(unit_price),
                amount: Some(amount),
            });
        }

        Invoice {
            vendor_name: Some(VENDORS.choose(&mut rng).unwrap().to_string()),
            invoice_date: NaiveDate::from_ymd_opt(2024, 10, rng.gen_range(1..=28)),
            invoice_number: Some(format!("INV-2024-{:04}", 1000 + seq)),
            total_amount: Some((total * 100.0).round() / 100.0),
            currency: Some(*CURRENCIES.choose(&mut rng).unwrap()),
            bill_to: Some(BILL_TO_OPTIONS.choose(&mut rng).unwrap().to_string()),
            line_items,
            status: InvoiceStatus::Ok,
            review_reason: None,
        }
    }
}
