//! Output formatting for the CLI.

use colored::*;
use remit_memory::VendorFlagEntry;
use remit_report::InvoiceRow;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Format report rows as a table.
    pub fn format_rows(&self, rows: &[InvoiceRow]) -> String {
        if rows.is_empty() {
            return self.colorize("No rows produced.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record([
            "File", "Vendor", "Date", "Number", "Currency", "Status", "Description", "Qty",
            "Rate", "Amount",
        ]);

        for row in rows {
            builder.push_record([
                row.file.clone(),
                opt_str(&row.vendor_name),
                opt_str(&row.invoice_date),
                opt_str(&row.invoice_number),
                opt_str(&row.currency),
                row.status.clone(),
                opt_str(&row.description),
                opt_num(row.quantity),
                opt_num(row.rate),
                opt_num(row.amount),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format the flagged-vendor ledger as a table.
    pub fn format_vendors<'a, I>(&self, vendors: I) -> String
    where
        I: Iterator<Item = (&'a str, &'a VendorFlagEntry)>,
    {
        let mut builder = Builder::default();
        builder.push_record(["Vendor", "Flags", "Last reason", "Last seen"]);

        let mut count = 0;
        for (name, entry) in vendors {
            count += 1;
            builder.push_record([
                name.to_string(),
                entry.count.to_string(),
                entry.last_reason.clone().unwrap_or_default(),
                entry.last_seen.clone().unwrap_or_default(),
            ]);
        }

        if count == 0 {
            return self.colorize("No flagged vendors.", "green");
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Marker shown next to a filename in the status listing.
    pub fn status_marker(&self, status: Option<&str>) -> String {
        match status {
            Some("NEEDS_REVIEW") => format!(" [{}]", self.colorize("NEEDS_REVIEW", "yellow")),
            Some("ERROR") => format!(" [{}]", self.colorize("ERROR", "red")),
            _ => String::new(),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn opt_str(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn opt_num(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}
