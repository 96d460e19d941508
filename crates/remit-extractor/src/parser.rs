//! Parse LLM output into an invoice

use crate::error::ExtractorError;
use chrono::NaiveDate;
use remit_domain::{Currency, Invoice, InvoiceStatus, LineItem};
use serde_json::Value;
use tracing::warn;

/// Parse an LLM JSON response into an [`Invoice`]
pub fn parse_invoice_response(response: &str) -> Result<Invoice, ExtractorError> {
    // LLMs sometimes wrap JSON in markdown code blocks
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| ExtractorError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    let obj = json
        .as_object()
        .ok_or_else(|| ExtractorError::InvalidFormat("Expected JSON object".to_string()))?;

    let vendor_name = string_field(obj, "vendor_name");
    let invoice_number = string_field(obj, "invoice_number");
    let bill_to = string_field(obj, "bill_to");
    let total_amount = obj.get("total_amount").and_then(Value::as_f64);

    let invoice_date = string_field(obj, "invoice_date").and_then(|s| {
        match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(e) => {
                warn!("Dropping unparseable invoice_date '{}': {}", s, e);
                None
            }
        }
    });

    let currency = string_field(obj, "currency").and_then(|s| {
        let parsed = Currency::parse(&s);
        if parsed.is_none() {
            warn!("Dropping unknown currency '{}'", s);
        }
        parsed
    });

    let status = match string_field(obj, "status") {
        None => InvoiceStatus::Ok,
        Some(s) => InvoiceStatus::parse(&s).ok_or_else(|| {
            ExtractorError::InvalidFormat(format!("Unknown status '{}'", s))
        })?,
    };

    let review_reason = string_field(obj, "review_reason");

    let mut line_items = Vec::new();
    if let Some(items) = obj.get("line_items").and_then(Value::as_array) {
        for (idx, item_json) in items.iter().enumerate() {
            match parse_line_item(item_json) {
                Ok(item) => line_items.push(item),
                Err(e) => {
                    warn!("Skipping line item {}: {}", idx, e);
                }
            }
        }
    }

    Ok(Invoice {
        vendor_name,
        invoice_date,
        invoice_number,
        total_amount,
        currency,
        bill_to,
        line_items,
        status,
        review_reason,
    })
}

/// Extract JSON from a response, handling markdown code blocks
fn extract_json(response: &str) -> Result<String, ExtractorError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```json") || trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(ExtractorError::InvalidFormat("Empty code block".to_string()));
        }

        // Skip first line (```json or ```) and last line (```)
        let json_lines = &lines[1..lines.len().saturating_sub(1)];
        Ok(json_lines.join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Parse a single line item from JSON
fn parse_line_item(json: &Value) -> Result<LineItem, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "Line item is not a JSON object".to_string())?;

    let description = obj
        .get("description")
        .and_then(Value::as_str)
        .ok_or_else(|| "Missing or invalid 'description'".to_string())?
        .to_string();

    Ok(LineItem {
        description,
        quantity: obj.get("quantity").and_then(Value::as_f64),
        unit_price: obj.get("unit_price").and_then(Value::as_f64),
        amount: obj.get("amount").and_then(Value::as_f64),
    })
}

/// A nullable string field; JSON null and a missing key both read as `None`
fn string_field(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RESPONSE: &str = r#"{
        "vendor_name": "Acme Corp",
        "invoice_date": "2024-10-03",
        "invoice_number": "INV-2024-1001",
        "total_amount": 450.0,
        "currency": "USD",
        "bill_to": "Global Corp Ltd.",
        "line_items": [
            {"description": "Cloud hosting", "quantity": 1, "unit_price": 300.0, "amount": 300.0},
            {"description": "Support plan", "quantity": 3, "unit_price": 50.0, "amount": 150.0}
        ],
        "status": "OK",
        "review_reason": null
    }"#;

    #[test]
    fn test_parse_full_invoice() {
        let invoice = parse_invoice_response(FULL_RESPONSE).unwrap();
        assert_eq!(invoice.vendor_name.as_deref(), Some("Acme Corp"));
        assert_eq!(invoice.invoice_date_iso().as_deref(), Some("2024-10-03"));
        assert_eq!(invoice.invoice_number.as_deref(), Some("INV-2024-1001"));
        assert_eq!(invoice.total_amount, Some(450.0));
        assert_eq!(invoice.currency, Some(Currency::Usd));
        assert_eq!(invoice.line_items.len(), 2);
        assert_eq!(invoice.status, InvoiceStatus::Ok);
    }

    #[test]
    fn test_parse_with_markdown_wrapper() {
        let response = format!("```json\n{}\n```", FULL_RESPONSE);
        let invoice = parse_invoice_response(&response).unwrap();
        assert_eq!(invoice.vendor_name.as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn test_parse_minimal_object_defaults() {
        let invoice = parse_invoice_response("{}").unwrap();
        assert!(invoice.vendor_name.is_none());
        assert!(invoice.invoice_date.is_none());
        assert!(invoice.line_items.is_empty());
        assert_eq!(invoice.status, InvoiceStatus::Ok);
    }

    #[test]
    fn test_parse_needs_review_status() {
        let response = r#"{
            "vendor_name": "Acme Corp",
            "status": "NEEDS_REVIEW",
            "review_reason": "totals are illegible"
        }"#;
        let invoice = parse_invoice_response(response).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::NeedsReview);
        assert_eq!(
            invoice.review_reason.as_deref(),
            Some("totals are illegible")
        );
    }

    #[test]
    fn test_parse_unknown_status_errors() {
        let result = parse_invoice_response(r#"{"status": "MAYBE"}"#);
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_not_json_errors() {
        let result = parse_invoice_response("this is not JSON");
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_array_errors() {
        let result = parse_invoice_response("[1, 2, 3]");
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_bad_date_and_currency_dropped() {
        let response = r#"{
            "vendor_name": "Acme Corp",
            "invoice_date": "October 3rd",
            "currency": "GBP"
        }"#;
        let invoice = parse_invoice_response(response).unwrap();
        assert!(invoice.invoice_date.is_none());
        assert!(invoice.currency.is_none());
        assert_eq!(invoice.vendor_name.as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn test_invalid_line_items_skipped() {
        let response = r#"{
            "vendor_name": "Acme Corp",
            "line_items": [
                {"description": "Valid item", "amount": 10.0},
                {"amount": 20.0},
                "not an object"
            ]
        }"#;
        let invoice = parse_invoice_response(response).unwrap();
        assert_eq!(invoice.line_items.len(), 1);
        assert_eq!(invoice.line_items[0].description, "Valid item");
    }

    #[test]
    fn test_null_fields_read_as_none() {
        let response = r#"{
            "vendor_name": null,
            "invoice_date": null,
            "total_amount": null
        }"#;
        let invoice = parse_invoice_response(response).unwrap();
        assert!(invoice.vendor_name.is_none());
        assert!(invoice.total_amount.is_none());
    }
}
