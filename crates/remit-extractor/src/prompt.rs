//! LLM prompt engineering for invoice extraction

use remit_memory::VendorFlagEntry;

/// Builds prompts for the LLM to extract one invoice
pub struct PromptBuilder {
    text: String,
    vendor_context: Option<String>,
}

impl PromptBuilder {
    /// Create a new prompt builder for a document's text
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            vendor_context: None,
        }
    }

    /// Add vendor history context for a flagged vendor
    pub fn with_vendor_context(mut self, context: impl Into<String>) -> Self {
        self.vendor_context = Some(context.into());
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Instruction and schema specification
        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        // 2. Vendor memory (if any)
        if let Some(context) = &self.vendor_context {
            prompt.push_str("IMPORTANT CONTEXT FROM MEMORY:\n");
            prompt.push_str(context);
            prompt.push_str("\n\n");
        }

        // 3. The document to analyze
        prompt.push_str("Extract invoice fields from this text:\n");
        prompt.push_str("---\n");
        prompt.push_str(&self.text);
        prompt.push_str("\n---\n\n");

        // 4. Output format reminder
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }
}

/// Build the context message injected for a flagged vendor.
///
/// The extractor is stateless per call, so vendor memory has to travel as
/// prompt text rather than anything the model could remember.
pub fn vendor_context_message(vendor: &str, entry: &VendorFlagEntry) -> String {
    format!(
        "Vendor '{}' was previously flagged {} time(s). Last issue: {}. \
         Be extra careful when extracting data from this vendor.",
        vendor,
        entry.count,
        entry.last_reason.as_deref().unwrap_or("unknown"),
    )
}

const EXTRACTION_INSTRUCTIONS: &str = r#"You extract structured invoice data from raw document text.
Return only fields defined in the schema. If a field is missing, set it to null.

{
  "vendor_name": string or null,
  "invoice_date": "YYYY-MM-DD" or null,
  "invoice_number": string or null,
  "total_amount": number or null,
  "currency": "USD" | "EUR" | "ILS" or null,
  "bill_to": string or null,
  "line_items": [
    {"description": string, "quantity": number or null, "unit_price": number or null, "amount": number or null}
  ],
  "status": "OK" | "NEEDS_REVIEW",
  "review_reason": string or null
}

IMPORTANT FIELD CLARIFICATIONS:
- vendor_name: The supplier/vendor who issued the invoice (the seller).
- bill_to: The customer/client who receives the invoice (the buyer). This is NOT the vendor's address. Look for 'Bill To', 'Ship To', 'Customer', or 'Client' sections. If no bill_to information is found, set it to null.
- Do NOT confuse the vendor address with the bill_to address.
- status: "OK" when the fields read cleanly; "NEEDS_REVIEW" with a review_reason when the document is ambiguous, illegible, or internally inconsistent."#;

const OUTPUT_FORMAT_REMINDER: &str =
    "Remember: Return ONLY the JSON object, no markdown code blocks, no explanations.";
