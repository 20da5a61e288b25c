//! JSON output for records.

use serde::Serialize;

/// Serialize any record (or list of records) to a JSON value.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| anyhow::anyhow!("Failed to encode JSON: {}", e))
}

/// Print a record as pretty JSON on stdout.
pub fn print_record<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    crate::ui::print_json(&to_json(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use taxdesk_core::payments::{Invoice, InvoiceStatus};

    #[test]
    fn test_invoice_json_uses_stored_field_names() {
        let invoice = Invoice {
            id: "INV-001".to_string(),
            description: "Prep".to_string(),
            amount: 250.0,
            due_date: NaiveDate::from_ymd_opt(2024, 4, 15).unwrap(),
            status: InvoiceStatus::Unpaid,
            paid_date: None,
            payment_method: None,
        };
        let value = to_json(&invoice).unwrap();
        assert_eq!(value["id"], "INV-001");
        assert_eq!(value["dueDate"], "2024-04-15");
        assert!(value.get("paidDate").is_none());
    }
}
