//! First-run data for collections that start non-empty.

use chrono::NaiveDate;

use crate::payments::{Invoice, InvoiceStatus, PaymentMethod, Receipt};
use crate::returns::{ReturnStatus, TaxReturn};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

pub fn seed_returns() -> Vec<TaxReturn> {
    vec![
        TaxReturn {
            id: "1".to_string(),
            return_type: "1040".to_string(),
            year: 2023,
            status: ReturnStatus::Completed,
            created_date: date(2024, 1, 15),
            last_updated: date(2024, 3, 2),
            document_count: 3,
            documents: vec![
                "W-2.pdf".to_string(),
                "1099-INT.pdf".to_string(),
                "receipts.pdf".to_string(),
            ],
        },
        TaxReturn {
            id: "2".to_string(),
            return_type: "1040-ES".to_string(),
            year: 2024,
            status: ReturnStatus::InReview,
            created_date: date(2024, 4, 1),
            last_updated: date(2024, 4, 10),
            document_count: 1,
            documents: vec!["estimate-worksheet.pdf".to_string()],
        },
        TaxReturn {
            id: "3".to_string(),
            return_type: "Schedule C".to_string(),
            year: 2024,
            status: ReturnStatus::Pending,
            created_date: date(2024, 5, 20),
            last_updated: date(2024, 5, 20),
            document_count: 0,
            documents: Vec::new(),
        },
    ]
}

pub fn seed_invoices() -> Vec<Invoice> {
    vec![
        Invoice {
            id: "INV-001".to_string(),
            description: "2023 individual return preparation".to_string(),
            amount: 350.0,
            due_date: date(2024, 4, 15),
            status: InvoiceStatus::Paid,
            paid_date: Some(date(2024, 3, 28)),
            payment_method: Some(PaymentMethod::CreditCard),
        },
        Invoice {
            id: "INV-002".to_string(),
            description: "Quarterly estimate review".to_string(),
            amount: 125.0,
            due_date: date(2024, 6, 15),
            status: InvoiceStatus::Unpaid,
            paid_date: None,
            payment_method: None,
        },
        Invoice {
            id: "INV-003".to_string(),
            description: "Schedule C bookkeeping".to_string(),
            amount: 480.5,
            due_date: date(2024, 7, 31),
            status: InvoiceStatus::Unpaid,
            paid_date: None,
            payment_method: None,
        },
    ]
}

pub fn seed_receipts() -> Vec<Receipt> {
    vec![Receipt {
        id: "REC-1711584000000".to_string(),
        invoice_id: "INV-001".to_string(),
        amount: 350.0,
        paid_on: date(2024, 3, 28),
        payment_method: PaymentMethod::CreditCard,
        description: "2023 individual return preparation".to_string(),
    }]
}
