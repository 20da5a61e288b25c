//! Output formatting helpers for the CLI.

mod json;
mod text;

pub use json::print_record;
pub use text::{
    activity_rows, document_rows, invoice_rows, invoice_status, receipt_rows, return_rows,
    return_status, ACTIVITY_COLUMNS, DOCUMENT_COLUMNS, INVOICE_COLUMNS, RECEIPT_COLUMNS,
    RETURN_COLUMNS,
};
