//! Table rows for record lists.

use chrono::{DateTime, Utc};

use taxdesk_core::activity::{describe_age, ActivityLogEntry};
use taxdesk_core::documents::{format_file_size, Document};
use taxdesk_core::payments::{format_currency, Invoice, InvoiceStatus, Receipt};
use taxdesk_core::returns::{ReturnStatus, TaxReturn};

use crate::ui::theme::{styled, styles};
use crate::ui::{truncate, Column, UiContext};

pub const RETURN_COLUMNS: [Column; 6] = [
    Column::new("ID"),
    Column::new("Type"),
    Column::new("Year"),
    Column::new("Status"),
    Column::new("Docs"),
    Column::new("Updated"),
];

pub const DOCUMENT_COLUMNS: [Column; 6] = [
    Column::new("ID"),
    Column::new("Name"),
    Column::new("Type"),
    Column::new("Size"),
    Column::new("Uploaded"),
    Column::new("Comments"),
];

pub const INVOICE_COLUMNS: [Column; 6] = [
    Column::new("ID"),
    Column::new("Description"),
    Column::new("Amount"),
    Column::new("Due"),
    Column::new("Status"),
    Column::new("Paid"),
];

pub const RECEIPT_COLUMNS: [Column; 5] = [
    Column::new("ID"),
    Column::new("Invoice"),
    Column::new("Amount"),
    Column::new("Paid On"),
    Column::new("Method"),
];

pub const ACTIVITY_COLUMNS: [Column; 4] = [
    Column::new("When"),
    Column::new("Type"),
    Column::new("Description"),
    Column::new("Details"),
];

const COMMENT_WIDTH: usize = 32;
const MIN_DETAILS_WIDTH: usize = 24;

pub fn return_status(ctx: &UiContext, status: ReturnStatus) -> String {
    let style = match status {
        ReturnStatus::Pending => styles::warning(),
        ReturnStatus::InReview => styles::info(),
        ReturnStatus::Completed => styles::success(),
    };
    styled(status.as_str(), style, ctx.color)
}

pub fn invoice_status(ctx: &UiContext, status: InvoiceStatus) -> String {
    let style = match status {
        InvoiceStatus::Unpaid => styles::warning(),
        InvoiceStatus::Paid => styles::success(),
    };
    styled(status.as_str(), style, ctx.color)
}

pub fn return_rows(ctx: &UiContext, returns: &[TaxReturn]) -> Vec<Vec<String>> {
    returns
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.return_type.clone(),
                r.year.to_string(),
                return_status(ctx, r.status),
                r.document_count.to_string(),
                r.last_updated.to_string(),
            ]
        })
        .collect()
}

pub fn document_rows(ctx: &UiContext, documents: &[Document]) -> Vec<Vec<String>> {
    documents
        .iter()
        .map(|d| {
            let comments = if ctx.mode.is_pretty() {
                truncate(&d.comments, COMMENT_WIDTH)
            } else {
                d.comments.clone()
            };
            vec![
                d.id.clone(),
                d.name.clone(),
                d.kind.as_str().to_string(),
                format_file_size(d.size),
                d.upload_date.to_string(),
                comments,
            ]
        })
        .collect()
}

pub fn invoice_rows(ctx: &UiContext, invoices: &[Invoice]) -> Vec<Vec<String>> {
    invoices
        .iter()
        .map(|i| {
            let paid = match (i.paid_date, i.payment_method) {
                (Some(date), Some(method)) => format!("{} ({})", date, method.label()),
                (Some(date), None) => date.to_string(),
                _ => "-".to_string(),
            };
            vec![
                i.id.clone(),
                i.description.clone(),
                format_currency(i.amount),
                i.due_date.to_string(),
                invoice_status(ctx, i.status),
                paid,
            ]
        })
        .collect()
}

pub fn receipt_rows(receipts: &[Receipt]) -> Vec<Vec<String>> {
    receipts
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.invoice_id.clone(),
                format_currency(r.amount),
                r.paid_on.to_string(),
                r.payment_method.label().to_string(),
            ]
        })
        .collect()
}

/// Pretty mode shows relative ages; plain mode keeps RFC 3339 timestamps.
pub fn activity_rows(
    ctx: &UiContext,
    entries: &[ActivityLogEntry],
    now: DateTime<Utc>,
) -> Vec<Vec<String>> {
    let details_width = (ctx.width / 3).max(MIN_DETAILS_WIDTH);
    entries
        .iter()
        .map(|e| {
            let (when, details) = if ctx.mode.is_pretty() {
                (describe_age(e.timestamp, now), truncate(&e.details, details_width))
            } else {
                (e.timestamp.to_rfc3339(), e.details.clone())
            };
            vec![when, e.kind.as_str().to_string(), e.description.clone(), details]
        })
        .collect()
}
