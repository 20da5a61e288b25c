//! Invoices, payments, and receipts.
//!
//! Paying an invoice touches two slots: the invoice is marked paid, then a
//! receipt is prepended. If the receipt cannot be written the invoice write is
//! reverted so the two never disagree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::activity::{ActivityKind, NewActivity};
use crate::collections::{get_collection, load_collection, set_collection, timestamp_id, update_collection};
use crate::error::{Result, TaxdeskError};
use crate::seed::{seed_invoices, seed_receipts};
use crate::storage::{KeyValueStore, Slot};
use crate::workspace::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Unpaid,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Unpaid => "Unpaid",
            InvoiceStatus::Paid => "Paid",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    BankTransfer,
    Paypal,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::BankTransfer,
        PaymentMethod::Paypal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Paypal => "paypal",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::DebitCard => "Debit Card",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::Paypal => "PayPal",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = TaxdeskError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "creditcard" | "card" => Ok(PaymentMethod::CreditCard),
            "debitcard" | "debit" => Ok(PaymentMethod::DebitCard),
            "banktransfer" | "bank" => Ok(PaymentMethod::BankTransfer),
            "paypal" => Ok(PaymentMethod::Paypal),
            _ => Err(TaxdeskError::InvalidInput(format!(
                "Unknown payment method \"{}\" (expected credit_card, debit_card, bank_transfer, paypal)",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
}

/// Proof of payment. Written once by [`Payments::pay_invoice`], never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: String,
    pub invoice_id: String,
    pub amount: f64,
    pub paid_on: NaiveDate,
    pub payment_method: PaymentMethod,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub description: String,
    pub amount: f64,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
}

/// Result of a successful payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    pub invoice: Invoice,
    pub receipt: Receipt,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStats {
    pub total_invoices: usize,
    pub unpaid_invoices: usize,
    pub paid_invoices: usize,
    pub total_amount: f64,
    pub unpaid_amount: f64,
    pub paid_amount: f64,
    pub total_receipts: usize,
}

impl PaymentStats {
    pub fn from_records(invoices: &[Invoice], receipts: &[Receipt]) -> Self {
        let sum = |status: Option<InvoiceStatus>| -> f64 {
            invoices
                .iter()
                .filter(|i| status.map_or(true, |s| i.status == s))
                .map(|i| i.amount)
                .sum()
        };
        let unpaid = invoices
            .iter()
            .filter(|i| i.status == InvoiceStatus::Unpaid)
            .count();
        Self {
            total_invoices: invoices.len(),
            unpaid_invoices: unpaid,
            paid_invoices: invoices.len() - unpaid,
            total_amount: sum(None),
            unpaid_amount: sum(Some(InvoiceStatus::Unpaid)),
            paid_amount: sum(Some(InvoiceStatus::Paid)),
            total_receipts: receipts.len(),
        }
    }
}

/// Format a USD amount: `$1,234.50`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Next `INV-nnn` id after the highest numbered invoice.
fn next_invoice_id(invoices: &[Invoice]) -> String {
    let highest = invoices
        .iter()
        .filter_map(|i| i.id.strip_prefix("INV-"))
        .filter_map(|n| n.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("INV-{:03}", highest + 1)
}

fn position(invoices: &[Invoice], id: &str) -> Result<usize> {
    invoices
        .iter()
        .position(|i| i.id == id)
        .ok_or_else(|| TaxdeskError::not_found("Invoice", id))
}

/// The payments page for the logged-in user.
pub struct Payments<'a, S: KeyValueStore> {
    page: Page<'a, S>,
}

impl<'a, S: KeyValueStore> Payments<'a, S> {
    pub(crate) fn new(page: Page<'a, S>) -> Self {
        Self { page }
    }

    pub fn invoices(&mut self) -> Vec<Invoice> {
        get_collection(&mut *self.page.store, Slot::Invoices, seed_invoices)
    }

    /// Receipts, newest first.
    pub fn receipts(&mut self) -> Vec<Receipt> {
        get_collection(&mut *self.page.store, Slot::Receipts, seed_receipts)
    }

    pub fn invoice(&mut self, id: &str) -> Result<Invoice> {
        let invoices = self.invoices();
        let index = position(&invoices, id)?;
        Ok(invoices[index].clone())
    }

    pub fn stats(&mut self) -> PaymentStats {
        let invoices = self.invoices();
        let receipts = self.receipts();
        PaymentStats::from_records(&invoices, &receipts)
    }

    pub fn create_invoice(&mut self, new: NewInvoice) -> Result<Invoice> {
        if new.description.trim().is_empty() {
            return Err(TaxdeskError::InvalidInput("Description is required".to_string()));
        }
        if !new.amount.is_finite() || new.amount < 0.0 {
            return Err(TaxdeskError::InvalidInput(format!(
                "Invalid amount: {}",
                new.amount
            )));
        }

        let created = update_collection(
            &mut *self.page.store,
            Slot::Invoices,
            seed_invoices,
            |invoices: &mut Vec<Invoice>| {
                let invoice = Invoice {
                    id: next_invoice_id(invoices),
                    description: new.description.trim().to_string(),
                    amount: new.amount,
                    due_date: new.due_date,
                    status: InvoiceStatus::Unpaid,
                    paid_date: None,
                    payment_method: None,
                };
                invoices.push(invoice.clone());
                Ok(invoice)
            },
        )?;

        self.page.log(NewActivity::new(
            ActivityKind::Payment,
            "Invoice Created",
            format!("Invoice {} for {}", created.id, format_currency(created.amount)),
        ));
        Ok(created)
    }

    pub fn update_invoice(&mut self, id: &str, description: &str) -> Result<Invoice> {
        if description.trim().is_empty() {
            return Err(TaxdeskError::InvalidInput("Description is required".to_string()));
        }
        let updated = update_collection(
            &mut *self.page.store,
            Slot::Invoices,
            seed_invoices,
            |invoices: &mut Vec<Invoice>| {
                let index = position(invoices, id)?;
                invoices[index].description = description.trim().to_string();
                Ok(invoices[index].clone())
            },
        )?;

        self.page.log(NewActivity::new(
            ActivityKind::Payment,
            "Invoice Updated",
            format!("Invoice {} was modified", updated.id),
        ));
        Ok(updated)
    }

    /// Remove an invoice. Receipts that reference it are kept.
    pub fn delete_invoice(&mut self, id: &str) -> Result<Invoice> {
        let removed = update_collection(
            &mut *self.page.store,
            Slot::Invoices,
            seed_invoices,
            |invoices: &mut Vec<Invoice>| {
                let index = position(invoices, id)?;
                Ok(invoices.remove(index))
            },
        )?;

        self.page.log(NewActivity::new(
            ActivityKind::Payment,
            "Invoice Deleted",
            format!("Invoice {} was deleted", removed.id),
        ));
        Ok(removed)
    }

    /// Pay an unpaid invoice and issue its receipt.
    pub fn pay_invoice(&mut self, id: &str, details: PaymentDetails) -> Result<Payment> {
        let clock = self.page.clock;
        let today = clock.today();

        let mut invoices: Vec<Invoice> = load_collection(&*self.page.store, Slot::Invoices, seed_invoices)?;
        let mut receipts: Vec<Receipt> = load_collection(&*self.page.store, Slot::Receipts, seed_receipts)?;
        let before = invoices.clone();
        let index = position(&invoices, id)?;
        if invoices[index].status == InvoiceStatus::Paid {
            return Err(TaxdeskError::InvalidTransition(format!(
                "Invoice {} is already paid",
                id
            )));
        }

        let invoice = &mut invoices[index];
        invoice.status = InvoiceStatus::Paid;
        invoice.paid_date = Some(today);
        invoice.payment_method = Some(details.method);
        let invoice = invoice.clone();
        set_collection(&mut *self.page.store, Slot::Invoices, &invoices)?;

        let receipt = Receipt {
            id: timestamp_id(clock, "REC-", |candidate| receipts.iter().any(|r| r.id == candidate)),
            invoice_id: invoice.id.clone(),
            amount: invoice.amount,
            paid_on: today,
            payment_method: details.method,
            description: invoice.description.clone(),
        };
        receipts.insert(0, receipt.clone());
        if let Err(err) = set_collection(&mut *self.page.store, Slot::Receipts, &receipts) {
            if let Err(revert) = set_collection(&mut *self.page.store, Slot::Invoices, &before) {
                warn!(invoice = %id, error = %revert, "failed to revert invoice after receipt write failure");
            }
            return Err(err);
        }
        info!(invoice = %invoice.id, receipt = %receipt.id, "payment recorded");

        self.page.log(NewActivity::new(
            ActivityKind::Payment,
            "Payment Processed",
            format!("Payment of {} for {}", format_currency(invoice.amount), invoice.id),
        ));
        Ok(Payment { invoice, receipt })
    }
}
