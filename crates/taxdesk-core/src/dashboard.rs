//! Dashboard summary.

use serde::Serialize;

use crate::activity::{filter_activities, ActivityFilter, ActivityLogEntry};
use crate::collections::get_collection;
use crate::payments::{Invoice, InvoiceStatus};
use crate::returns::{ReturnStatus, TaxReturn};
use crate::seed::{seed_invoices, seed_returns};
use crate::storage::{KeyValueStore, Slot};
use crate::workspace::Page;

/// Number of returns shown under "Recent Returns".
pub const RECENT_RETURNS: usize = 3;
/// Number of entries shown under "Recent Activity".
pub const RECENT_ACTIVITY: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_returns: usize,
    pub pending_returns: usize,
    pub completed_returns: usize,
    pub total_invoices: usize,
    pub unpaid_invoices: usize,
    pub total_amount: f64,
    pub unpaid_amount: f64,
    pub recent_returns: Vec<TaxReturn>,
    pub recent_activity: Vec<ActivityLogEntry>,
}

impl DashboardSummary {
    pub fn build(returns: &[TaxReturn], invoices: &[Invoice], recent_activity: Vec<ActivityLogEntry>) -> Self {
        let unpaid: Vec<&Invoice> = invoices
            .iter()
            .filter(|i| i.status == InvoiceStatus::Unpaid)
            .collect();
        Self {
            total_returns: returns.len(),
            pending_returns: returns.iter().filter(|r| r.status == ReturnStatus::Pending).count(),
            completed_returns: returns
                .iter()
                .filter(|r| r.status == ReturnStatus::Completed)
                .count(),
            total_invoices: invoices.len(),
            unpaid_invoices: unpaid.len(),
            total_amount: invoices.iter().map(|i| i.amount).sum(),
            unpaid_amount: unpaid.iter().map(|i| i.amount).sum(),
            recent_returns: returns.iter().take(RECENT_RETURNS).cloned().collect(),
            recent_activity,
        }
    }
}

pub(crate) fn summarize<S: KeyValueStore>(mut page: Page<'_, S>) -> DashboardSummary {
    let returns: Vec<TaxReturn> = get_collection(&mut *page.store, Slot::Returns, seed_returns);
    let invoices: Vec<Invoice> = get_collection(&mut *page.store, Slot::Invoices, seed_invoices);
    let activities: Vec<ActivityLogEntry> = get_collection(&mut *page.store, Slot::Activities, Vec::new);
    let recent = filter_activities(
        &activities,
        &page.user.id,
        &ActivityFilter::new().limit(RECENT_ACTIVITY),
    );
    DashboardSummary::build(&returns, &invoices, recent)
}
