//! Tax returns page.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::activity::{ActivityKind, NewActivity};
use crate::collections::{get_collection, timestamp_id, update_collection};
use crate::error::{Result, TaxdeskError};
use crate::seed::seed_returns;
use crate::storage::{KeyValueStore, Slot};
use crate::workspace::Page;

/// Review status of a return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnStatus {
    Pending,
    #[serde(rename = "In Review")]
    InReview,
    Completed,
}

impl ReturnStatus {
    pub const ALL: [ReturnStatus; 3] = [
        ReturnStatus::Pending,
        ReturnStatus::InReview,
        ReturnStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnStatus::Pending => "Pending",
            ReturnStatus::InReview => "In Review",
            ReturnStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReturnStatus {
    type Err = TaxdeskError;

    /// Accepts the display form and common CLI spellings (`in-review`, `in_review`).
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "pending" => Ok(ReturnStatus::Pending),
            "inreview" => Ok(ReturnStatus::InReview),
            "completed" => Ok(ReturnStatus::Completed),
            _ => Err(TaxdeskError::InvalidInput(format!(
                "Unknown return status \"{}\" (expected Pending, In Review, Completed)",
                s
            ))),
        }
    }
}

/// Which status changes are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Any change between distinct states, including `Pending -> Completed`.
    #[default]
    Permissive,
    /// Forward through review only; `In Review` may be sent back to `Pending`.
    Strict,
}

impl TransitionPolicy {
    pub fn allows(&self, from: ReturnStatus, to: ReturnStatus) -> bool {
        use ReturnStatus::*;
        if from == to {
            return false;
        }
        match self {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::Strict => matches!(
                (from, to),
                (Pending, InReview) | (InReview, Completed) | (InReview, Pending)
            ),
        }
    }

    /// Statuses reachable from `from` in one step.
    pub fn targets(&self, from: ReturnStatus) -> Vec<ReturnStatus> {
        ReturnStatus::ALL
            .iter()
            .copied()
            .filter(|to| self.allows(from, *to))
            .collect()
    }
}

/// A stored tax return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxReturn {
    pub id: String,
    #[serde(rename = "type")]
    pub return_type: String,
    pub year: i32,
    pub status: ReturnStatus,
    pub created_date: NaiveDate,
    pub last_updated: NaiveDate,
    pub document_count: u32,
    /// Names of attached documents.
    #[serde(default)]
    pub documents: Vec<String>,
}

/// Form input for a new return.
#[derive(Debug, Clone)]
pub struct NewTaxReturn {
    pub return_type: String,
    pub year: i32,
    pub documents: Vec<String>,
}

impl NewTaxReturn {
    pub fn new(return_type: impl Into<String>, year: i32) -> Self {
        Self {
            return_type: return_type.into(),
            year,
            documents: Vec::new(),
        }
    }

    pub fn with_documents(mut self, documents: Vec<String>) -> Self {
        self.documents = documents;
        self
    }
}

/// Edit form input. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct TaxReturnUpdate {
    pub return_type: Option<String>,
    pub year: Option<i32>,
    pub documents: Option<Vec<String>>,
}

/// Counts shown on the returns page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnStats {
    pub total: usize,
    pub pending: usize,
    pub in_review: usize,
    pub completed: usize,
}

impl ReturnStats {
    pub fn from_returns(returns: &[TaxReturn]) -> Self {
        let count = |status| returns.iter().filter(|r| r.status == status).count();
        Self {
            total: returns.len(),
            pending: count(ReturnStatus::Pending),
            in_review: count(ReturnStatus::InReview),
            completed: count(ReturnStatus::Completed),
        }
    }
}

fn position(returns: &[TaxReturn], id: &str) -> Result<usize> {
    returns
        .iter()
        .position(|r| r.id == id)
        .ok_or_else(|| TaxdeskError::not_found("Tax return", id))
}

fn count_documents(documents: &[String]) -> u32 {
    u32::try_from(documents.len()).unwrap_or(u32::MAX)
}

/// The returns page for the logged-in user.
pub struct Returns<'a, S: KeyValueStore> {
    page: Page<'a, S>,
    policy: TransitionPolicy,
}

impl<'a, S: KeyValueStore> Returns<'a, S> {
    pub(crate) fn new(page: Page<'a, S>, policy: TransitionPolicy) -> Self {
        Self { page, policy }
    }

    /// All returns, newest first.
    pub fn list(&mut self) -> Vec<TaxReturn> {
        get_collection(&mut *self.page.store, Slot::Returns, seed_returns)
    }

    pub fn list_by_status(&mut self, status: ReturnStatus) -> Vec<TaxReturn> {
        self.list()
            .into_iter()
            .filter(|r| r.status == status)
            .collect()
    }

    pub fn get(&mut self, id: &str) -> Result<TaxReturn> {
        let returns = self.list();
        let index = position(&returns, id)?;
        Ok(returns[index].clone())
    }

    pub fn stats(&mut self) -> ReturnStats {
        ReturnStats::from_returns(&self.list())
    }

    /// File a new return. It starts `Pending` at the top of the list.
    pub fn create(&mut self, new: NewTaxReturn) -> Result<TaxReturn> {
        if new.return_type.trim().is_empty() {
            return Err(TaxdeskError::InvalidInput("Return type is required".to_string()));
        }
        let clock = self.page.clock;
        let today = clock.today();

        let created = update_collection(
            &mut *self.page.store,
            Slot::Returns,
            seed_returns,
            |returns: &mut Vec<TaxReturn>| {
                let id = timestamp_id(clock, "", |candidate| returns.iter().any(|r| r.id == candidate));
                let record = TaxReturn {
                    id,
                    return_type: new.return_type.trim().to_string(),
                    year: new.year,
                    status: ReturnStatus::Pending,
                    created_date: today,
                    last_updated: today,
                    document_count: count_documents(&new.documents),
                    documents: new.documents,
                };
                returns.insert(0, record.clone());
                Ok(record)
            },
        )?;

        self.page.log(NewActivity::new(
            ActivityKind::Return,
            "Tax Return Created",
            format!("New {} return created", created.return_type),
        ));
        Ok(created)
    }

    /// Edit type, year, or attached documents.
    pub fn update(&mut self, id: &str, update: TaxReturnUpdate) -> Result<TaxReturn> {
        if let Some(return_type) = &update.return_type {
            if return_type.trim().is_empty() {
                return Err(TaxdeskError::InvalidInput("Return type is required".to_string()));
            }
        }
        let today = self.page.clock.today();

        let updated = update_collection(
            &mut *self.page.store,
            Slot::Returns,
            seed_returns,
            |returns: &mut Vec<TaxReturn>| {
                let index = position(returns, id)?;
                let record = &mut returns[index];
                if let Some(return_type) = update.return_type {
                    record.return_type = return_type.trim().to_string();
                }
                if let Some(year) = update.year {
                    record.year = year;
                }
                if let Some(documents) = update.documents {
                    record.documents = documents;
                }
                record.document_count = count_documents(&record.documents);
                record.last_updated = today;
                Ok(record.clone())
            },
        )?;

        self.page.log(NewActivity::new(
            ActivityKind::Return,
            "Tax Return Updated",
            format!("Return #{} was modified", updated.id),
        ));
        Ok(updated)
    }

    /// Move a return to `status`, subject to the transition policy.
    pub fn change_status(&mut self, id: &str, status: ReturnStatus) -> Result<TaxReturn> {
        let today = self.page.clock.today();
        let policy = self.policy;

        let updated = update_collection(
            &mut *self.page.store,
            Slot::Returns,
            seed_returns,
            |returns: &mut Vec<TaxReturn>| {
                let index = position(returns, id)?;
                let record = &mut returns[index];
                if !policy.allows(record.status, status) {
                    return Err(TaxdeskError::InvalidTransition(format!(
                        "Return #{} cannot move from {} to {}",
                        record.id, record.status, status
                    )));
                }
                record.status = status;
                record.last_updated = today;
                Ok(record.clone())
            },
        )?;

        self.page.log(NewActivity::new(
            ActivityKind::Return,
            "Status Updated",
            format!("Return #{} status changed to {}", updated.id, status),
        ));
        Ok(updated)
    }

    pub fn delete(&mut self, id: &str) -> Result<TaxReturn> {
        let removed = update_collection(
            &mut *self.page.store,
            Slot::Returns,
            seed_returns,
            |returns: &mut Vec<TaxReturn>| {
                let index = position(returns, id)?;
                Ok(returns.remove(index))
            },
        )?;

        self.page.log(NewActivity::new(
            ActivityKind::Return,
            "Tax Return Deleted",
            format!("Return #{} was deleted", removed.id),
        ));
        Ok(removed)
    }
}
