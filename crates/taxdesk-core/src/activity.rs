//! Append-only activity log.
//!
//! Every committed mutation on returns, documents, invoices, and the session
//! appends exactly one entry to the `activities` slot, newest first.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::collections::{get_collection, load_collection, set_collection};
use crate::error::{Result, TaxdeskError};
use crate::storage::{KeyValueStore, Slot};
use crate::workspace::Page;

/// Category of an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Auth,
    Return,
    Document,
    Payment,
    System,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 5] = [
        ActivityKind::Auth,
        ActivityKind::Return,
        ActivityKind::Document,
        ActivityKind::Payment,
        ActivityKind::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Auth => "auth",
            ActivityKind::Return => "return",
            ActivityKind::Document => "document",
            ActivityKind::Payment => "payment",
            ActivityKind::System => "system",
        }
    }

    /// Human label used in filters and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            ActivityKind::Auth => "Authentication",
            ActivityKind::Return => "Tax Returns",
            ActivityKind::Document => "Documents",
            ActivityKind::Payment => "Payments",
            ActivityKind::System => "System",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = TaxdeskError;

    fn from_str(s: &str) -> Result<Self> {
        ActivityKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                TaxdeskError::InvalidInput(format!(
                    "Unknown activity type \"{}\" (expected auth, return, document, payment, system)",
                    s
                ))
            })
    }
}

/// Optional request context attached to an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// A stored activity entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub description: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ActivityMetadata>,
}

/// Builder for a new activity entry.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub kind: ActivityKind,
    pub description: String,
    pub details: String,
    pub metadata: Option<ActivityMetadata>,
}

impl NewActivity {
    pub fn new(kind: ActivityKind, description: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            details: details.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: ActivityMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Prepend one entry to the activity log and persist it.
///
/// The timestamp never goes backwards relative to the newest stored entry.
pub fn append_activity<S, C>(
    store: &mut S,
    clock: &C,
    user_id: &str,
    activity: NewActivity,
) -> Result<ActivityLogEntry>
where
    S: KeyValueStore + ?Sized,
    C: Clock + ?Sized,
{
    let mut entries: Vec<ActivityLogEntry> = load_collection(&*store, Slot::Activities, Vec::new)?;

    let mut timestamp = clock.now();
    if let Some(newest) = entries.first() {
        if newest.timestamp > timestamp {
            timestamp = newest.timestamp;
        }
    }

    let entry = ActivityLogEntry {
        id: Uuid::now_v7().to_string(),
        user_id: user_id.to_string(),
        kind: activity.kind,
        description: activity.description,
        details: activity.details,
        timestamp,
        metadata: activity.metadata,
    };
    entries.insert(0, entry.clone());
    set_collection(store, Slot::Activities, &entries)?;
    Ok(entry)
}

/// Filter for activity queries.
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub kind: Option<ActivityKind>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl ActivityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: ActivityKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = if term.trim().is_empty() { None } else { Some(term) };
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, entry: &ActivityLogEntry) -> bool {
        if let Some(kind) = self.kind {
            if entry.kind != kind {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let needle = term.to_lowercase();
            return entry.description.to_lowercase().contains(&needle)
                || entry.details.to_lowercase().contains(&needle);
        }
        true
    }
}

/// Apply `filter` to `entries` for one user, newest first.
pub fn filter_activities(
    entries: &[ActivityLogEntry],
    user_id: &str,
    filter: &ActivityFilter,
) -> Vec<ActivityLogEntry> {
    let mut matched: Vec<ActivityLogEntry> = entries
        .iter()
        .filter(|entry| entry.user_id == user_id && filter.matches(entry))
        .cloned()
        .collect();
    matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    if let Some(limit) = filter.limit {
        matched.truncate(limit);
    }
    matched
}

/// Relative age of a timestamp, as shown in the activity list.
pub fn describe_age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - timestamp;
    if elapsed.num_minutes() < 60 {
        format!("{} minutes ago", elapsed.num_minutes().max(0))
    } else if elapsed.num_hours() < 24 {
        format!("{} hours ago", elapsed.num_hours())
    } else {
        timestamp.format("%Y-%m-%d at %H:%M:%S").to_string()
    }
}

/// The activity log page for the logged-in user.
pub struct ActivityLog<'a, S: KeyValueStore> {
    page: Page<'a, S>,
}

impl<'a, S: KeyValueStore> ActivityLog<'a, S> {
    pub(crate) fn new(page: Page<'a, S>) -> Self {
        Self { page }
    }

    fn all(&mut self) -> Vec<ActivityLogEntry> {
        get_collection(&mut *self.page.store, Slot::Activities, Vec::new)
    }

    /// Entries for the current user matching `filter`, newest first.
    pub fn query(&mut self, filter: &ActivityFilter) -> Vec<ActivityLogEntry> {
        let entries = self.all();
        filter_activities(&entries, &self.page.user.id, filter)
    }

    /// The `count` most recent entries for the current user.
    pub fn recent(&mut self, count: usize) -> Vec<ActivityLogEntry> {
        self.query(&ActivityFilter::new().limit(count))
    }

    /// Per-kind entry counts for the current user. Every kind is present.
    pub fn counts(&mut self) -> BTreeMap<ActivityKind, usize> {
        let mut counts: BTreeMap<ActivityKind, usize> =
            ActivityKind::ALL.iter().map(|kind| (*kind, 0)).collect();
        for entry in self.all() {
            if entry.user_id == self.page.user.id {
                *counts.entry(entry.kind).or_insert(0) += 1;
            }
        }
        counts
    }
}
