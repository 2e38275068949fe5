//! Append-only in-memory store of audit results.
//!
//! Results live only as long as the process. Writers take the write lock for
//! a single push; queries clone the matching records under the read lock.

use crate::protocol::models::AuditResult;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Query filters for stored results.
///
/// Every set, non-empty field must match exactly, except `date`, which is a
/// prefix of the ISO timestamp (`2024-01` selects January 2024).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultFilter {
    /// Exact template name.
    #[serde(default)]
    pub template_name: Option<String>,
    /// `PASS` or `FAIL`.
    #[serde(default)]
    pub status: Option<String>,
    /// Exact owner.
    #[serde(default)]
    pub owner: Option<String>,
    /// Timestamp prefix.
    #[serde(default)]
    pub date: Option<String>,
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl ResultFilter {
    /// Whether a result satisfies every active filter.
    pub fn matches(&self, result: &AuditResult) -> bool {
        if let Some(name) = active(&self.template_name) {
            if result.template_name.as_deref() != Some(name) {
                return false;
            }
        }
        if let Some(status) = active(&self.status) {
            if result.status.as_str() != status {
                return false;
            }
        }
        if let Some(owner) = active(&self.owner) {
            if result.owner.as_deref() != Some(owner) {
                return false;
            }
        }
        if let Some(prefix) = active(&self.date) {
            if !result.date_string().starts_with(prefix) {
                return false;
            }
        }
        true
    }

    /// Active filters as query-string pairs.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("templateName", &self.template_name),
            ("status", &self.status),
            ("owner", &self.owner),
            ("date", &self.date),
        ]
        .into_iter()
        .filter_map(|(key, value)| active(value).map(|v| (key, v.to_string())))
        .collect()
    }
}

/// Shared list of audit results.
#[derive(Debug, Default)]
pub struct ResultStore {
    results: RwLock<Vec<AuditResult>>,
}

impl ResultStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a result.
    pub fn push(&self, result: AuditResult) {
        // A poisoned lock only means a writer panicked mid-push; the Vec is intact.
        let mut results = self.results.write().unwrap_or_else(|e| e.into_inner());
        results.push(result);
    }

    /// Results matching a filter, in insertion order.
    pub fn query(&self, filter: &ResultFilter) -> Vec<AuditResult> {
        let results = self.results.read().unwrap_or_else(|e| e.into_inner());
        results.iter().filter(|r| filter.matches(r)).cloned().collect()
    }

    /// Number of stored results.
    pub(crate) fn len(&self) -> usize {
        self.results.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}
