use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Alert ids the user has dismissed. Ids need not match a current rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedSet(BTreeSet<String>);

impl ResolvedSet {
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(ids.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// Returns false when the id was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.0.insert(id.into())
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

/// Owns the resolved set for one user. Knows nothing about alert content.
///
/// Resolution only grows until an explicit [`AlertTracker::clear_all`]; there
/// is no expiry.
#[derive(Debug, Clone, Default)]
pub struct AlertTracker {
    resolved: ResolvedSet,
    dirty: bool,
}

impl AlertTracker {
    pub fn new(resolved: ResolvedSet) -> Self {
        Self {
            resolved,
            dirty: false,
        }
    }

    /// No-op (returns false) for an id that is already resolved.
    pub fn mark_resolved(&mut self, id: &str) -> bool {
        let inserted = self.resolved.insert(id);
        if inserted {
            tracing::debug!(alert_id = id, "alert marked resolved");
            self.dirty = true;
        }
        inserted
    }

    pub fn clear_all(&mut self) {
        if !self.resolved.is_empty() {
            tracing::debug!(count = self.resolved.len(), "clearing resolved alerts");
            self.resolved.clear();
            self.dirty = true;
        }
    }

    pub fn is_resolved(&self, id: &str) -> bool {
        self.resolved.contains(id)
    }

    pub fn resolved(&self) -> &ResolvedSet {
        &self.resolved
    }

    /// Whether the set changed since load and needs saving.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }
}
