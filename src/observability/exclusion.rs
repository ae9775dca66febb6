//! # Exclusion Tracker
//!
//! Per-namespace record of the last exclusion decision, feeding the
//! `dedicated_admin_blacklisted_projects` gauge.
//!
//! Owned by whoever builds the reconcilers and handed to them at construction.
//! Entries appear the first time a namespace is evaluated and disappear once
//! the namespace is terminating. Nothing is persisted; the map fills up again
//! as events arrive after a restart.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Thread-safe map of namespace name to "is excluded"
#[derive(Debug, Default)]
pub struct ExclusionTracker {
    namespaces: Mutex<HashMap<String, bool>>,
}

impl ExclusionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, bool>> {
        // The map holds plain values; a panic mid-update cannot leave it inconsistent
        self.namespaces
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn mark_excluded(&self, namespace: &str) {
        self.lock().insert(namespace.to_string(), true);
    }

    pub fn mark_included(&self, namespace: &str) {
        self.lock().insert(namespace.to_string(), false);
    }

    pub fn forget(&self, namespace: &str) {
        self.lock().remove(namespace);
    }

    /// Copy of the current decisions
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, bool> {
        self.lock().clone()
    }

    /// Number of namespaces currently excluded
    #[must_use]
    pub fn excluded_count(&self) -> usize {
        excluded_count(&self.snapshot())
    }
}

/// Number of excluded namespaces in a snapshot
#[must_use]
pub fn excluded_count(snapshot: &HashMap<String, bool>) -> usize {
    snapshot.values().filter(|excluded| **excluded).count()
}
