//! # Types
//!
//! Core types shared by the reconcilers and the dispatcher.

use crate::constants::CONFIG_UNAVAILABLE_REQUEUE;
use crate::store::{ObjectKey, ResourceKind, StoreError};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result of a successful pass
///
/// Every delayed retry is driven by a [`ReconcilerError`]: a fixed delay from
/// [`ReconcilerError::retry_after`] or the key's backoff otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Nothing left to do until the next event
    Done,
}

#[derive(Debug, Error)]
pub enum ReconcilerError {
    /// The exclusion policy could not be read; retried after a fixed delay
    #[error("operator configuration unavailable")]
    ConfigUnavailable {
        #[source]
        source: Option<StoreError>,
    },

    #[error("failed to read {kind} {key}")]
    Read {
        kind: ResourceKind,
        key: ObjectKey,
        #[source]
        source: StoreError,
    },

    #[error("failed to create {kind} {key}")]
    Create {
        kind: ResourceKind,
        key: ObjectKey,
        #[source]
        source: StoreError,
    },
}

impl ReconcilerError {
    /// Fixed retry delay, if this error carries one. `None` leaves the delay to the backoff.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ReconcilerError::ConfigUnavailable { .. } => Some(CONFIG_UNAVAILABLE_REQUEUE),
            ReconcilerError::Read { .. } | ReconcilerError::Create { .. } => None,
        }
    }
}

/// A reconciler keyed by object name
///
/// Implementations always re-read the state they act on; the key is the only
/// input carried from the event.
#[async_trait]
pub trait Reconcile: Send + Sync {
    /// Controller name used in logs and metric labels
    fn name(&self) -> &'static str;

    async fn reconcile(&self, key: &ObjectKey) -> Result<ReconcileOutcome, ReconcilerError>;
}
