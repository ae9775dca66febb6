//! # Reconciler
//!
//! Reconciliation logic for the dedicated-admin operator.
//!
//! - [`NamespaceReconciler`]: RoleBindings in every managed namespace
//! - [`ChildResourceReconciler`]: recreates deleted catalogue RoleBindings
//! - [`OperatorNamespaceReconciler`]: the operator's own resources
//!
//! ## Outcomes
//!
//! A pass ends in one of three states:
//! - `Ok(ReconcileOutcome::Done)`: nothing to do until the next event
//! - `Err` with a fixed [`ReconcilerError::retry_after`] delay: the operator
//!   ConfigMap is not available yet
//! - any other `Err`: retried with the per-object Fibonacci backoff

pub mod child;
pub mod ensure;
pub mod namespace;
pub mod operator;
pub mod types;

pub use child::ChildResourceReconciler;
pub use namespace::NamespaceReconciler;
pub use operator::OperatorNamespaceReconciler;
pub use types::{Reconcile, ReconcileOutcome, ReconcilerError};

use crate::config::{OperatorConfigSource, PolicyLookup};
use crate::controller::eligibility::ExclusionPolicy;
use crate::store::ObjectStore;
use tracing::{error, info};

/// Read the exclusion policy, failing with [`ReconcilerError::ConfigUnavailable`]
/// when it cannot be used
pub(crate) async fn require_policy(
    config: &OperatorConfigSource,
    store: &dyn ObjectStore,
) -> Result<ExclusionPolicy, ReconcilerError> {
    match config.fetch_exclusion_policy(store).await {
        PolicyLookup::Loaded(policy) => Ok(policy),
        PolicyLookup::KeyMissing => {
            info!(config = %config.key(), "Operator ConfigMap has no project_blacklist key yet");
            Err(ReconcilerError::ConfigUnavailable { source: None })
        }
        PolicyLookup::NotFound(e) => {
            info!(config = %config.key(), "Operator ConfigMap not found yet");
            Err(ReconcilerError::ConfigUnavailable { source: Some(e) })
        }
        PolicyLookup::Failed(e) => {
            error!(config = %config.key(), error = %e, "Failed to read operator ConfigMap");
            Err(ReconcilerError::ConfigUnavailable { source: Some(e) })
        }
    }
}
