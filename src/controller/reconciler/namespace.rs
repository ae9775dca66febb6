//! # Namespace Reconciler
//!
//! Grants the dedicated-admins group its RoleBindings in every managed namespace.
//!
//! Each pass re-reads the exclusion policy and the namespace, then creates the
//! per-namespace catalogue entries. Existing objects are left alone, so a pass
//! can be repeated any number of times.

use super::ensure::ensure_exists;
use super::types::{Reconcile, ReconcileOutcome, ReconcilerError};
use super::require_policy;
use crate::catalogue::Catalogue;
use crate::config::OperatorConfigSource;
use crate::controller::eligibility::is_excluded;
use crate::observability::ExclusionTracker;
use crate::store::{ObjectKey, ObjectStore, ResourceKind};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info};

pub(crate) const NAMESPACE_TERMINATING: &str = "Terminating";

pub struct NamespaceReconciler {
    store: Arc<dyn ObjectStore>,
    config: OperatorConfigSource,
    catalogue: Arc<Catalogue>,
    tracker: Arc<ExclusionTracker>,
}

impl std::fmt::Debug for NamespaceReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespaceReconciler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl NamespaceReconciler {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        config: OperatorConfigSource,
        catalogue: Arc<Catalogue>,
        tracker: Arc<ExclusionTracker>,
    ) -> Self {
        Self {
            store,
            config,
            catalogue,
            tracker,
        }
    }
}

#[async_trait]
impl Reconcile for NamespaceReconciler {
    fn name(&self) -> &'static str {
        "namespace"
    }

    async fn reconcile(&self, key: &ObjectKey) -> Result<ReconcileOutcome, ReconcilerError> {
        let namespace = key.name.as_str();

        let policy = require_policy(&self.config, self.store.as_ref()).await?;

        if is_excluded(namespace, &policy) {
            debug!(namespace, "Namespace is excluded, skipping");
            self.tracker.mark_excluded(namespace);
            return Ok(ReconcileOutcome::Done);
        }
        self.tracker.mark_included(namespace);

        let ns_key = ObjectKey::cluster(namespace);
        let object = match self.store.get(ResourceKind::Namespace, &ns_key).await {
            Ok(object) => object,
            Err(e) if e.is_not_found() => {
                debug!(namespace, "Namespace no longer exists");
                return Ok(ReconcileOutcome::Done);
            }
            Err(source) => {
                return Err(ReconcilerError::Read {
                    kind: ResourceKind::Namespace,
                    key: ns_key,
                    source,
                });
            }
        };

        if object.namespace_phase() == Some(NAMESPACE_TERMINATING) {
            info!(namespace, "Namespace is terminating");
            self.tracker.forget(namespace);
            return Ok(ReconcileOutcome::Done);
        }

        let mut first_failure = None;
        for entry in self.catalogue.per_namespace() {
            let desired = entry.instantiate(namespace);
            if let Err(source) = ensure_exists(self.store.as_ref(), &desired).await {
                error!(
                    kind = %desired.kind(),
                    resource = %desired.key(),
                    error = %source,
                    "Failed to create object"
                );
                if first_failure.is_none() {
                    first_failure = Some(ReconcilerError::Create {
                        kind: desired.kind(),
                        key: desired.key(),
                        source,
                    });
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(ReconcileOutcome::Done),
        }
    }
}
