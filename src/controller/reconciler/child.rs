//! # Child-Resource Reconciler
//!
//! Recreates catalogued per-namespace objects that were deleted. Objects the
//! catalogue does not name are foreign and never touched.
//!
//! Unlike the namespace path, this reconciler proceeds with an empty policy
//! when the operator ConfigMap cannot be read, and it never retries a failed
//! create: the next event for the object or its namespace does.

use super::ensure::ensure_exists;
use super::types::{Reconcile, ReconcileOutcome, ReconcilerError};
use crate::catalogue::Catalogue;
use crate::config::OperatorConfigSource;
use crate::controller::eligibility::is_excluded;
use crate::store::{ObjectKey, ObjectStore, ResourceKind};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct ChildResourceReconciler {
    kind: ResourceKind,
    store: Arc<dyn ObjectStore>,
    config: OperatorConfigSource,
    catalogue: Arc<Catalogue>,
}

impl std::fmt::Debug for ChildResourceReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildResourceReconciler")
            .field("kind", &self.kind)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ChildResourceReconciler {
    /// Reconciler for namespaced objects of `kind`
    pub fn new(
        kind: ResourceKind,
        store: Arc<dyn ObjectStore>,
        config: OperatorConfigSource,
        catalogue: Arc<Catalogue>,
    ) -> Self {
        Self {
            kind,
            store,
            config,
            catalogue,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

#[async_trait]
impl Reconcile for ChildResourceReconciler {
    fn name(&self) -> &'static str {
        match self.kind {
            ResourceKind::RoleBinding => "rolebinding",
            _ => "child-resource",
        }
    }

    async fn reconcile(&self, key: &ObjectKey) -> Result<ReconcileOutcome, ReconcilerError> {
        let Some(namespace) = key.namespace.as_deref() else {
            warn!(resource = %key, kind = %self.kind, "Ignoring request without a namespace");
            return Ok(ReconcileOutcome::Done);
        };

        let lookup = self.config.fetch_exclusion_policy(self.store.as_ref()).await;
        if !lookup.is_loaded() {
            warn!(
                config = %self.config.key(),
                lookup = ?lookup,
                "Exclusion policy unavailable, continuing with an empty policy"
            );
        }
        let policy = lookup.into_policy();

        if is_excluded(namespace, &policy) {
            debug!(namespace, "Namespace is excluded, skipping");
            return Ok(ReconcileOutcome::Done);
        }

        match self.store.get(self.kind, key).await {
            Ok(_) => Ok(ReconcileOutcome::Done),
            Err(e) if e.is_not_found() => {
                let Some(entry) = self.catalogue.find_per_namespace(self.kind, &key.name) else {
                    debug!(resource = %key, kind = %self.kind, "Not managed by this operator");
                    return Ok(ReconcileOutcome::Done);
                };
                info!(resource = %key, kind = %self.kind, "Managed object missing, recreating");
                let desired = entry.instantiate(namespace);
                if let Err(e) = ensure_exists(self.store.as_ref(), &desired).await {
                    error!(resource = %key, kind = %self.kind, error = %e, "Failed to recreate object");
                }
                Ok(ReconcileOutcome::Done)
            }
            Err(source) => Err(ReconcilerError::Read {
                kind: self.kind,
                key: key.clone(),
                source,
            }),
        }
    }
}
