//! # Operator-Namespace Reconciler
//!
//! Creates the operator's own ClusterRoleBinding, metrics Service and
//! ServiceMonitor once the operator namespace is active. Every other
//! namespace is ignored.

use super::ensure::ensure_exists;
use super::namespace::NAMESPACE_TERMINATING;
use super::types::{Reconcile, ReconcileOutcome, ReconcilerError};
use crate::catalogue::Catalogue;
use crate::store::{ObjectKey, ObjectStore, ResourceKind};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

pub struct OperatorNamespaceReconciler {
    operator_namespace: String,
    store: Arc<dyn ObjectStore>,
    catalogue: Arc<Catalogue>,
}

impl std::fmt::Debug for OperatorNamespaceReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorNamespaceReconciler")
            .field("operator_namespace", &self.operator_namespace)
            .finish_non_exhaustive()
    }
}

impl OperatorNamespaceReconciler {
    pub fn new(
        operator_namespace: impl Into<String>,
        store: Arc<dyn ObjectStore>,
        catalogue: Arc<Catalogue>,
    ) -> Self {
        Self {
            operator_namespace: operator_namespace.into(),
            store,
            catalogue,
        }
    }
}

#[async_trait]
impl Reconcile for OperatorNamespaceReconciler {
    fn name(&self) -> &'static str {
        "operator"
    }

    async fn reconcile(&self, key: &ObjectKey) -> Result<ReconcileOutcome, ReconcilerError> {
        if key.name != self.operator_namespace {
            return Ok(ReconcileOutcome::Done);
        }

        let ns_key = ObjectKey::cluster(self.operator_namespace.as_str());
        let namespace = self
            .store
            .get(ResourceKind::Namespace, &ns_key)
            .await
            .map_err(|source| ReconcilerError::Read {
                kind: ResourceKind::Namespace,
                key: ns_key.clone(),
                source,
            })?;

        if namespace.namespace_phase() == Some(NAMESPACE_TERMINATING) {
            info!(namespace = %self.operator_namespace, "Operator namespace is terminating");
            return Ok(ReconcileOutcome::Done);
        }

        for entry in self.catalogue.operator_resources() {
            let desired = entry.instantiate(&self.operator_namespace);
            ensure_exists(self.store.as_ref(), &desired)
                .await
                .map_err(|source| ReconcilerError::Create {
                    kind: desired.kind(),
                    key: desired.key(),
                    source,
                })?;
        }
        debug!(namespace = %self.operator_namespace, "Operator resources in place");

        Ok(ReconcileOutcome::Done)
    }
}
