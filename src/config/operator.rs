//! # Operator ConfigMap
//!
//! Reads the exclusion policy from the operator ConfigMap.
//!
//! The ConfigMap is read on every call; administrators edit it at runtime and
//! the next reconciliation picks the change up. Concurrent reconciliations each
//! read it independently.

use crate::constants::PROJECT_BLACKLIST_KEY;
use crate::controller::eligibility::ExclusionPolicy;
use crate::store::{ClusterObject, ObjectKey, ObjectStore, ResourceKind, StoreError};

/// Result of reading the exclusion policy
#[derive(Debug)]
pub enum PolicyLookup {
    /// The ConfigMap exists and carries `project_blacklist`
    Loaded(ExclusionPolicy),
    /// The ConfigMap exists without a `project_blacklist` key
    KeyMissing,
    /// The ConfigMap does not exist yet
    NotFound(StoreError),
    /// The read itself failed
    Failed(StoreError),
}

impl PolicyLookup {
    /// Whether a usable policy was read
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, PolicyLookup::Loaded(_))
    }

    /// The policy that was read, or an empty policy when none could be read
    #[must_use]
    pub fn into_policy(self) -> ExclusionPolicy {
        match self {
            PolicyLookup::Loaded(policy) => policy,
            PolicyLookup::KeyMissing | PolicyLookup::NotFound(_) | PolicyLookup::Failed(_) => {
                ExclusionPolicy::default()
            }
        }
    }
}

/// Location of the operator ConfigMap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorConfigSource {
    key: ObjectKey,
}

impl OperatorConfigSource {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: ObjectKey::namespaced(namespace, name),
        }
    }

    #[must_use]
    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    /// Read the exclusion policy from the store
    pub async fn fetch_exclusion_policy(&self, store: &dyn ObjectStore) -> PolicyLookup {
        match store.get(ResourceKind::ConfigMap, &self.key).await {
            Ok(ClusterObject::ConfigMap(config_map)) => config_map
                .data
                .as_ref()
                .and_then(|data| data.get(PROJECT_BLACKLIST_KEY))
                .map_or(PolicyLookup::KeyMissing, |raw| {
                    PolicyLookup::Loaded(ExclusionPolicy::parse(raw))
                }),
            Ok(other) => PolicyLookup::Failed(StoreError::KindMismatch {
                expected: ResourceKind::ConfigMap,
                found: other.kind(),
                key: self.key.clone(),
            }),
            Err(e) if e.is_not_found() => PolicyLookup::NotFound(e),
            Err(e) => PolicyLookup::Failed(e),
        }
    }
}
