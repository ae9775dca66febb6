//! # Object Store
//!
//! The seam between the reconcilers and the cluster state store.
//!
//! Reconcilers only ever `get` and `create`; both are expressed against
//! [`ObjectStore`] so the reconciliation logic can run against the Kubernetes
//! API ([`KubeStore`]) or against an in-memory store in tests.
//!
//! Errors keep the two outcomes the reconcilers branch on distinguishable:
//! [`StoreError::NotFound`] from `get` and [`StoreError::AlreadyExists`] from
//! `create`. Everything else is a [`StoreError::Request`].

mod kube_store;
mod object;

pub use kube_store::KubeStore;
pub use object::{ClusterObject, ObjectKey, ResourceKind};

use async_trait::async_trait;
use thiserror::Error;

/// Errors returned by an [`ObjectStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {key} not found")]
    NotFound { kind: ResourceKind, key: ObjectKey },

    #[error("{kind} {key} already exists")]
    AlreadyExists { kind: ResourceKind, key: ObjectKey },

    #[error("expected {expected} for {key}, store returned {found}")]
    KindMismatch {
        expected: ResourceKind,
        found: ResourceKind,
        key: ObjectKey,
    },

    #[error("request for {kind} {key} failed: {source}")]
    Request {
        kind: ResourceKind,
        key: ObjectKey,
        #[source]
        source: kube::Error,
    },
}

impl StoreError {
    /// Classify a Kubernetes API error the way the reconcilers need it
    pub fn from_kube(kind: ResourceKind, key: &ObjectKey, error: kube::Error) -> Self {
        match error {
            kube::Error::Api(api_err) if api_err.code == 404 => StoreError::NotFound {
                kind,
                key: key.clone(),
            },
            kube::Error::Api(api_err) if api_err.code == 409 => StoreError::AlreadyExists {
                kind,
                key: key.clone(),
            },
            source => StoreError::Request {
                kind,
                key: key.clone(),
                source,
            },
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }
}

/// Read/create access to cluster objects
///
/// Implementations must be safe to call from many reconciliations at once.
/// No caching is expected: every call reflects the store at that moment.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch one object by kind and key.
    ///
    /// Returns [`StoreError::NotFound`] when the object does not exist.
    async fn get(&self, kind: ResourceKind, key: &ObjectKey) -> Result<ClusterObject, StoreError>;

    /// Create an object exactly as given.
    ///
    /// Returns [`StoreError::AlreadyExists`] when an object with the same kind
    /// and key is already present.
    async fn create(&self, object: &ClusterObject) -> Result<(), StoreError>;
}
