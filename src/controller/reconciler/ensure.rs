//! Create-if-absent for catalogue objects.

use crate::observability::metrics;
use crate::store::{ClusterObject, ObjectStore, StoreError};
use tracing::{debug, info};

/// Result of [`ensure_exists`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensured {
    Created,
    AlreadyPresent,
}

/// Create `object`, treating AlreadyExists as success
pub async fn ensure_exists(
    store: &dyn ObjectStore,
    object: &ClusterObject,
) -> Result<Ensured, StoreError> {
    match store.create(object).await {
        Ok(()) => {
            metrics::increment_objects_created(object.kind().as_str());
            info!(kind = %object.kind(), resource = %object.key(), "Created object");
            Ok(Ensured::Created)
        }
        Err(e) if e.is_already_exists() => {
            debug!(kind = %object.kind(), resource = %object.key(), "Object already exists");
            Ok(Ensured::AlreadyPresent)
        }
        Err(e) => Err(e),
    }
}
