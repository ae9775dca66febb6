//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ```rust
//! use dedicated_admin_operator::prelude::*;
//! ```

// Object store seam
pub use crate::store::{ClusterObject, KubeStore, ObjectKey, ObjectStore, ResourceKind, StoreError};

// Reconciler types - core controller functionality
pub use crate::controller::reconciler::{
    ChildResourceReconciler, NamespaceReconciler, OperatorNamespaceReconciler, Reconcile,
    ReconcileOutcome, ReconcilerError,
};

// Exclusion policy
pub use crate::controller::eligibility::{is_excluded, ExclusionPolicy};

// Config types - for configuration management
pub use crate::config::{ControllerConfig, OperatorConfigSource, PolicyLookup};

pub use crate::catalogue::{Catalogue, DesiredObject, Placement};
pub use crate::observability::ExclusionTracker;
