//! # Observability
//!
//! - `exclusion`: per-namespace exclusion decisions behind the blacklist gauge
//! - `metrics`: Prometheus metrics collection

pub mod exclusion;
pub mod metrics;

pub use exclusion::ExclusionTracker;
pub use metrics::*;
