//! # Constants
//!
//! Shared constants used throughout the operator.
//!
//! Values marked as defaults can be overridden via environment variables or
//! command line flags (see [`crate::config::ControllerConfig`]).

use std::time::Duration;

/// Name the operator reports itself as, in logs and in the exclusion gauge label
pub const OPERATOR_NAME: &str = "dedicated-admin-operator";

/// Default namespace the operator runs in and keeps its own resources in
pub const DEFAULT_OPERATOR_NAMESPACE: &str = "openshift-dedicated-admin";

/// Default name of the ConfigMap holding the operator configuration
pub const DEFAULT_OPERATOR_CONFIG_MAP: &str = "dedicated-admin-operator-config";

/// ConfigMap key holding the comma separated exclusion patterns
pub const PROJECT_BLACKLIST_KEY: &str = "project_blacklist";

/// Requeue delay while the operator configuration does not exist yet.
/// Fixed; not configurable.
pub const CONFIG_UNAVAILABLE_REQUEUE: Duration = Duration::from_secs(5);

/// Group granted dedicated-admin rights
pub const DEDICATED_ADMINS_GROUP: &str = "dedicated-admins";

/// Label shared by the operator's Service and ServiceMonitor
pub const OPERATOR_APP_LABEL: &str = "k8s-app";

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default minimum backoff after a failed reconciliation (seconds)
pub const DEFAULT_BACKOFF_MIN_SECS: u64 = 1;

/// Default maximum backoff after a failed reconciliation (seconds)
pub const DEFAULT_BACKOFF_MAX_SECS: u64 = 300;

/// Default delay before restarting a watch stream after it ends or fails (seconds)
pub const DEFAULT_WATCH_RESTART_DELAY_SECS: u64 = 5;

/// Default cap on reconciliations running at the same time, per controller
pub const DEFAULT_MAX_CONCURRENT_RECONCILIATIONS: usize = 10;

/// Capacity of each controller's request queue
pub const REQUEST_QUEUE_CAPACITY: usize = 1024;
