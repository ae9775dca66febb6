//! # Custom Resource Definitions
//!
//! Third-party custom resource types the operator creates.
//!
//! - `service_monitor.rs` - Prometheus Operator `ServiceMonitor`

mod service_monitor;

pub use service_monitor::{
    ServiceMonitor, ServiceMonitorEndpoint, ServiceMonitorSelector, ServiceMonitorSpec,
};
