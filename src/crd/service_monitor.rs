//! # ServiceMonitor
//!
//! The subset of the Prometheus Operator `ServiceMonitor` resource
//! (`monitoring.coreos.com/v1`) the operator creates for its own metrics
//! Service. Unknown fields on existing objects are ignored on read.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// ServiceMonitor spec
///
/// # Example
///
/// ```yaml
/// apiVersion: monitoring.coreos.com/v1
/// kind: ServiceMonitor
/// metadata:
///   name: dedicated-admin-operator
///   namespace: openshift-dedicated-admin
/// spec:
///   endpoints:
///     - port: metrics
///       scheme: http
///       interval: 30s
///   selector:
///     matchLabels:
///       k8s-app: dedicated-admin-operator
/// ```
#[derive(CustomResource, Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "monitoring.coreos.com",
    version = "v1",
    kind = "ServiceMonitor",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMonitorSpec {
    /// Endpoints on the selected Services to scrape
    #[serde(default)]
    pub endpoints: Vec<ServiceMonitorEndpoint>,
    /// Label selector picking the Services to scrape
    #[serde(default)]
    pub selector: ServiceMonitorSelector,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMonitorEndpoint {
    /// Name of the Service port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    /// HTTP scheme used for scraping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    /// Scrape interval, e.g. `30s`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMonitorSelector {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
}
