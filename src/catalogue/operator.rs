//! The operator's own resources, kept in the operator namespace.

use crate::constants::{DEDICATED_ADMINS_GROUP, OPERATOR_APP_LABEL, OPERATOR_NAME};
use crate::crd::{ServiceMonitor, ServiceMonitorEndpoint, ServiceMonitorSelector, ServiceMonitorSpec};
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::api::rbac::v1::{ClusterRoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

const METRICS_PORT_NAME: &str = "metrics";

fn app_labels() -> BTreeMap<String, String> {
    BTreeMap::from([(OPERATOR_APP_LABEL.to_string(), OPERATOR_NAME.to_string())])
}

pub(crate) fn cluster_role_binding() -> ClusterRoleBinding {
    ClusterRoleBinding {
        metadata: ObjectMeta {
            name: Some("dedicated-admins-cluster".to_string()),
            ..Default::default()
        },
        role_ref: RoleRef {
            api_group: "rbac.authorization.k8s.io".to_string(),
            kind: "ClusterRole".to_string(),
            name: "dedicated-admins-cluster".to_string(),
        },
        subjects: Some(vec![Subject {
            kind: "Group".to_string(),
            name: DEDICATED_ADMINS_GROUP.to_string(),
            ..Default::default()
        }]),
    }
}

pub(crate) fn metrics_service(namespace: &str, port: u16) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some(OPERATOR_NAME.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(app_labels()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            ports: Some(vec![ServicePort {
                name: Some(METRICS_PORT_NAME.to_string()),
                port: i32::from(port),
                ..Default::default()
            }]),
            selector: Some(app_labels()),
            type_: Some("ClusterIP".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub(crate) fn service_monitor(namespace: &str) -> ServiceMonitor {
    let mut monitor = ServiceMonitor::new(
        OPERATOR_NAME,
        ServiceMonitorSpec {
            endpoints: vec![ServiceMonitorEndpoint {
                port: Some(METRICS_PORT_NAME.to_string()),
                scheme: Some("http".to_string()),
                interval: Some("30s".to_string()),
            }],
            selector: ServiceMonitorSelector {
                match_labels: app_labels(),
            },
        },
    );
    monitor.metadata.namespace = Some(namespace.to_string());
    monitor.metadata.labels = Some(app_labels());
    monitor
}
