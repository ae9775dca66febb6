//! Kinds, keys and the object envelope passed through [`super::ObjectStore`].

use crate::crd::ServiceMonitor;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Service};
use k8s_openapi::api::rbac::v1::{ClusterRoleBinding, RoleBinding};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{Resource, ResourceExt};
use std::fmt;

/// Object kinds the operator reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Namespace,
    ConfigMap,
    RoleBinding,
    ClusterRoleBinding,
    Service,
    ServiceMonitor,
}

impl ResourceKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "Namespace",
            ResourceKind::ConfigMap => "ConfigMap",
            ResourceKind::RoleBinding => "RoleBinding",
            ResourceKind::ClusterRoleBinding => "ClusterRoleBinding",
            ResourceKind::Service => "Service",
            ResourceKind::ServiceMonitor => "ServiceMonitor",
        }
    }

    /// Whether objects of this kind live inside a namespace
    #[must_use]
    pub fn is_namespaced(&self) -> bool {
        !matches!(
            self,
            ResourceKind::Namespace | ResourceKind::ClusterRoleBinding
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Namespaced name of an object; `namespace` is `None` for cluster scoped kinds
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: Option<String>,
    pub name: String,
}

impl ObjectKey {
    pub fn cluster(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Key of an object delivered by a watch event
    pub fn for_resource<K: Resource>(obj: &K) -> Self {
        Self {
            namespace: obj.namespace(),
            name: obj.name_any(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}/{}", namespace, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A typed cluster object of one of the [`ResourceKind`]s
#[derive(Debug, Clone)]
pub enum ClusterObject {
    Namespace(Namespace),
    ConfigMap(ConfigMap),
    RoleBinding(RoleBinding),
    ClusterRoleBinding(ClusterRoleBinding),
    Service(Service),
    ServiceMonitor(ServiceMonitor),
}

impl ClusterObject {
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self {
            ClusterObject::Namespace(_) => ResourceKind::Namespace,
            ClusterObject::ConfigMap(_) => ResourceKind::ConfigMap,
            ClusterObject::RoleBinding(_) => ResourceKind::RoleBinding,
            ClusterObject::ClusterRoleBinding(_) => ResourceKind::ClusterRoleBinding,
            ClusterObject::Service(_) => ResourceKind::Service,
            ClusterObject::ServiceMonitor(_) => ResourceKind::ServiceMonitor,
        }
    }

    #[must_use]
    pub fn meta(&self) -> &ObjectMeta {
        match self {
            ClusterObject::Namespace(o) => o.meta(),
            ClusterObject::ConfigMap(o) => o.meta(),
            ClusterObject::RoleBinding(o) => o.meta(),
            ClusterObject::ClusterRoleBinding(o) => o.meta(),
            ClusterObject::Service(o) => o.meta(),
            ClusterObject::ServiceMonitor(o) => o.meta(),
        }
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        match self {
            ClusterObject::Namespace(o) => o.meta_mut(),
            ClusterObject::ConfigMap(o) => o.meta_mut(),
            ClusterObject::RoleBinding(o) => o.meta_mut(),
            ClusterObject::ClusterRoleBinding(o) => o.meta_mut(),
            ClusterObject::Service(o) => o.meta_mut(),
            ClusterObject::ServiceMonitor(o) => o.meta_mut(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.meta().name.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn key(&self) -> ObjectKey {
        ObjectKey {
            namespace: self.meta().namespace.clone(),
            name: self.name().to_string(),
        }
    }

    /// Copy of this object placed in `namespace`.
    ///
    /// Cluster scoped objects are returned unchanged with no namespace set.
    #[must_use]
    pub fn in_namespace(&self, namespace: &str) -> Self {
        let mut placed = self.clone();
        let meta = placed.meta_mut();
        meta.namespace = self
            .kind()
            .is_namespaced()
            .then(|| namespace.to_string());
        placed
    }

    /// Lifecycle phase for namespaces; `None` for every other kind
    #[must_use]
    pub fn namespace_phase(&self) -> Option<&str> {
        match self {
            ClusterObject::Namespace(ns) => ns.status.as_ref()?.phase.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role_binding(name: &str) -> ClusterObject {
        ClusterObject::RoleBinding(RoleBinding {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    #[test]
    fn test_object_key_display() {
        assert_eq!(ObjectKey::namespaced("test", "rb").to_string(), "test/rb");
        assert_eq!(ObjectKey::cluster("kube-system").to_string(), "kube-system");
    }

    #[test]
    fn test_in_namespace_sets_namespace_for_namespaced_kinds() {
        let placed = role_binding("admin-dedicated-admins").in_namespace("test");
        assert_eq!(
            placed.key(),
            ObjectKey::namespaced("test", "admin-dedicated-admins")
        );
    }

    #[test]
    fn test_in_namespace_leaves_cluster_scoped_objects_alone() {
        let crb = ClusterObject::ClusterRoleBinding(ClusterRoleBinding {
            metadata: ObjectMeta {
                name: Some("dedicated-admins-cluster".to_string()),
                ..Default::default()
            },
            ..Default::default()
        });
        let placed = crb.in_namespace("openshift-dedicated-admin");
        assert_eq!(placed.key(), ObjectKey::cluster("dedicated-admins-cluster"));
    }

    #[test]
    fn test_in_namespace_does_not_touch_template() {
        let template = role_binding("dedicated-admins-project");
        let _ = template.in_namespace("a");
        assert!(template.meta().namespace.is_none());
    }

    #[test]
    fn test_namespace_phase() {
        use k8s_openapi::api::core::v1::NamespaceStatus;
        let ns = ClusterObject::Namespace(Namespace {
            status: Some(NamespaceStatus {
                phase: Some("Terminating".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(ns.namespace_phase(), Some("Terminating"));
        assert_eq!(role_binding("x").namespace_phase(), None);
    }
}
