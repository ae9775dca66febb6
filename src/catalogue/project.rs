//! RoleBindings granted in every managed namespace.

use crate::constants::DEDICATED_ADMINS_GROUP;
use k8s_openapi::api::rbac::v1::{RoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

/// Binds the `dedicated-admins` group to `cluster_role` under `name`
pub(crate) fn group_role_binding(name: &str, cluster_role: &str) -> RoleBinding {
    RoleBinding {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        role_ref: RoleRef {
            api_group: RBAC_API_GROUP.to_string(),
            kind: "ClusterRole".to_string(),
            name: cluster_role.to_string(),
        },
        subjects: Some(vec![Subject {
            api_group: Some(RBAC_API_GROUP.to_string()),
            kind: "Group".to_string(),
            name: DEDICATED_ADMINS_GROUP.to_string(),
            namespace: None,
        }]),
    }
}

pub(crate) fn role_bindings() -> Vec<RoleBinding> {
    vec![
        group_role_binding("admin-dedicated-admins", "admin"),
        group_role_binding("dedicated-admins-project", "dedicated-admins-project"),
    ]
}
