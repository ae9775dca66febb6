//! [`ObjectStore`] backed by the Kubernetes API server.

use super::{ClusterObject, ObjectKey, ObjectStore, ResourceKind, StoreError};
use crate::crd::ServiceMonitor;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Service};
use k8s_openapi::api::rbac::v1::{ClusterRoleBinding, RoleBinding};
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, PostParams};
use kube::{Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Object store talking to the API server through a [`kube::Client`]
///
/// Reads go straight to the API server rather than through a reflector cache,
/// so every reconciliation observes current state.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl std::fmt::Debug for KubeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeStore").finish_non_exhaustive()
    }
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn namespaced<K>(&self, key: &ObjectKey) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        match &key.namespace {
            Some(namespace) => Api::namespaced(self.client.clone(), namespace),
            None => Api::default_namespaced(self.client.clone()),
        }
    }

    fn cluster<K>(&self) -> Api<K>
    where
        K: Resource,
        <K as Resource>::DynamicType: Default,
    {
        Api::all(self.client.clone())
    }
}

async fn fetch<K>(api: Api<K>, kind: ResourceKind, key: &ObjectKey) -> Result<K, StoreError>
where
    K: Resource + Clone + DeserializeOwned + Debug,
{
    api.get(&key.name)
        .await
        .map_err(|e| StoreError::from_kube(kind, key, e))
}

async fn post<K>(api: Api<K>, kind: ResourceKind, obj: &K) -> Result<(), StoreError>
where
    K: Resource + Clone + Serialize + DeserializeOwned + Debug,
{
    api.create(&PostParams::default(), obj)
        .await
        .map(|_| ())
        .map_err(|e| StoreError::from_kube(kind, &ObjectKey::for_resource(obj), e))
}

#[async_trait]
impl ObjectStore for KubeStore {
    async fn get(&self, kind: ResourceKind, key: &ObjectKey) -> Result<ClusterObject, StoreError> {
        match kind {
            ResourceKind::Namespace => fetch::<Namespace>(self.cluster(), kind, key)
                .await
                .map(ClusterObject::Namespace),
            ResourceKind::ConfigMap => fetch::<ConfigMap>(self.namespaced(key), kind, key)
                .await
                .map(ClusterObject::ConfigMap),
            ResourceKind::RoleBinding => fetch::<RoleBinding>(self.namespaced(key), kind, key)
                .await
                .map(ClusterObject::RoleBinding),
            ResourceKind::ClusterRoleBinding => {
                fetch::<ClusterRoleBinding>(self.cluster(), kind, key)
                    .await
                    .map(ClusterObject::ClusterRoleBinding)
            }
            ResourceKind::Service => fetch::<Service>(self.namespaced(key), kind, key)
                .await
                .map(ClusterObject::Service),
            ResourceKind::ServiceMonitor => {
                fetch::<ServiceMonitor>(self.namespaced(key), kind, key)
                    .await
                    .map(ClusterObject::ServiceMonitor)
            }
        }
    }

    async fn create(&self, object: &ClusterObject) -> Result<(), StoreError> {
        let key = object.key();
        let kind = object.kind();
        match object {
            ClusterObject::Namespace(o) => post(self.cluster::<Namespace>(), kind, o).await,
            ClusterObject::ConfigMap(o) => {
                post(self.namespaced::<ConfigMap>(&key), kind, o).await
            }
            ClusterObject::RoleBinding(o) => {
                post(self.namespaced::<RoleBinding>(&key), kind, o).await
            }
            ClusterObject::ClusterRoleBinding(o) => {
                post(self.cluster::<ClusterRoleBinding>(), kind, o).await
            }
            ClusterObject::Service(o) => post(self.namespaced::<Service>(&key), kind, o).await,
            ClusterObject::ServiceMonitor(o) => {
                post(self.namespaced::<ServiceMonitor>(&key), kind, o).await
            }
        }
    }
}
