//! Common test utilities for the reconciler tests
//!
//! Provides an in-memory [`ObjectStore`] that records every successful create
//! and can be told to fail reads or writes, plus fixtures for the objects the
//! reconcilers read.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use dedicated_admin_operator::catalogue::Catalogue;
use dedicated_admin_operator::config::OperatorConfigSource;
use dedicated_admin_operator::constants::{
    DEFAULT_OPERATOR_CONFIG_MAP, DEFAULT_OPERATOR_NAMESPACE, PROJECT_BLACKLIST_KEY,
};
use dedicated_admin_operator::controller::reconciler::{
    ChildResourceReconciler, NamespaceReconciler, OperatorNamespaceReconciler,
};
use dedicated_admin_operator::observability::ExclusionTracker;
use dedicated_admin_operator::store::{
    ClusterObject, ObjectKey, ObjectStore, ResourceKind, StoreError,
};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, NamespaceStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

/// Exclusion policy used throughout the scenarios
pub const STANDARD_POLICY: &str = "^kube-.*,^openshift-.*,^logging$,^default$,^openshift$";

/// Catalogued per-namespace RoleBindings
pub const ROLE_BINDINGS: [&str; 2] = ["admin-dedicated-admins", "dedicated-admins-project"];

type StoreKey = (ResourceKind, ObjectKey);

/// In-memory object store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    objects: Mutex<BTreeMap<StoreKey, ClusterObject>>,
    created: Mutex<Vec<StoreKey>>,
    create_attempts: Mutex<Vec<StoreKey>>,
    failing_gets: Mutex<HashSet<ResourceKind>>,
    failing_creates: Mutex<HashSet<(ResourceKind, String)>>,
}

fn injected_failure(kind: ResourceKind, key: &ObjectKey) -> StoreError {
    StoreError::Request {
        kind,
        key: key.clone(),
        source: kube::Error::Service("injected failure".into()),
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put an object in the store without recording a create
    pub fn insert(&self, object: ClusterObject) {
        self.objects
            .lock()
            .unwrap()
            .insert((object.kind(), object.key()), object);
    }

    pub fn remove(&self, kind: ResourceKind, key: &ObjectKey) {
        self.objects.lock().unwrap().remove(&(kind, key.clone()));
    }

    pub fn contains(&self, kind: ResourceKind, key: &ObjectKey) -> bool {
        self.objects
            .lock()
            .unwrap()
            .contains_key(&(kind, key.clone()))
    }

    pub fn object(&self, kind: ResourceKind, key: &ObjectKey) -> Option<ClusterObject> {
        self.objects.lock().unwrap().get(&(kind, key.clone())).cloned()
    }

    /// Successful creates, in call order
    pub fn created(&self) -> Vec<StoreKey> {
        self.created.lock().unwrap().clone()
    }

    /// Every create call, including ones that failed
    pub fn create_attempts(&self) -> Vec<StoreKey> {
        self.create_attempts.lock().unwrap().clone()
    }

    pub fn reset_create_log(&self) {
        self.created.lock().unwrap().clear();
        self.create_attempts.lock().unwrap().clear();
    }

    /// Make every `get` of `kind` fail with a transport error
    pub fn fail_gets(&self, kind: ResourceKind) {
        self.failing_gets.lock().unwrap().insert(kind);
    }

    /// Make creating `kind` named `name` fail with a transport error
    pub fn fail_creates(&self, kind: ResourceKind, name: &str) {
        self.failing_creates
            .lock()
            .unwrap()
            .insert((kind, name.to_string()));
    }

    pub fn clear_failures(&self) {
        self.failing_gets.lock().unwrap().clear();
        self.failing_creates.lock().unwrap().clear();
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn get(&self, kind: ResourceKind, key: &ObjectKey) -> Result<ClusterObject, StoreError> {
        if self.failing_gets.lock().unwrap().contains(&kind) {
            return Err(injected_failure(kind, key));
        }
        self.object(kind, key).ok_or_else(|| StoreError::NotFound {
            kind,
            key: key.clone(),
        })
    }

    async fn create(&self, object: &ClusterObject) -> Result<(), StoreError> {
        let kind = object.kind();
        let key = object.key();
        self.create_attempts
            .lock()
            .unwrap()
            .push((kind, key.clone()));

        if self
            .failing_creates
            .lock()
            .unwrap()
            .contains(&(kind, key.name.clone()))
        {
            return Err(injected_failure(kind, &key));
        }

        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&(kind, key.clone())) {
            return Err(StoreError::AlreadyExists { kind, key });
        }
        objects.insert((kind, key.clone()), object.clone());
        self.created.lock().unwrap().push((kind, key));
        Ok(())
    }
}

pub fn namespace(name: &str, phase: &str) -> ClusterObject {
    ClusterObject::Namespace(Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        status: Some(NamespaceStatus {
            phase: Some(phase.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    })
}

pub fn active_namespace(name: &str) -> ClusterObject {
    namespace(name, "Active")
}

/// Operator ConfigMap; `None` leaves out the `project_blacklist` key
pub fn operator_config_map(blacklist: Option<&str>) -> ClusterObject {
    ClusterObject::ConfigMap(ConfigMap {
        metadata: ObjectMeta {
            name: Some(DEFAULT_OPERATOR_CONFIG_MAP.to_string()),
            namespace: Some(DEFAULT_OPERATOR_NAMESPACE.to_string()),
            ..Default::default()
        },
        data: blacklist.map(|value| {
            BTreeMap::from([(PROJECT_BLACKLIST_KEY.to_string(), value.to_string())])
        }),
        ..Default::default()
    })
}

pub fn role_binding_key(namespace: &str, name: &str) -> StoreKey {
    (
        ResourceKind::RoleBinding,
        ObjectKey::namespaced(namespace, name),
    )
}

/// Store, tracker and catalogue shared by the reconcilers under test
#[derive(Debug)]
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub tracker: Arc<ExclusionTracker>,
    pub catalogue: Arc<Catalogue>,
}

impl Harness {
    /// Empty store, no operator ConfigMap
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            tracker: Arc::new(ExclusionTracker::new()),
            catalogue: Arc::new(
                Catalogue::dedicated_admin(DEFAULT_OPERATOR_NAMESPACE, 8080)
                    .expect("built-in catalogue"),
            ),
        }
    }

    /// Store holding the operator ConfigMap with `policy`
    pub fn with_policy(policy: &str) -> Self {
        let harness = Self::new();
        harness.store.insert(operator_config_map(Some(policy)));
        harness
    }

    fn object_store(&self) -> Arc<dyn ObjectStore> {
        Arc::clone(&self.store) as Arc<dyn ObjectStore>
    }

    fn config_source() -> OperatorConfigSource {
        OperatorConfigSource::new(DEFAULT_OPERATOR_NAMESPACE, DEFAULT_OPERATOR_CONFIG_MAP)
    }

    pub fn namespace_reconciler(&self) -> NamespaceReconciler {
        NamespaceReconciler::new(
            self.object_store(),
            Self::config_source(),
            Arc::clone(&self.catalogue),
            Arc::clone(&self.tracker),
        )
    }

    pub fn role_binding_reconciler(&self) -> ChildResourceReconciler {
        ChildResourceReconciler::new(
            ResourceKind::RoleBinding,
            self.object_store(),
            Self::config_source(),
            Arc::clone(&self.catalogue),
        )
    }

    pub fn operator_reconciler(&self) -> OperatorNamespaceReconciler {
        OperatorNamespaceReconciler::new(
            DEFAULT_OPERATOR_NAMESPACE,
            self.object_store(),
            Arc::clone(&self.catalogue),
        )
    }
}
