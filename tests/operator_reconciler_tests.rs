//! # Operator-Namespace Reconciler Tests

mod common;

use common::{active_namespace, namespace, Harness};
use dedicated_admin_operator::constants::DEFAULT_OPERATOR_NAMESPACE;
use dedicated_admin_operator::controller::reconciler::{
    Reconcile, ReconcileOutcome, ReconcilerError,
};
use dedicated_admin_operator::store::{ClusterObject, ObjectKey, ResourceKind};

fn operator_key() -> ObjectKey {
    ObjectKey::cluster(DEFAULT_OPERATOR_NAMESPACE)
}

#[tokio::test]
async fn test_other_namespaces_are_ignored() {
    let harness = Harness::new();
    harness.store.insert(active_namespace("test"));

    let outcome = harness
        .operator_reconciler()
        .reconcile(&ObjectKey::cluster("test"))
        .await
        .expect("reconcile");

    assert_eq!(outcome, ReconcileOutcome::Done);
    assert!(harness.store.create_attempts().is_empty());
}

#[tokio::test]
async fn test_operator_resources_created() {
    let harness = Harness::new();
    harness.store.insert(active_namespace(DEFAULT_OPERATOR_NAMESPACE));

    let outcome = harness
        .operator_reconciler()
        .reconcile(&operator_key())
        .await
        .expect("reconcile");

    assert_eq!(outcome, ReconcileOutcome::Done);
    assert_eq!(
        harness.store.created(),
        vec![
            (
                ResourceKind::ClusterRoleBinding,
                ObjectKey::cluster("dedicated-admins-cluster")
            ),
            (
                ResourceKind::Service,
                ObjectKey::namespaced(DEFAULT_OPERATOR_NAMESPACE, "dedicated-admin-operator")
            ),
            (
                ResourceKind::ServiceMonitor,
                ObjectKey::namespaced(DEFAULT_OPERATOR_NAMESPACE, "dedicated-admin-operator")
            ),
        ]
    );

    let Some(ClusterObject::Service(service)) = harness.store.object(
        ResourceKind::Service,
        &ObjectKey::namespaced(DEFAULT_OPERATOR_NAMESPACE, "dedicated-admin-operator"),
    ) else {
        panic!("service not created");
    };
    let spec = service.spec.expect("spec");
    assert_eq!(spec.type_.as_deref(), Some("ClusterIP"));
    let ports = spec.ports.expect("ports");
    assert_eq!(ports[0].name.as_deref(), Some("metrics"));
    assert_eq!(ports[0].port, 8080);
    assert_eq!(
        spec.selector.expect("selector").get("k8s-app").map(String::as_str),
        Some("dedicated-admin-operator")
    );
}

#[tokio::test]
async fn test_second_pass_creates_nothing() {
    let harness = Harness::new();
    harness.store.insert(active_namespace(DEFAULT_OPERATOR_NAMESPACE));
    let reconciler = harness.operator_reconciler();

    reconciler.reconcile(&operator_key()).await.expect("reconcile");
    reconciler.reconcile(&operator_key()).await.expect("reconcile");

    assert_eq!(harness.store.created().len(), 3);
    assert_eq!(harness.store.create_attempts().len(), 6);
}

#[tokio::test]
async fn test_missing_operator_namespace_propagates() {
    let harness = Harness::new();

    let err = harness
        .operator_reconciler()
        .reconcile(&operator_key())
        .await
        .expect_err("operator namespace is expected to exist");

    assert!(matches!(
        err,
        ReconcilerError::Read { kind: ResourceKind::Namespace, ref source, .. } if source.is_not_found()
    ));
}

#[tokio::test]
async fn test_terminating_operator_namespace_is_done() {
    let harness = Harness::new();
    harness
        .store
        .insert(namespace(DEFAULT_OPERATOR_NAMESPACE, "Terminating"));

    let outcome = harness
        .operator_reconciler()
        .reconcile(&operator_key())
        .await
        .expect("reconcile");

    assert_eq!(outcome, ReconcileOutcome::Done);
    assert!(harness.store.create_attempts().is_empty());
}

#[tokio::test]
async fn test_create_failure_aborts_pass() {
    let harness = Harness::new();
    harness.store.insert(active_namespace(DEFAULT_OPERATOR_NAMESPACE));
    harness
        .store
        .fail_creates(ResourceKind::Service, "dedicated-admin-operator");

    let err = harness
        .operator_reconciler()
        .reconcile(&operator_key())
        .await
        .expect_err("service create fails");

    assert!(matches!(
        err,
        ReconcilerError::Create { kind: ResourceKind::Service, .. }
    ));
    // ServiceMonitor comes after the Service and is never attempted
    assert_eq!(harness.store.create_attempts().len(), 2);
    assert_eq!(harness.store.created().len(), 1);
}
