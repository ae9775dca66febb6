//! # Namespace Reconciler Tests
//!
//! Runs the namespace reconciler against the in-memory store:
//! - exclusion short-circuits creation
//! - managed namespaces get both RoleBindings, once
//! - missing or unreadable configuration defers with a fixed delay
//! - terminating and vanished namespaces are left alone
//! - a failed create does not stop the rest of the catalogue

mod common;

use common::{
    active_namespace, namespace, operator_config_map, role_binding_key, Harness, ROLE_BINDINGS,
    STANDARD_POLICY,
};
use dedicated_admin_operator::controller::reconciler::{
    Reconcile, ReconcileOutcome, ReconcilerError,
};
use dedicated_admin_operator::store::{ObjectKey, ResourceKind};
use std::time::Duration;

fn key(name: &str) -> ObjectKey {
    ObjectKey::cluster(name)
}

#[tokio::test]
async fn test_excluded_namespace_creates_nothing() {
    let harness = Harness::with_policy(STANDARD_POLICY);
    harness.store.insert(active_namespace("kube-system"));

    let outcome = harness
        .namespace_reconciler()
        .reconcile(&key("kube-system"))
        .await
        .expect("reconcile");

    assert_eq!(outcome, ReconcileOutcome::Done);
    assert!(harness.store.create_attempts().is_empty());
    assert_eq!(harness.tracker.snapshot().get("kube-system"), Some(&true));
}

#[tokio::test]
async fn test_managed_namespace_gets_role_bindings_once() {
    let harness = Harness::with_policy(STANDARD_POLICY);
    harness.store.insert(active_namespace("test"));
    let reconciler = harness.namespace_reconciler();

    let outcome = reconciler.reconcile(&key("test")).await.expect("reconcile");
    assert_eq!(outcome, ReconcileOutcome::Done);
    assert_eq!(
        harness.store.created(),
        ROLE_BINDINGS
            .iter()
            .map(|name| role_binding_key("test", name))
            .collect::<Vec<_>>()
    );
    assert_eq!(harness.tracker.snapshot().get("test"), Some(&false));

    // Second pass: every create hits AlreadyExists and is swallowed
    let outcome = reconciler.reconcile(&key("test")).await.expect("reconcile");
    assert_eq!(outcome, ReconcileOutcome::Done);
    assert_eq!(harness.store.created().len(), 2);
    assert_eq!(harness.store.create_attempts().len(), 4);
}

#[tokio::test]
async fn test_created_role_binding_targets_dedicated_admins() {
    let harness = Harness::with_policy(STANDARD_POLICY);
    harness.store.insert(active_namespace("test"));

    harness
        .namespace_reconciler()
        .reconcile(&key("test"))
        .await
        .expect("reconcile");

    let (kind, rb_key) = role_binding_key("test", "dedicated-admins-project");
    let Some(dedicated_admin_operator::store::ClusterObject::RoleBinding(rb)) =
        harness.store.object(kind, &rb_key)
    else {
        panic!("role binding not created");
    };
    assert_eq!(rb.role_ref.kind, "ClusterRole");
    assert_eq!(rb.role_ref.name, "dedicated-admins-project");
    let subjects = rb.subjects.expect("subjects");
    assert_eq!(subjects.len(), 1);
    assert_eq!(subjects[0].kind, "Group");
    assert_eq!(subjects[0].name, "dedicated-admins");
}

#[tokio::test]
async fn test_missing_config_map_defers_five_seconds() {
    let harness = Harness::new();
    harness.store.insert(active_namespace("test"));

    let err = harness
        .namespace_reconciler()
        .reconcile(&key("test"))
        .await
        .expect_err("configuration is absent");

    assert!(matches!(
        err,
        ReconcilerError::ConfigUnavailable { source: Some(ref e) } if e.is_not_found()
    ));
    assert_eq!(err.retry_after(), Some(Duration::from_secs(5)));
    assert!(harness.store.create_attempts().is_empty());
    assert!(harness.tracker.snapshot().is_empty());
}

#[tokio::test]
async fn test_missing_blacklist_key_defers_five_seconds() {
    let harness = Harness::new();
    harness.store.insert(operator_config_map(None));
    harness.store.insert(active_namespace("test"));

    let err = harness
        .namespace_reconciler()
        .reconcile(&key("test"))
        .await
        .expect_err("key is absent");

    assert!(matches!(err, ReconcilerError::ConfigUnavailable { source: None }));
    assert_eq!(err.retry_after(), Some(Duration::from_secs(5)));
    assert!(harness.store.create_attempts().is_empty());
}

#[tokio::test]
async fn test_config_read_failure_defers_with_source() {
    let harness = Harness::with_policy(STANDARD_POLICY);
    harness.store.insert(active_namespace("test"));
    harness.store.fail_gets(ResourceKind::ConfigMap);

    let err = harness
        .namespace_reconciler()
        .reconcile(&key("test"))
        .await
        .expect_err("config read fails");

    assert!(matches!(
        err,
        ReconcilerError::ConfigUnavailable { source: Some(ref e) } if !e.is_not_found()
    ));
    assert_eq!(err.retry_after(), Some(Duration::from_secs(5)));
}

#[tokio::test]
async fn test_empty_policy_manages_every_namespace() {
    let harness = Harness::with_policy("");
    harness.store.insert(active_namespace("kube-system"));

    harness
        .namespace_reconciler()
        .reconcile(&key("kube-system"))
        .await
        .expect("reconcile");

    assert_eq!(harness.store.created().len(), 2);
    assert_eq!(harness.tracker.snapshot().get("kube-system"), Some(&false));
}

#[tokio::test]
async fn test_vanished_namespace_is_done() {
    let harness = Harness::with_policy(STANDARD_POLICY);

    let outcome = harness
        .namespace_reconciler()
        .reconcile(&key("gone"))
        .await
        .expect("reconcile");

    assert_eq!(outcome, ReconcileOutcome::Done);
    assert!(harness.store.create_attempts().is_empty());
}

#[tokio::test]
async fn test_namespace_read_failure_propagates() {
    let harness = Harness::with_policy(STANDARD_POLICY);
    harness.store.insert(active_namespace("test"));
    harness.store.fail_gets(ResourceKind::Namespace);

    let err = harness
        .namespace_reconciler()
        .reconcile(&key("test"))
        .await
        .expect_err("namespace read fails");

    assert!(matches!(
        err,
        ReconcilerError::Read { kind: ResourceKind::Namespace, .. }
    ));
    assert_eq!(err.retry_after(), None);
    assert!(harness.store.create_attempts().is_empty());
}

#[tokio::test]
async fn test_terminating_namespace_is_forgotten() {
    let harness = Harness::with_policy(STANDARD_POLICY);
    harness.store.insert(active_namespace("test"));
    let reconciler = harness.namespace_reconciler();
    reconciler.reconcile(&key("test")).await.expect("reconcile");
    assert!(harness.tracker.snapshot().contains_key("test"));
    harness.store.reset_create_log();

    harness.store.insert(namespace("test", "Terminating"));
    for name in ROLE_BINDINGS {
        let (kind, rb_key) = role_binding_key("test", name);
        harness.store.remove(kind, &rb_key);
    }

    let outcome = reconciler.reconcile(&key("test")).await.expect("reconcile");
    assert_eq!(outcome, ReconcileOutcome::Done);
    assert!(harness.store.create_attempts().is_empty());
    assert!(!harness.tracker.snapshot().contains_key("test"));
}

#[tokio::test]
async fn test_create_failure_continues_then_propagates() {
    let harness = Harness::with_policy(STANDARD_POLICY);
    harness.store.insert(active_namespace("test"));
    harness
        .store
        .fail_creates(ResourceKind::RoleBinding, "admin-dedicated-admins");

    let err = harness
        .namespace_reconciler()
        .reconcile(&key("test"))
        .await
        .expect_err("first create fails");

    match err {
        ReconcilerError::Create { kind, key, .. } => {
            assert_eq!(kind, ResourceKind::RoleBinding);
            assert_eq!(key, ObjectKey::namespaced("test", "admin-dedicated-admins"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // The remaining entry was still created
    assert_eq!(
        harness.store.created(),
        vec![role_binding_key("test", "dedicated-admins-project")]
    );

    // Retry after the failure clears converges
    harness.store.clear_failures();
    harness
        .namespace_reconciler()
        .reconcile(&key("test"))
        .await
        .expect("retry succeeds");
    assert_eq!(harness.store.created().len(), 2);
}

#[tokio::test]
async fn test_policy_change_flips_tracker_entry() {
    let harness = Harness::with_policy(STANDARD_POLICY);
    harness.store.insert(active_namespace("logging"));
    let reconciler = harness.namespace_reconciler();

    reconciler.reconcile(&key("logging")).await.expect("reconcile");
    assert_eq!(harness.tracker.excluded_count(), 1);
    assert!(harness.store.created().is_empty());

    // Administrator drops ^logging$ from the policy
    harness
        .store
        .insert(operator_config_map(Some("^kube-.*,^openshift-.*")));
    reconciler.reconcile(&key("logging")).await.expect("reconcile");
    assert_eq!(harness.tracker.excluded_count(), 0);
    assert_eq!(harness.store.created().len(), 2);
}
