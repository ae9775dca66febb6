//! # Watch Loop
//!
//! Watches Namespaces and RoleBindings, feeds their keys to the controllers'
//! queues, and runs one dispatcher per controller until shutdown.
//!
//! | Watch       | Controllers                                  |
//! |-------------|----------------------------------------------|
//! | Namespace   | namespace, operator-namespace                |
//! | RoleBinding | rolebinding (self-healing of deleted grants) |
//!
//! Delete events are forwarded like any other event; the reconcilers notice
//! the object is gone when they re-read it.

use crate::config::OperatorConfigSource;
use crate::constants::REQUEST_QUEUE_CAPACITY;
use crate::controller::backoff::BackoffRegistry;
use crate::controller::reconciler::{
    ChildResourceReconciler, NamespaceReconciler, OperatorNamespaceReconciler, Reconcile,
};
use crate::runtime::dispatch::{request_queue, run_dispatcher, RequestSender, TriggerSource};
use crate::runtime::error_policy::{handle_watch_stream_error, WatchErrorAction};
use crate::runtime::initialization::InitializationResult;
use crate::store::{ObjectKey, ResourceKind};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::api::rbac::v1::RoleBinding;
use kube::api::Api;
use kube::Resource;
use kube_runtime::{watcher, WatchStreamExt};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Run the operator until SIGINT or SIGTERM
pub async fn run(ctx: InitializationResult) -> Result<(), anyhow::Error> {
    let InitializationResult {
        client,
        store,
        catalogue,
        tracker,
        server_state,
        config,
    } = ctx;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let policy_source =
        OperatorConfigSource::new(&config.operator_namespace, &config.operator_config_map);

    let namespace_reconciler: Arc<dyn Reconcile> = Arc::new(NamespaceReconciler::new(
        Arc::clone(&store),
        policy_source.clone(),
        Arc::clone(&catalogue),
        Arc::clone(&tracker),
    ));
    let operator_reconciler: Arc<dyn Reconcile> = Arc::new(OperatorNamespaceReconciler::new(
        config.operator_namespace.clone(),
        Arc::clone(&store),
        Arc::clone(&catalogue),
    ));
    let role_binding_reconciler: Arc<dyn Reconcile> = Arc::new(ChildResourceReconciler::new(
        ResourceKind::RoleBinding,
        Arc::clone(&store),
        policy_source,
        Arc::clone(&catalogue),
    ));

    let mut tasks: Vec<JoinHandle<()>> = Vec::new();
    let mut spawn_controller = |reconciler: Arc<dyn Reconcile>| -> RequestSender {
        let (sender, receiver) = request_queue(REQUEST_QUEUE_CAPACITY);
        let backoff = Arc::new(BackoffRegistry::new(
            config.backoff_min_secs,
            config.backoff_max_secs,
        ));
        tasks.push(tokio::spawn(run_dispatcher(
            reconciler,
            receiver,
            sender.clone(),
            backoff,
            config.max_concurrent_reconciliations,
            shutdown_rx.clone(),
        )));
        sender
    };

    let namespace_queue = spawn_controller(namespace_reconciler);
    let operator_queue = spawn_controller(operator_reconciler);
    let role_binding_queue = spawn_controller(role_binding_reconciler);

    let restart_delay = config.watch_restart_delay();
    tasks.push(tokio::spawn(watch_resource(
        Api::<Namespace>::all(client.clone()),
        vec![namespace_queue, operator_queue],
        restart_delay,
        shutdown_rx.clone(),
    )));
    tasks.push(tokio::spawn(watch_resource(
        Api::<RoleBinding>::all(client),
        vec![role_binding_queue],
        restart_delay,
        shutdown_rx,
    )));

    info!("Controller watch loop started");

    shutdown_signal().await;
    info!("Received shutdown signal (SIGINT/SIGTERM), initiating graceful shutdown...");
    server_state.is_ready.store(false, Ordering::Relaxed);
    // Fails only when every task has already exited
    let _ = shutdown_tx.send(true);

    for result in futures::future::join_all(tasks).await {
        if let Err(e) = result {
            warn!("Controller task ended abnormally: {}", e);
        }
    }

    info!("Controller stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

/// Key to reconcile for a watch event, if the event names an object
pub fn event_key<K: Resource>(event: &watcher::Event<K>) -> Option<ObjectKey> {
    match event {
        watcher::Event::Apply(obj)
        | watcher::Event::InitApply(obj)
        | watcher::Event::Delete(obj) => Some(ObjectKey::for_resource(obj)),
        watcher::Event::Init | watcher::Event::InitDone => None,
    }
}

/// Watch every object of `K` and push its key onto each of `targets`
async fn watch_resource<K>(
    api: Api<K>,
    targets: Vec<RequestSender>,
    restart_delay: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + 'static,
{
    let kind = K::kind(&()).to_string();

    loop {
        let watch_span = tracing::info_span!("controller.watch", kind = kind.as_str());
        watch_span.in_scope(|| info!("Starting watch"));

        let mut stream = watcher(api.clone(), watcher::Config::default())
            .default_backoff()
            .boxed();

        loop {
            let item = tokio::select! {
                _ = shutdown.changed() => return,
                item = stream.next() => item,
            };

            match item {
                Some(Ok(event)) => {
                    let Some(key) = event_key(&event) else {
                        continue;
                    };
                    debug!(kind = kind.as_str(), resource = %key, "Watch event");
                    for target in &targets {
                        if !target.enqueue(key.clone(), TriggerSource::Watch).await {
                            return;
                        }
                    }
                }
                Some(Err(e)) => {
                    let action = handle_watch_stream_error(&kind, &e.to_string());
                    if action == WatchErrorAction::Restart {
                        break;
                    }
                }
                None => {
                    warn!(kind = kind.as_str(), "Watch stream ended");
                    break;
                }
            }
        }

        warn!(
            kind = kind.as_str(),
            "Restarting watch in {} seconds...",
            restart_delay.as_secs()
        );
        tokio::select! {
            _ = shutdown.changed() => return,
            () = tokio::time::sleep(restart_delay) => {},
        }
    }
}
