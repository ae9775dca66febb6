//! # Initialization
//!
//! Operator initialization: rustls setup, tracing, metrics, server startup,
//! Kubernetes client setup and the shared reconciliation state.

use crate::catalogue::Catalogue;
use crate::config::ControllerConfig;
use crate::controller::server::{start_server, ServerState};
use crate::observability::{self, ExclusionTracker};
use crate::store::{KubeStore, ObjectStore};
use anyhow::{Context, Result};
use kube::Client;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const SERVER_STARTUP_TIMEOUT: Duration = Duration::from_secs(10);
const SERVER_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Initialization result containing all necessary components for the operator
pub struct InitializationResult {
    /// Kubernetes client, used for the watches
    pub client: Client,
    /// Object store shared by every reconciler
    pub store: Arc<dyn ObjectStore>,
    pub catalogue: Arc<Catalogue>,
    /// Exclusion decisions behind the blacklist gauge
    pub tracker: Arc<ExclusionTracker>,
    /// Server state for health checks
    pub server_state: Arc<ServerState>,
    pub config: ControllerConfig,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("config", &self.config)
            .field(
                "server_ready",
                &self.server_state.is_ready.load(Ordering::Relaxed),
            )
            .finish_non_exhaustive()
    }
}

/// Initialize the operator runtime
///
/// This function handles:
/// - rustls crypto provider setup
/// - Tracing subscriber setup
/// - Metrics registration
/// - HTTP server startup
/// - Kubernetes client creation
/// - Object store, catalogue and tracker construction
pub async fn initialize(config: ControllerConfig) -> Result<InitializationResult> {
    // Must run before anything opens a TLS connection
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        return Err(anyhow::anyhow!("Failed to install rustls crypto provider"));
    }

    init_tracing(&config)?;

    info!("Starting dedicated-admin operator");
    info!(
        "Build info: date={}, git_hash={}",
        env!("BUILD_DATE"),
        env!("BUILD_GIT_HASH")
    );
    info!(
        operator_namespace = %config.operator_namespace,
        config_map = %config.operator_config_map,
        metrics_port = config.metrics_port,
        "Loaded controller configuration"
    );

    observability::metrics::register_metrics().context("Failed to register metrics")?;

    let tracker = Arc::new(ExclusionTracker::new());
    let server_state = Arc::new(ServerState::new(Arc::clone(&tracker)));

    let server_state_clone = Arc::clone(&server_state);
    let server_port = config.metrics_port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(server_port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });
    wait_for_server_ready(&server_state, &server_handle).await?;

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    let store: Arc<dyn ObjectStore> = Arc::new(KubeStore::new(client.clone()));
    let catalogue = Arc::new(
        Catalogue::dedicated_admin(&config.operator_namespace, config.metrics_port)
            .context("Invalid built-in catalogue")?,
    );

    info!("Operator initialized, starting watch loop...");

    Ok(InitializationResult {
        client,
        store,
        catalogue,
        tracker,
        server_state,
        config,
    })
}

fn init_tracing(config: &ControllerConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("dedicated_admin_operator={}", config.log_level).into());

    let result = if config.log_format.eq_ignore_ascii_case("text") {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    } else {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))
}

/// Wait for the HTTP server to become ready
async fn wait_for_server_ready(
    server_state: &Arc<ServerState>,
    server_handle: &tokio::task::JoinHandle<()>,
) -> Result<()> {
    let start_time = Instant::now();

    loop {
        if server_handle.is_finished() {
            return Err(anyhow::anyhow!("HTTP server failed to start"));
        }

        if server_state.is_ready.load(Ordering::Relaxed) {
            info!("HTTP server is ready and accepting connections");
            return Ok(());
        }

        if start_time.elapsed() > SERVER_STARTUP_TIMEOUT {
            return Err(anyhow::anyhow!(
                "HTTP server failed to become ready within {} seconds",
                SERVER_STARTUP_TIMEOUT.as_secs()
            ));
        }

        tokio::time::sleep(SERVER_POLL_INTERVAL).await;
    }
}
