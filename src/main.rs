//! # Dedicated Admin Operator
//!
//! Keeps the `dedicated-admins` group bound to the `admin` and
//! `dedicated-admins-project` ClusterRoles in every namespace that the
//! operator ConfigMap does not exclude.
//!
//! ## Usage
//!
//! ```bash
//! # Defaults, or settings from the environment
//! dedicated-admin-operator
//!
//! # Override the operator namespace and log as text
//! dedicated-admin-operator --operator-namespace my-operator --log-format text
//! ```
//!
//! See [`dedicated_admin_operator::config::ControllerConfig`] for every
//! environment variable.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use dedicated_admin_operator::config::ControllerConfig;
use dedicated_admin_operator::runtime::{initialization, watch_loop};

/// Dedicated Admin Operator
#[derive(Parser, Debug)]
#[command(name = "dedicated-admin-operator", version, about, long_about = None)]
struct Args {
    /// Namespace holding the operator ConfigMap [env: OPERATOR_NAMESPACE]
    #[arg(long)]
    operator_namespace: Option<String>,

    /// Name of the operator ConfigMap [env: OPERATOR_CONFIG_MAP]
    #[arg(long)]
    config_map: Option<String>,

    /// Port for /metrics, /healthz and /readyz [env: METRICS_PORT]
    #[arg(long)]
    metrics_port: Option<u16>,

    /// Log output format [env: LOG_FORMAT]
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

impl Args {
    /// Layer command line flags over the environment
    fn apply(self, mut config: ControllerConfig) -> ControllerConfig {
        if let Some(namespace) = self.operator_namespace {
            config.operator_namespace = namespace;
        }
        if let Some(name) = self.config_map {
            config.operator_config_map = name;
        }
        if let Some(port) = self.metrics_port {
            config.metrics_port = port;
        }
        if let Some(format) = self.log_format {
            config.log_format = match format {
                LogFormat::Json => "json",
                LogFormat::Text => "text",
            }
            .to_string();
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Args::parse().apply(ControllerConfig::from_env());

    let init_result = initialization::initialize(config).await?;
    watch_loop::run(init_result).await
}
