//! # Controller Configuration
//!
//! Process-level settings loaded from environment variables.

use crate::constants::{
    DEFAULT_BACKOFF_MAX_SECS, DEFAULT_BACKOFF_MIN_SECS, DEFAULT_MAX_CONCURRENT_RECONCILIATIONS,
    DEFAULT_METRICS_PORT, DEFAULT_OPERATOR_CONFIG_MAP, DEFAULT_OPERATOR_NAMESPACE,
    DEFAULT_WATCH_RESTART_DELAY_SECS,
};
use std::time::Duration;

/// Controller-level configuration
///
/// All settings have defaults and can be overridden via environment variables,
/// which the deployment usually populates from a ConfigMap through `envFrom`.
/// This is distinct from the operator ConfigMap holding the exclusion policy,
/// which is re-read on every reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespace holding the operator ConfigMap and the operator's own resources
    pub operator_namespace: String,
    /// Name of the operator ConfigMap carrying `project_blacklist`
    pub operator_config_map: String,
    /// Port for `/metrics`, `/healthz` and `/readyz`
    pub metrics_port: u16,
    /// First backoff step after a failed reconciliation (seconds)
    pub backoff_min_secs: u64,
    /// Backoff ceiling (seconds)
    pub backoff_max_secs: u64,
    /// Delay before restarting a watch stream that ended (seconds)
    pub watch_restart_delay_secs: u64,
    /// Reconciliations allowed to run at once, per controller
    pub max_concurrent_reconciliations: usize,
    /// Global log level used when `RUST_LOG` is not set
    pub log_level: String,
    /// Log format (json, text)
    pub log_format: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            operator_namespace: DEFAULT_OPERATOR_NAMESPACE.to_string(),
            operator_config_map: DEFAULT_OPERATOR_CONFIG_MAP.to_string(),
            metrics_port: DEFAULT_METRICS_PORT,
            backoff_min_secs: DEFAULT_BACKOFF_MIN_SECS,
            backoff_max_secs: DEFAULT_BACKOFF_MAX_SECS,
            watch_restart_delay_secs: DEFAULT_WATCH_RESTART_DELAY_SECS,
            max_concurrent_reconciliations: DEFAULT_MAX_CONCURRENT_RECONCILIATIONS,
            log_level: "info".to_string(),
            log_format: "json".to_string(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            operator_namespace: lookup("OPERATOR_NAMESPACE")
                .unwrap_or(defaults.operator_namespace),
            operator_config_map: lookup("OPERATOR_CONFIG_MAP")
                .unwrap_or(defaults.operator_config_map),
            metrics_port: parsed_or(&lookup, "METRICS_PORT", defaults.metrics_port),
            backoff_min_secs: parsed_or(&lookup, "BACKOFF_MIN_SECS", defaults.backoff_min_secs),
            backoff_max_secs: parsed_or(&lookup, "BACKOFF_MAX_SECS", defaults.backoff_max_secs),
            watch_restart_delay_secs: parsed_or(
                &lookup,
                "WATCH_RESTART_DELAY_SECS",
                defaults.watch_restart_delay_secs,
            ),
            max_concurrent_reconciliations: parsed_or(
                &lookup,
                "MAX_CONCURRENT_RECONCILIATIONS",
                defaults.max_concurrent_reconciliations,
            )
            .max(1),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT").unwrap_or(defaults.log_format),
        }
    }

    /// Get watch restart delay duration
    #[must_use]
    pub fn watch_restart_delay(&self) -> Duration {
        Duration::from_secs(self.watch_restart_delay_secs)
    }
}

/// Parse a looked-up value or fall back to the default when missing or malformed
fn parsed_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = ControllerConfig::from_lookup(|_| None);
        assert_eq!(config, ControllerConfig::default());
        assert_eq!(config.operator_namespace, "openshift-dedicated-admin");
        assert_eq!(config.operator_config_map, "dedicated-admin-operator-config");
        assert_eq!(config.metrics_port, 8080);
    }

    #[test]
    fn test_overrides_from_lookup() {
        let config = ControllerConfig::from_lookup(lookup_from(&[
            ("OPERATOR_NAMESPACE", "dedicated-admin"),
            ("METRICS_PORT", "9090"),
            ("BACKOFF_MAX_SECS", "60"),
            ("LOG_FORMAT", "text"),
        ]));
        assert_eq!(config.operator_namespace, "dedicated-admin");
        assert_eq!(config.metrics_port, 9090);
        assert_eq!(config.backoff_max_secs, 60);
        assert_eq!(config.log_format, "text");
    }

    #[test]
    fn test_malformed_numbers_fall_back_to_defaults() {
        let config = ControllerConfig::from_lookup(lookup_from(&[
            ("METRICS_PORT", "not-a-port"),
            ("MAX_CONCURRENT_RECONCILIATIONS", "0"),
        ]));
        assert_eq!(config.metrics_port, 8080);
        assert_eq!(config.max_concurrent_reconciliations, 1);
    }
}
