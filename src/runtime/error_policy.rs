//! # Error Policy
//!
//! Retry timing for failed reconciliations and classification of watch
//! stream errors.

use crate::controller::backoff::BackoffRegistry;
use crate::controller::reconciler::ReconcilerError;
use crate::observability;
use crate::store::ObjectKey;
use std::time::Duration;
use tracing::{error, info, warn};

/// Delay before retrying `key` after `error`
///
/// Errors with a fixed [`ReconcilerError::retry_after`] use it as-is; all
/// others advance the key's Fibonacci backoff.
pub fn handle_reconciliation_error(
    controller: &str,
    key: &ObjectKey,
    error: &ReconcilerError,
    backoff: &BackoffRegistry,
) -> Duration {
    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "controller.reconciliation_error",
        controller,
        resource = %key,
        error = %error
    );
    let _error_guard = error_span.enter();

    observability::metrics::increment_reconciliation_errors(controller);

    let (delay, trigger) = match error.retry_after() {
        Some(delay) => (delay, "config-unavailable"),
        None => (backoff.next_delay(key), "error-backoff"),
    };

    match error {
        ReconcilerError::ConfigUnavailable { .. } => {
            warn!("Reconciliation deferred for {}: {}", key, error_chain(error));
        }
        ReconcilerError::Read { .. } | ReconcilerError::Create { .. } => {
            error!("Reconciliation error for {}: {}", key, error_chain(error));
        }
    }

    let next_trigger_time = chrono::Utc::now()
        + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
    info!(
        "Next retry scheduled: {} (in {}s, trigger source: {})",
        next_trigger_time.to_rfc3339(),
        delay.as_secs(),
        trigger
    );

    delay
}

/// Error and its sources joined with `: `
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

/// How the watch loop reacts to a stream error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchErrorAction {
    /// The stream recovers on its own (it carries its own backoff)
    Continue,
    /// Drop the stream and start a fresh watch after the restart delay
    Restart,
}

/// Classify a watch stream error from its rendered form
///
/// Authorization failures restart the watch so revoked or rotated credentials
/// are picked up; everything else is left to the stream's own backoff.
#[must_use]
pub fn classify_watch_error(error_string: &str) -> WatchErrorAction {
    let is_not_found = error_string.contains("ObjectNotFound")
        || error_string.contains("404")
        || error_string.contains("not found");
    let is_unauthorized = (error_string.contains("401")
        || error_string.contains("Unauthorized")
        || error_string.contains("403")
        || error_string.contains("Forbidden"))
        && !is_not_found;

    if is_unauthorized {
        WatchErrorAction::Restart
    } else {
        WatchErrorAction::Continue
    }
}

/// Log a watch stream error and decide what the loop does next
pub fn handle_watch_stream_error(kind: &str, error_string: &str) -> WatchErrorAction {
    let error_span = tracing::span!(
        tracing::Level::WARN,
        "controller.watch.error",
        kind,
        error = %error_string
    );
    let _error_guard = error_span.enter();

    let action = classify_watch_error(error_string);
    match action {
        WatchErrorAction::Restart => {
            error!(
                "Watch on {} was rejected by the API server; check the operator's ClusterRole and ServiceAccount token",
                kind
            );
        }
        WatchErrorAction::Continue => {
            if error_string.contains("410") || error_string.contains("too old resource version") {
                warn!("Watch resource version expired (410) on {}, relisting", kind);
            } else {
                warn!("Watch stream error on {}: {}", kind, error_string);
            }
        }
    }
    action
}
