//! # Metrics
//!
//! Prometheus metrics for monitoring the operator.
//!
//! ## Metrics Exposed
//!
//! - `dedicated_admin_blacklisted_projects` - Namespaces currently excluded by the policy
//! - `dedicated_admin_reconciliations_total` - Reconciliations per controller
//! - `dedicated_admin_reconciliation_errors_total` - Failed reconciliations per controller
//! - `dedicated_admin_reconciliation_duration_seconds` - Reconciliation duration per controller
//! - `dedicated_admin_objects_created_total` - Catalogue objects created, by kind

use crate::constants::OPERATOR_NAME;
use anyhow::Result;
use prometheus::core::Collector;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::LazyLock;

// Metrics
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static BLACKLISTED_PROJECTS: LazyLock<IntGauge> = LazyLock::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "dedicated_admin_blacklisted_projects",
            "Number of namespaces excluded from dedicated-admin management",
        )
        .const_label("name", OPERATOR_NAME),
    )
    .expect("Failed to create BLACKLISTED_PROJECTS metric - this should never happen")
});

static RECONCILIATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "dedicated_admin_reconciliations_total",
            "Total number of reconciliations",
        ),
        &["controller"],
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "dedicated_admin_reconciliation_errors_total",
            "Total number of reconciliation errors",
        ),
        &["controller"],
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "dedicated_admin_reconciliation_duration_seconds",
            "Duration of reconciliation in seconds",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
        &["controller"],
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static OBJECTS_CREATED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "dedicated_admin_objects_created_total",
            "Total number of catalogue objects created",
        ),
        &["kind"],
    )
    .expect("Failed to create OBJECTS_CREATED_TOTAL metric - this should never happen")
});

fn register<C: Collector + 'static>(collector: C) -> Result<()> {
    match REGISTRY.register(Box::new(collector)) {
        Ok(()) | Err(prometheus::Error::AlreadyReg) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Register every metric with [`REGISTRY`]. Safe to call more than once.
pub fn register_metrics() -> Result<()> {
    register(BLACKLISTED_PROJECTS.clone())?;
    register(RECONCILIATIONS_TOTAL.clone())?;
    register(RECONCILIATION_ERRORS_TOTAL.clone())?;
    register(RECONCILIATION_DURATION.clone())?;
    register(OBJECTS_CREATED_TOTAL.clone())?;

    Ok(())
}

pub fn set_blacklisted_projects(count: usize) {
    BLACKLISTED_PROJECTS.set(i64::try_from(count).unwrap_or(i64::MAX));
}

pub fn increment_reconciliations(controller: &str) {
    RECONCILIATIONS_TOTAL.with_label_values(&[controller]).inc();
}

pub fn increment_reconciliation_errors(controller: &str) {
    RECONCILIATION_ERRORS_TOTAL
        .with_label_values(&[controller])
        .inc();
}

pub fn observe_reconciliation_duration(controller: &str, duration: f64) {
    RECONCILIATION_DURATION
        .with_label_values(&[controller])
        .observe(duration);
}

pub fn increment_objects_created(kind: &str) {
    OBJECTS_CREATED_TOTAL.with_label_values(&[kind]).inc();
}
