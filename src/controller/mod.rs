//! # Controller
//!
//! Core controller modules for the dedicated-admin operator.
//!
//! - `backoff`: Fibonacci backoff mechanism for retries
//! - `eligibility`: exclusion policy and namespace filter
//! - `reconciler`: Core reconciliation logic
//! - `server`: HTTP server for metrics and health checks

pub mod backoff;
pub mod eligibility;
pub mod reconciler;
pub mod server;
