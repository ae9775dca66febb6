//! # Configuration
//!
//! - `controller`: process settings from environment variables and flags
//! - `operator`: the exclusion policy ConfigMap, re-read on every reconciliation

pub mod controller;
pub mod operator;

pub use controller::ControllerConfig;
pub use operator::{OperatorConfigSource, PolicyLookup};
