//! # Runtime
//!
//! - `initialization`: process bootstrap
//! - `dispatch`: per-controller work queues and dispatchers
//! - `error_policy`: retry delays and watch error handling
//! - `watch_loop`: watches, dispatchers and shutdown

pub mod dispatch;
pub mod error_policy;
pub mod initialization;
pub mod watch_loop;
