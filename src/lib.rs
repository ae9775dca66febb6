//! Dedicated Admin Operator Library
//!
//! Grants the `dedicated-admins` group its RoleBindings in every namespace not
//! excluded by the operator ConfigMap, and recreates them when they are deleted.
//!
//! ## Quick Start
//!
//! ```rust
//! use dedicated_admin_operator::prelude::*;
//! ```
//!
//! This brings commonly used types and traits into scope. For more specific imports,
//! use the individual modules.

pub mod catalogue;
pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod observability;
pub mod prelude;
pub mod runtime;
pub mod store;
