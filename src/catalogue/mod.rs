//! # Desired-State Catalogue
//!
//! The fixed set of objects the operator keeps alive.
//!
//! Each [`DesiredObject`] is a template keyed by kind and name, with a
//! [`Placement`] saying where it belongs:
//!
//! - [`Placement::EveryNamespace`]: the dedicated-admin RoleBindings, created in
//!   every managed namespace
//! - [`Placement::OperatorNamespace`]: the operator's ClusterRoleBinding, metrics
//!   Service and ServiceMonitor, created once the operator namespace is active
//!
//! The catalogue is built once at startup and shared read-only afterwards.
//! Only existence is managed; fields of existing objects are never compared.

mod operator;
mod project;

use crate::store::{ClusterObject, ResourceKind};
use std::collections::HashSet;
use thiserror::Error;

/// Where a catalogue entry is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    EveryNamespace,
    OperatorNamespace,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogueError {
    #[error("duplicate catalogue entry {kind} {name}")]
    Duplicate { kind: ResourceKind, name: String },

    #[error("catalogue entry of kind {0} has no name")]
    Unnamed(ResourceKind),
}

/// Template for one object that must exist
#[derive(Debug, Clone)]
pub struct DesiredObject {
    placement: Placement,
    template: ClusterObject,
}

impl DesiredObject {
    #[must_use]
    pub fn new(placement: Placement, template: ClusterObject) -> Self {
        Self {
            placement,
            template,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.template.kind()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.template.name()
    }

    #[must_use]
    pub fn placement(&self) -> Placement {
        self.placement
    }

    #[must_use]
    pub fn is_namespaced(&self) -> bool {
        self.kind().is_namespaced()
    }

    /// The object to create for `namespace`
    #[must_use]
    pub fn instantiate(&self, namespace: &str) -> ClusterObject {
        self.template.in_namespace(namespace)
    }
}

/// Immutable list of [`DesiredObject`]s, unique by kind and name
#[derive(Debug, Clone)]
pub struct Catalogue {
    entries: Vec<DesiredObject>,
}

impl Catalogue {
    /// Build a catalogue, rejecting unnamed or duplicate entries
    pub fn new(entries: Vec<DesiredObject>) -> Result<Self, CatalogueError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.name().is_empty() {
                return Err(CatalogueError::Unnamed(entry.kind()));
            }
            if !seen.insert((entry.kind(), entry.name().to_string())) {
                return Err(CatalogueError::Duplicate {
                    kind: entry.kind(),
                    name: entry.name().to_string(),
                });
            }
        }
        Ok(Self { entries })
    }

    /// The dedicated-admin catalogue
    ///
    /// `operator_namespace` and `metrics_port` describe where the operator's own
    /// Service and ServiceMonitor live.
    pub fn dedicated_admin(operator_namespace: &str, metrics_port: u16) -> Result<Self, CatalogueError> {
        let mut entries: Vec<DesiredObject> = project::role_bindings()
            .into_iter()
            .map(|rb| DesiredObject::new(Placement::EveryNamespace, ClusterObject::RoleBinding(rb)))
            .collect();
        entries.extend([
            DesiredObject::new(
                Placement::OperatorNamespace,
                ClusterObject::ClusterRoleBinding(operator::cluster_role_binding()),
            ),
            DesiredObject::new(
                Placement::OperatorNamespace,
                ClusterObject::Service(operator::metrics_service(operator_namespace, metrics_port)),
            ),
            DesiredObject::new(
                Placement::OperatorNamespace,
                ClusterObject::ServiceMonitor(operator::service_monitor(operator_namespace)),
            ),
        ]);
        Self::new(entries)
    }

    pub fn entries(&self) -> impl Iterator<Item = &DesiredObject> {
        self.entries.iter()
    }

    /// Namespaced entries created in every managed namespace
    pub fn per_namespace(&self) -> impl Iterator<Item = &DesiredObject> {
        self.entries
            .iter()
            .filter(|e| e.placement == Placement::EveryNamespace && e.is_namespaced())
    }

    /// Entries created once the operator namespace is active
    pub fn operator_resources(&self) -> impl Iterator<Item = &DesiredObject> {
        self.entries
            .iter()
            .filter(|e| e.placement == Placement::OperatorNamespace)
    }

    /// Per-namespace entry of `kind` named `name`, if the operator manages one
    #[must_use]
    pub fn find_per_namespace(&self, kind: ResourceKind, name: &str) -> Option<&DesiredObject> {
        self.per_namespace()
            .find(|e| e.kind() == kind && e.name() == name)
    }
}
