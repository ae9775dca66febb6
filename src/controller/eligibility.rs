//! # Eligibility
//!
//! Decides whether a namespace is managed by the operator.
//!
//! Administrative namespaces (`kube-system`, `openshift-logging`, ...) are
//! excluded through a list of regular expressions read from the operator
//! ConfigMap. A namespace is excluded when any pattern matches anywhere in its
//! name; patterns anchor themselves with `^`/`$` when an exact match is wanted.

use regex::Regex;
use tracing::warn;

/// Ordered list of exclusion patterns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionPolicy {
    patterns: Vec<String>,
}

impl ExclusionPolicy {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the comma separated `project_blacklist` value.
    ///
    /// Entries are trimmed and empty entries dropped, so `""` is an empty policy.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self::new(
            raw.split(',')
                .map(str::trim)
                .filter(|pattern| !pattern.is_empty()),
        )
    }

    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    #[must_use]
    pub fn excludes(&self, namespace: &str) -> bool {
        is_excluded(namespace, self)
    }
}

/// Whether `namespace` matches any pattern of `policy`.
///
/// Patterns are tried in order and the first match wins. A pattern that does
/// not compile is logged and treated as non-matching.
#[must_use]
pub fn is_excluded(namespace: &str, policy: &ExclusionPolicy) -> bool {
    policy
        .patterns
        .iter()
        .any(|pattern| match Regex::new(pattern) {
            Ok(re) => re.is_match(namespace),
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "Ignoring invalid exclusion pattern");
                false
            }
        })
}
