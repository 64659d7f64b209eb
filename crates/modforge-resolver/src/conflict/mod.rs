//! Conflict reports and their rendering
//!
//! A `Conflict` names the module whose demands admit no version and lists
//! those demands in discovery order. `ErrorReporter` turns
//! it into the one-line and multi-line messages shown to the user.

use std::fmt;

use serde::{Deserialize, Serialize};

use modforge_core::error::ForgeError;
use modforge_core::types::{ModuleName, Version, VersionReq};

/// Who placed a demand on a module
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Requester {
    /// The install request itself
    Request,
    /// A selected release of another module
    Release { module: ModuleName, version: Version },
}

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requester::Request => f.write_str("install request"),
            Requester::Release { module, version } => write!(f, "{}@{}", module, version),
        }
    }
}

/// A (requester, constraint) pair imposed on one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Demand {
    pub requester: Requester,
    pub constraint: VersionReq,
}

impl Demand {
    pub fn new(requester: Requester, constraint: VersionReq) -> Self {
        Self {
            requester,
            constraint,
        }
    }
}

/// A module whose demands have an empty intersection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub module: ModuleName,
    pub demands: Vec<Demand>,
}

/// Errors raised while resolving
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("No version of '{}' will satisfy dependencies", .0.module)]
    Unsatisfiable(Conflict),

    #[error(transparent)]
    Catalog(#[from] ForgeError),
}

/// User-facing failure text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub oneline: String,
    pub multiline: String,
}

/// Renders resolution failures
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorReporter;

impl ErrorReporter {
    /// Render an unsatisfiable-constraint failure for the root request
    ///
    /// `attempted` describes the root version that was requested, as produced
    /// by [`ErrorReporter::describe_constraint`].
    pub fn format(root: &ModuleName, attempted: &str, conflict: &Conflict) -> ErrorReport {
        let oneline = format!(
            "'{}' ({}) requested; Invalid dependency cycle",
            root, attempted
        );

        let mut lines = vec![
            format!("Could not install module '{}' ({})", root, attempted),
            format!(
                "  No version of '{}' will satisfy dependencies:",
                conflict.module
            ),
        ];
        for demand in &conflict.demands {
            let constraint = Self::describe_constraint(&demand.constraint);
            lines.push(match &demand.requester {
                Requester::Request => format!(
                    "    The install request requires '{}' ({})",
                    conflict.module, constraint
                ),
                Requester::Release { module, version } => format!(
                    "    '{}' ({}) requires '{}' ({})",
                    module,
                    version.vstring(),
                    conflict.module,
                    constraint
                ),
            });
        }
        lines.push(
            "    Use `puppet module install --force` to install this module anyway".to_string(),
        );

        ErrorReport {
            oneline,
            multiline: lines.join("\n"),
        }
    }

    /// Render a catalog failure (unknown module, malformed release data)
    pub fn format_catalog_failure(
        root: &ModuleName,
        attempted: &str,
        error: &ForgeError,
    ) -> ErrorReport {
        ErrorReport {
            oneline: format!("'{}' ({}) requested; {}", root, attempted, error),
            multiline: format!(
                "Could not install module '{}' ({})\n  {}",
                root, attempted, error
            ),
        }
    }

    /// `v1.2.3` for an exact pin, `latest` when unconstrained, else the text
    pub fn describe_constraint(constraint: &VersionReq) -> String {
        if let Some(version) = constraint.exact_version() {
            version.vstring()
        } else if constraint.is_any() {
            "latest".to_string()
        } else {
            constraint.as_str().to_string()
        }
    }
}
