//! Version selection against accumulated constraints
//!
//! Picks the highest available version satisfying every constraint a module
//! is currently under, or lists every such version for the search to walk.

use std::collections::BTreeSet;

use modforge_core::types::{Version, VersionReq};

/// Version selector for finding the best matching version of one module
#[derive(Debug, Clone)]
pub struct VersionSelector {
    /// Available versions in ascending order
    available_versions: BTreeSet<Version>,
}

impl VersionSelector {
    /// Create new version selector with available versions
    pub fn new<I>(versions: I) -> Self
    where
        I: IntoIterator<Item = Version>,
    {
        Self {
            available_versions: versions.into_iter().collect(),
        }
    }

    /// Select highest version matching all constraints
    pub fn select_best(&self, constraints: &[&VersionReq]) -> Option<Version> {
        self.available_versions
            .iter()
            .rev()
            .find(|version| constraints.iter().all(|req| req.matches(version)))
            .cloned()
    }

    /// Every version matching all constraints, ascending
    pub fn candidates(&self, constraints: &[&VersionReq]) -> Vec<Version> {
        self.available_versions
            .iter()
            .filter(|version| constraints.iter().all(|req| req.matches(version)))
            .cloned()
            .collect()
    }
}
