//! Dependency resolution engine for modforge
//!
//! This crate turns a root request into one version per module of its
//! transitive closure. Demands are accumulated in an explicit graph and every
//! module takes the highest version its active demands allow, backing off to
//! lower versions only when a higher one cannot be completed. When nothing
//! works the contradicting demands are reported as a structured conflict that
//! `ErrorReporter` renders for the user.

pub mod conflict;
pub mod graph;
pub mod selector;
pub mod solver;
pub mod tree;

// Re-export main types
pub use conflict::{Conflict, Demand, ErrorReport, ErrorReporter, Requester, ResolveError};
pub use graph::{DemandEdge, DemandGraph, DemandNode};
pub use selector::VersionSelector;
pub use solver::Solver;
pub use tree::ResolutionNode;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, ResolveError>;
