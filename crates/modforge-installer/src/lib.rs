//! Install orchestration for modforge
//!
//! Validates the requested module name, resolves the dependency closure
//! through the solver (or the root module alone), checks already-installed
//! modules, then retrieves and unpacks every resolved module exactly once.
//! Resolution failures come back as a failure `InstallResult`; invalid names
//! and collaborator failures are hard errors.

pub mod mode;
pub mod orchestrator;
pub mod preflight;
pub mod result;

// Re-export main types
pub use mode::ResolutionMode;
pub use orchestrator::{install, Installer};
pub use preflight::{check_install_paths, check_local_modules};
pub use result::{InstallResult, InstalledModule, InstalledVersion};
