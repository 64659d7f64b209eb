use modforge_core::types::InstallOptions;

/// How much of the dependency closure a run resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionMode {
    /// Root module and every transitive dependency
    Full,
    /// Root module only
    RootOnly,
}

impl ResolutionMode {
    /// `RootOnly` when `force` or `ignore_dependencies` is set
    pub fn from_options(options: &InstallOptions) -> Self {
        if options.force || options.ignore_dependencies {
            ResolutionMode::RootOnly
        } else {
            ResolutionMode::Full
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_options() {
        let options = InstallOptions::new("/modules");
        assert_eq!(ResolutionMode::from_options(&options), ResolutionMode::Full);
        assert_eq!(
            ResolutionMode::from_options(&options.clone().force(true)),
            ResolutionMode::RootOnly
        );
        assert_eq!(
            ResolutionMode::from_options(&options.ignore_dependencies(true)),
            ResolutionMode::RootOnly
        );
    }
}
