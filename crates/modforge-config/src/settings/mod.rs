//! Resolved settings

use camino::{Utf8Path, Utf8PathBuf};

use modforge_core::error::ForgeError;
use modforge_core::DEFAULT_REGISTRY;

use crate::ConfigResult;

/// Fully layered settings for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Forge base URL
    pub registry_url: String,
    /// Directory modules are installed into
    pub module_dir: Utf8PathBuf,
    /// Directory downloaded archives are kept in
    pub cache_dir: Utf8PathBuf,
    /// Retries of a failed registry request
    pub max_retries: u32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Settings {
    /// Built-in defaults for a working directory
    pub fn defaults(cwd: &Utf8Path) -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY.to_string(),
            module_dir: cwd.join("modules"),
            cache_dir: default_cache_dir(cwd),
            max_retries: 3,
            timeout_secs: 30,
        }
    }

    /// Check the settings for values no run could use
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.registry_url.starts_with("http://") || self.registry_url.starts_with("https://"))
        {
            return Err(ForgeError::ConfigValidation {
                field: "registry.url".to_string(),
                reason: format!("'{}' is not an http(s) URL", self.registry_url),
            });
        }
        if self.max_retries > 10 {
            return Err(ForgeError::ConfigValidation {
                field: "registry.max_retries".to_string(),
                reason: format!("{} exceeds the limit of 10", self.max_retries),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ForgeError::ConfigValidation {
                field: "registry.timeout_secs".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// `<user cache>/modforge`, or `.modforge/cache` under `cwd`
fn default_cache_dir(cwd: &Utf8Path) -> Utf8PathBuf {
    dirs::cache_dir()
        .and_then(|dir| Utf8PathBuf::try_from(dir).ok())
        .map(|dir| dir.join("modforge"))
        .unwrap_or_else(|| cwd.join(".modforge").join("cache"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::defaults(Utf8Path::new("/work"));
        assert_eq!(settings.registry_url, DEFAULT_REGISTRY);
        assert_eq!(settings.module_dir, Utf8PathBuf::from("/work/modules"));
        assert!(settings.cache_dir.ends_with("modforge") || settings.cache_dir.ends_with("cache"));
        settings.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = Settings::defaults(Utf8Path::new("/work"));
        settings.registry_url = "ftp://forge".to_string();
        assert!(matches!(
            settings.validate(),
            Err(ForgeError::ConfigValidation { ref field, .. }) if field == "registry.url"
        ));

        let mut settings = Settings::defaults(Utf8Path::new("/work"));
        settings.timeout_secs = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::defaults(Utf8Path::new("/work"));
        settings.max_retries = 11;
        assert!(settings.validate().is_err());
    }
}
