//! Configuration layering and environment overrides

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use modforge_core::error::ForgeError;

use crate::settings::Settings;
use crate::toml::ConfigFile;
use crate::ConfigResult;

/// Project configuration file name
pub const PROJECT_CONFIG: &str = "modforge.toml";

/// Environment variable prefix
const ENV_PREFIX: &str = "MODFORGE_";

/// Main configuration loading interface
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
    /// Global config location; `None` disables the global layer
    global_path: Option<Utf8PathBuf>,
    env_overrides: HashMap<String, String>,
    cli_overrides: HashMap<String, String>,
}

/// Configuration source tracking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in defaults
    Defaults,
    /// Global config file
    Global(Utf8PathBuf),
    /// Project modforge.toml
    Project(Utf8PathBuf),
    /// Environment variable
    Environment(String),
    /// CLI flag
    CommandLine,
}

impl ConfigLoader {
    /// Loader for `cwd` using the default global config location
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self {
            cwd,
            global_path: Self::global_config_path(),
            env_overrides: HashMap::new(),
            cli_overrides: HashMap::new(),
        }
    }

    pub fn with_global_path(mut self, path: Option<Utf8PathBuf>) -> Self {
        self.global_path = path;
        self
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env_overrides = env;
        self
    }

    /// Overrides keyed by `registry`, `dir` and `cache_dir`
    pub fn with_cli_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.cli_overrides = overrides;
        self
    }

    /// Find configuration file in project (walks up directory tree)
    pub fn resolve_config_path(&self, filename: &str) -> Option<Utf8PathBuf> {
        self.cwd
            .ancestors()
            .map(|dir| dir.join(filename))
            .find(|path| path.exists())
    }

    /// `~/.modforge/config.toml`
    pub fn global_config_path() -> Option<Utf8PathBuf> {
        let home = dirs::home_dir()?;
        let home = Utf8PathBuf::try_from(home).ok()?;
        Some(home.join(".modforge").join("config.toml"))
    }

    /// Layer every source into validated settings
    pub async fn load(&self) -> ConfigResult<Settings> {
        let (settings, sources) = self.load_with_sources().await?;
        debug!(?sources, "configuration loaded");
        Ok(settings)
    }

    /// Layer every source, reporting which ones contributed
    pub async fn load_with_sources(&self) -> ConfigResult<(Settings, Vec<ConfigSource>)> {
        let mut layering = ConfigLayering::new(&self.cwd);

        if let Some(global) = self.global_path.as_ref().filter(|path| path.exists()) {
            let config = crate::toml::load_from_file(global).await?;
            layering.apply_file(&config, global);
        }

        if let Some(project) = self.resolve_config_path(PROJECT_CONFIG) {
            let config = crate::toml::load_from_file(&project).await?;
            layering.apply_file(&config, &project);
        }

        layering.apply_env_overrides(&self.env_overrides)?;
        layering.apply_cli_overrides(&self.cli_overrides);

        layering.settings.validate()?;
        Ok(layering.finish())
    }
}

/// Settings being built up layer by layer
#[derive(Debug, Clone)]
pub struct ConfigLayering {
    settings: Settings,
    sources: Vec<ConfigSource>,
}

impl ConfigLayering {
    /// Start from the built-in defaults
    pub fn new(cwd: &Utf8Path) -> Self {
        Self {
            settings: Settings::defaults(cwd),
            sources: vec![ConfigSource::Defaults],
        }
    }

    /// Apply a config file; relative paths are resolved against its directory
    pub fn apply_file(&mut self, config: &ConfigFile, path: &Utf8Path) {
        let base = path.parent().unwrap_or(Utf8Path::new("."));
        let settings = &mut self.settings;

        if let Some(url) = &config.registry.url {
            settings.registry_url = url.clone();
        }
        if let Some(max_retries) = config.registry.max_retries {
            settings.max_retries = max_retries;
        }
        if let Some(timeout) = config.registry.timeout_secs {
            settings.timeout_secs = timeout;
        }
        if let Some(dir) = &config.paths.module_dir {
            settings.module_dir = base.join(dir);
        }
        if let Some(dir) = &config.paths.cache_dir {
            settings.cache_dir = base.join(dir);
        }

        let source = if path.file_name() == Some(PROJECT_CONFIG) {
            ConfigSource::Project(path.to_owned())
        } else {
            ConfigSource::Global(path.to_owned())
        };
        self.sources.push(source);
    }

    /// Apply `MODFORGE_*` environment variables
    pub fn apply_env_overrides(&mut self, overrides: &HashMap<String, String>) -> ConfigResult<()> {
        // Sorted so the recorded sources are stable
        let mut keys: Vec<&String> = overrides.keys().collect();
        keys.sort();

        for key in keys {
            let value = &overrides[key];
            match key.as_str() {
                "MODFORGE_REGISTRY" => self.settings.registry_url = value.clone(),
                "MODFORGE_MODULE_DIR" => self.settings.module_dir = Utf8PathBuf::from(value),
                "MODFORGE_CACHE_DIR" => self.settings.cache_dir = Utf8PathBuf::from(value),
                "MODFORGE_MAX_RETRIES" => {
                    self.settings.max_retries =
                        value.parse().map_err(|_| ForgeError::ConfigValidation {
                            field: key.clone(),
                            reason: format!("'{}' is not a number", value),
                        })?;
                },
                _ => continue,
            }
            self.sources.push(ConfigSource::Environment(key.clone()));
        }

        Ok(())
    }

    /// Apply command-line flags (highest priority)
    pub fn apply_cli_overrides(&mut self, overrides: &HashMap<String, String>) {
        let mut applied = false;
        for (key, value) in overrides {
            match key.as_str() {
                "registry" => self.settings.registry_url = value.clone(),
                "dir" => self.settings.module_dir = Utf8PathBuf::from(value),
                "cache_dir" => self.settings.cache_dir = Utf8PathBuf::from(value),
                _ => continue,
            }
            applied = true;
        }
        if applied {
            self.sources.push(ConfigSource::CommandLine);
        }
    }

    /// Collect `MODFORGE_*` variables from the process environment
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn finish(self) -> (Settings, Vec<ConfigSource>) {
        (self.settings, self.sources)
    }
}
