//! modforge.toml parsing

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use modforge_core::error::ForgeError;

use crate::ConfigResult;

/// One configuration file; every field is optional so files can be layered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub registry: RegistrySection,
    #[serde(default)]
    pub paths: PathsSection,
}

/// `[registry]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySection {
    /// Base URL of the forge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Retries of a failed registry request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    /// Per-request timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// `[paths]` section; relative paths are taken from the file's directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<String>,
}

/// Parse modforge.toml content
pub fn parse_config(content: &str) -> ConfigResult<ConfigFile> {
    ::toml::from_str(content).map_err(|e| {
        let (line, column) = e
            .span()
            .map(|span| line_column(content, span.start))
            .unwrap_or((0, 0));
        ForgeError::TomlParse {
            message: e.message().to_string(),
            line,
            column,
        }
    })
}

/// Serialize a configuration file
pub fn serialize_config(config: &ConfigFile) -> ConfigResult<String> {
    ::toml::to_string_pretty(config).map_err(|e| ForgeError::TomlParse {
        message: e.to_string(),
        line: 0,
        column: 0,
    })
}

/// Load and parse a configuration file
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<ConfigFile> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ForgeError::io(format!("Failed to read {}", path), e))?;

    parse_config(&content).map_err(|e| match e {
        ForgeError::TomlParse {
            message,
            line,
            column,
        } => ForgeError::TomlParse {
            message: format!("in {}: {}", path, message),
            line,
            column,
        },
        other => other,
    })
}

/// 1-based line and column of a byte offset
fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let before = &content[..offset.min(content.len())];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(before.chars().count(), |newline| before[newline + 1..].chars().count())
        + 1;
    (line, column)
}
