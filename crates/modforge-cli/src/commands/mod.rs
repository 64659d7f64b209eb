//! Command implementations and dispatch logic.

use std::collections::HashMap;

use anyhow::Context;
use camino::Utf8PathBuf;
use tracing::info;

pub mod install;


use crate::output::OutputHandler;
use crate::Commands;

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    pub output: OutputHandler,
    /// `--registry` override
    pub registry: Option<String>,
}

impl CommandContext {
    /// Create a context for the current directory
    pub fn new(registry: Option<String>) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        let cwd = Utf8PathBuf::try_from(cwd).context("Current directory is not valid UTF-8")?;

        Ok(Self {
            cwd,
            output: OutputHandler::new(),
            registry,
        })
    }

    /// Configuration overrides given on the command line
    pub fn cli_overrides(&self, dir: Option<&str>) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(registry) = &self.registry {
            overrides.insert("registry".to_string(), registry.clone());
        }
        if let Some(dir) = dir {
            overrides.insert("dir".to_string(), dir.to_string());
        }
        overrides
    }
}

/// Dispatch a command to its handler; `Ok(false)` is a reported failure
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> anyhow::Result<bool> {
    match command {
        Commands::Install(args) => {
            info!("Installing {}", args.name);
            install::execute(args, ctx).await
        },
    }
}
