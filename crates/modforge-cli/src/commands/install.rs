//! `modforge install` command implementation.
//!
//! Layers the configuration, builds the registry client and tarball
//! unpacker, runs the installer and renders its result.

use std::time::Duration;

use anyhow::Context;

use modforge_cache::TarballUnpacker;
use modforge_config::{ConfigLayering, ConfigLoader, Settings};
use modforge_core::error::ForgeError;
use modforge_core::types::{InstallOptions, VersionReq};
use modforge_installer::{InstallResult, Installer};
use modforge_registry::{RegistryClient, RetryConfig};

use super::CommandContext;
use crate::output::tree::render_tree;
use crate::InstallArgs;

/// Execute the `modforge install` command
pub async fn execute(args: InstallArgs, ctx: &CommandContext) -> anyhow::Result<bool> {
    let settings = load_settings(&args, ctx).await?;
    let options = build_options(&args, &settings)?;

    let retry = RetryConfig {
        max_retries: settings.max_retries,
        ..RetryConfig::default()
    };
    let client = RegistryClient::with_config(
        &settings.registry_url,
        settings.cache_dir.as_std_path(),
        retry,
        Duration::from_secs(settings.timeout_secs),
    )?;

    let installer = Installer::new(client, TarballUnpacker::new());
    let result = installer.run(&args.name, &options).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        report(&result, &options, ctx);
    }

    Ok(result.is_success())
}

async fn load_settings(args: &InstallArgs, ctx: &CommandContext) -> anyhow::Result<Settings> {
    ConfigLoader::new(ctx.cwd.clone())
        .with_env(ConfigLayering::collect_env_overrides())
        .with_cli_overrides(ctx.cli_overrides(args.dir.as_deref()))
        .load()
        .await
        .context("Failed to load configuration")
}

/// Install options for the parsed flags and layered settings
pub fn build_options(
    args: &InstallArgs,
    settings: &Settings,
) -> Result<InstallOptions, ForgeError> {
    let mut options = InstallOptions::new(settings.module_dir.as_std_path())
        .force(args.force)
        .ignore_dependencies(args.ignore_dependencies);

    if let Some(raw) = &args.version {
        let constraint = VersionReq::parse(raw).map_err(|e| ForgeError::InvalidConstraint {
            input: raw.clone(),
            reason: e.to_string(),
        })?;
        options = options.with_version(constraint);
    }
    Ok(options)
}

fn report(result: &InstallResult, options: &InstallOptions, ctx: &CommandContext) {
    match result {
        InstallResult::Success { installed_modules } => {
            ctx.output.success("Installed modules");
            print!(
                "{}",
                render_tree(options.target_dir(), installed_modules, ctx.output.colors())
            );
        },
        InstallResult::Failure { error } => {
            ctx.output.error(&error.multiline);
        },
    }
}
