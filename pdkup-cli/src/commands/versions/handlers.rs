//! Command handlers for version CLI commands.
//!
//! Each handler implements the `CommandHandler` trait and contains the
//! business logic for its respective command.

use std::collections::HashSet;
use std::env;

use pdkup::store::{
    dir_size, order_for_display, resolve_requested, sort_versions, BuildConfig, StoreError,
};

use super::args::{
    BuildArgs, CurrentArgs, DisableArgs, EnableArgs, ListArgs, ListRemoteArgs, PathArgs,
    PruneArgs, RemoveArgs,
};
use super::traits::{CommandContext, CommandHandler};
use crate::error::CliError;

/// Day precision is enough for humans picking a version.
fn format_day(date: &chrono::DateTime<chrono::Utc>) -> String {
    date.format("%Y.%m.%d").to_string()
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

// ============================================================================
// Ls Handler
// ============================================================================

/// Handler for the `ls` command.
pub struct ListHandler;

impl CommandHandler for ListHandler {
    type Args = ListArgs;

    fn execute(args: Self::Args, ctx: &CommandContext<'_>) -> Result<(), CliError> {
        let store = ctx.service.create_store(&args.pdk_root);
        let mut versions = ctx.service.list_installed(&store, args.family)?;

        if versions.is_empty() {
            ctx.output.println("No versions installed.");
            ctx.output.newline();
            ctx.output
                .println("Use 'pdkup enable' to install and activate one.");
            return Ok(());
        }

        // Dates come from the remote listing; without a connection the
        // list still prints, just undated.
        match ctx.service.list_remote(args.family) {
            Ok(descriptors) => {
                for version in versions.iter_mut() {
                    version.date = descriptors
                        .iter()
                        .find(|d| d.token == version.token)
                        .and_then(|d| d.commit_date);
                }
                sort_versions(&mut versions);
            }
            Err(e) => {
                tracing::debug!(error = %e, "remote listing unavailable");
                ctx.output
                    .warning("Could not reach the remote archive service; date information unavailable.");
            }
        }

        let active = store.get_active(args.family)?.map(|v| v.token);

        ctx.output.println(&format!(
            "In {}:",
            store.root().versions_dir(args.family).display()
        ));
        for version in &versions {
            let mut desc = version.token.clone();
            if let Some(date) = &version.date {
                desc.push_str(&format!(" ({})", format_day(date)));
            }
            if active.as_deref() == Some(version.token.as_str()) {
                desc.push_str(" (enabled)");
            }
            ctx.output.indented(&desc);

            if args.verbose {
                ctx.output
                    .indented(&format!("  Path: {}", version.path.display()));
                let size = dir_size(&version.path).unwrap_or(0);
                ctx.output.indented(&format!("  Size: {}", format_size(size)));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Ls-Remote Handler
// ============================================================================

/// Handler for the `ls-remote` command.
pub struct ListRemoteHandler;

impl CommandHandler for ListRemoteHandler {
    type Args = ListRemoteArgs;

    fn execute(args: Self::Args, ctx: &CommandContext<'_>) -> Result<(), CliError> {
        let store = ctx.service.create_store(&args.pdk_root);
        let descriptors = ctx.service.list_remote(args.family)?;

        if descriptors.is_empty() {
            ctx.output.println(&format!(
                "No prebuilt versions available for the {} PDK.",
                args.family
            ));
            return Ok(());
        }

        let installed: HashSet<String> = ctx
            .service
            .list_installed(&store, args.family)?
            .into_iter()
            .map(|v| v.token)
            .collect();
        let active = store.get_active(args.family)?.map(|v| v.token);

        ctx.output.println(&format!(
            "Pre-built {} PDK versions:",
            args.family
        ));
        for entry in order_for_display(descriptors, &installed, active.as_deref()) {
            let mut desc = String::new();
            if entry.descriptor.prerelease {
                desc.push_str("PRE-RELEASE ");
            }
            desc.push_str(&entry.descriptor.token);
            if let Some(date) = &entry.descriptor.commit_date {
                desc.push_str(&format!(" ({})", format_day(date)));
            }
            if entry.active {
                desc.push_str(" (enabled)");
            } else if entry.installed {
                desc.push_str(" (installed)");
            }
            ctx.output.indented(&desc);
        }

        Ok(())
    }
}

// ============================================================================
// Enable Handler
// ============================================================================

/// Handler for the `enable` command.
pub struct EnableHandler;

impl CommandHandler for EnableHandler {
    type Args = EnableArgs;

    fn execute(args: Self::Args, ctx: &CommandContext<'_>) -> Result<(), CliError> {
        let project_dir =
            env::current_dir().map_err(|e| CliError::Store(StoreError::io(".", e)))?;
        let token = resolve_requested(
            args.family,
            args.token.as_deref(),
            &project_dir,
            args.metadata_file.as_deref(),
        )?;

        let store = ctx.service.create_store(&args.pdk_root);
        let on_progress = ctx.output.create_progress_callback();
        let result = ctx.service.install_and_activate(
            &store,
            args.family,
            &token,
            args.sha256.as_deref(),
            Some(on_progress),
        );
        ctx.output.progress_done();
        result?;

        ctx.output.success(&format!(
            "Version {} enabled for the {} PDK.",
            token, args.family
        ));
        Ok(())
    }
}

// ============================================================================
// Disable Handler
// ============================================================================

/// Handler for the `disable` command.
pub struct DisableHandler;

impl CommandHandler for DisableHandler {
    type Args = DisableArgs;

    fn execute(args: Self::Args, ctx: &CommandContext<'_>) -> Result<(), CliError> {
        let store = ctx.service.create_store(&args.pdk_root);
        let previous = store.get_active(args.family)?;

        ctx.service.deactivate(&store, args.family)?;

        match previous {
            Some(version) => {
                ctx.output.success(&format!(
                    "Version {} disabled for the {} PDK.",
                    version.token, args.family
                ));
            }
            None => {
                ctx.output.println(&format!(
                    "No version was active for the {} PDK.",
                    args.family
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Current Handler
// ============================================================================

/// Handler for the `current` command.
pub struct CurrentHandler;

impl CommandHandler for CurrentHandler {
    type Args = CurrentArgs;

    fn execute(args: Self::Args, ctx: &CommandContext<'_>) -> Result<(), CliError> {
        let store = ctx.service.create_store(&args.pdk_root);
        match store.get_active(args.family)? {
            Some(version) => {
                ctx.output.println(&version.token);
                Ok(())
            }
            None => Err(CliError::NoActiveVersion(args.family.name.to_string())),
        }
    }
}

// ============================================================================
// Path Handler
// ============================================================================

/// Handler for the `path` command.
pub struct PathHandler;

impl CommandHandler for PathHandler {
    type Args = PathArgs;

    fn execute(args: Self::Args, ctx: &CommandContext<'_>) -> Result<(), CliError> {
        let store = ctx.service.create_store(&args.pdk_root);

        let token = match args.token {
            Some(token) => token,
            None => store
                .get_active(args.family)?
                .map(|v| v.token)
                .ok_or_else(|| CliError::NoActiveVersion(args.family.name.to_string()))?,
        };

        let path = store.installed_path(args.family, &token)?;
        ctx.output.println(&path.display().to_string());
        Ok(())
    }
}

// ============================================================================
// Rm Handler
// ============================================================================

/// Handler for the `rm` command.
pub struct RemoveHandler;

impl CommandHandler for RemoveHandler {
    type Args = RemoveArgs;

    fn execute(args: Self::Args, ctx: &CommandContext<'_>) -> Result<(), CliError> {
        let store = ctx.service.create_store(&args.pdk_root);
        let path = store.installed_path(args.family, &args.token)?;

        ctx.output
            .println(&format!("Version: {} ({})", args.token, args.family));
        ctx.output.println(&format!("Path: {}", path.display()));
        ctx.output.newline();

        if !args.force
            && !ctx
                .interaction
                .confirm("Are you sure you want to remove this version?")
        {
            ctx.output.println("Removal cancelled.");
            return Ok(());
        }

        ctx.service.remove(&store, args.family, &args.token)?;
        ctx.output
            .success(&format!("Removed {} ({}).", args.token, args.family));
        Ok(())
    }
}

// ============================================================================
// Prune Handler
// ============================================================================

/// Handler for the `prune` command.
pub struct PruneHandler;

impl CommandHandler for PruneHandler {
    type Args = PruneArgs;

    fn execute(args: Self::Args, ctx: &CommandContext<'_>) -> Result<(), CliError> {
        let store = ctx.service.create_store(&args.pdk_root);
        let active = store.get_active(args.family)?.map(|v| v.token);

        let candidates: Vec<String> = ctx
            .service
            .list_installed(&store, args.family)?
            .into_iter()
            .map(|v| v.token)
            .filter(|token| active.as_deref() != Some(token.as_str()))
            .collect();

        if candidates.is_empty() {
            ctx.output.println("Nothing to prune.");
            return Ok(());
        }

        ctx.output
            .println(&format!("{} version(s) to remove:", candidates.len()));
        for token in &candidates {
            ctx.output.indented(token);
        }
        ctx.output.newline();

        if !args.yes && !ctx.interaction.confirm("Proceed with prune?") {
            ctx.output.println("Prune cancelled.");
            return Ok(());
        }

        let mut removed = 0;
        let mut failed = 0;
        for token in &candidates {
            match ctx.service.remove(&store, args.family, token) {
                Ok(()) => removed += 1,
                Err(e) => {
                    ctx.output.error(&format!("Failed to remove {}: {}", token, e));
                    failed += 1;
                }
            }
        }

        ctx.output.newline();
        ctx.output.println(&format!(
            "Prune complete: {} removed, {} failed.",
            removed, failed
        ));
        Ok(())
    }
}

// ============================================================================
// Build Handler
// ============================================================================

/// Handler for the `build` command.
pub struct BuildHandler;

impl CommandHandler for BuildHandler {
    type Args = BuildArgs;

    fn execute(args: Self::Args, ctx: &CommandContext<'_>) -> Result<(), CliError> {
        let project_dir =
            env::current_dir().map_err(|e| CliError::Store(StoreError::io(".", e)))?;
        let token = resolve_requested(
            args.family,
            args.token.as_deref(),
            &project_dir,
            args.metadata_file.as_deref(),
        )?;

        let store = ctx.service.create_store(&args.pdk_root);

        let mut config = BuildConfig::new(store.root().family_dir(args.family).join("build"));
        config.tool = args.tool;
        config.jobs = args.jobs;
        if let Some(image) = args.image {
            config.image = image;
        }

        ctx.output.println(&format!(
            "Building {} version {} (this can take a while)...",
            args.family, token
        ));
        ctx.service
            .build_and_install(&store, args.family, &token, config)?;
        ctx.output
            .success(&format!("Built and installed {} ({}).", token, args.family));

        if args.enable {
            ctx.service.activate(&store, args.family, &token)?;
            ctx.output.success(&format!(
                "Version {} enabled for the {} PDK.",
                token, args.family
            ));
        }

        Ok(())
    }
}
