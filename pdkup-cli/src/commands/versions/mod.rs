//! Version management CLI commands.
//!
//! This module implements the Command Pattern with trait-based dependency
//! injection, providing a clean separation of concerns:
//!
//! - `traits`: Core interfaces (`Output`, `VersionService`, `CommandHandler`)
//! - `services`: Concrete implementations of the traits
//! - `args`: CLI argument types and parsing (clap-derived)
//! - `handlers`: Command handlers implementing business logic
//!
//! Each command handler implements the `CommandHandler` trait, depends
//! only on trait interfaces via `CommandContext`, and can be tested in
//! isolation with mock implementations.

mod args;
mod handlers;
mod services;
mod traits;

pub use args::{Commands, ScopeArgs};
pub use handlers::{
    BuildHandler, CurrentHandler, DisableHandler, EnableHandler, ListHandler, ListRemoteHandler,
    PathHandler, PruneHandler, RemoveHandler,
};
pub use services::{ConsoleInteraction, ConsoleOutput, DefaultVersionService};
pub use traits::CommandHandler;

use std::path::PathBuf;

use pdkup::family::Family;
use pdkup::store::PdkRoot;

use args::{
    BuildArgs, CurrentArgs, DisableArgs, EnableArgs, ListArgs, ListRemoteArgs, PathArgs,
    PruneArgs, RemoveArgs,
};
use traits::CommandContext;

use crate::error::CliError;

/// Resolve the scope options into a family and a root path.
fn resolve_scope(scope: &ScopeArgs) -> Result<(&'static Family, PathBuf), CliError> {
    let family = Family::by_name(&scope.pdk)
        .ok_or_else(|| CliError::UnknownFamily(scope.pdk.clone()))?;
    let root = PdkRoot::resolve(scope.pdk_root.clone());
    Ok((family, root.path().to_path_buf()))
}

/// Dispatch a parsed subcommand to its handler.
pub fn handle(command: Commands) -> Result<(), CliError> {
    let output = ConsoleOutput::new();
    let service = DefaultVersionService::new();
    let interaction = ConsoleInteraction::new();
    let ctx = CommandContext::new(&output, &service, &interaction);

    match command {
        Commands::Ls { scope, verbose } => {
            let (family, pdk_root) = resolve_scope(&scope)?;
            ListHandler::execute(
                ListArgs {
                    family,
                    pdk_root,
                    verbose,
                },
                &ctx,
            )
        }
        Commands::LsRemote { scope } => {
            let (family, pdk_root) = resolve_scope(&scope)?;
            ListRemoteHandler::execute(ListRemoteArgs { family, pdk_root }, &ctx)
        }
        Commands::Enable {
            token,
            sha256,
            metadata_file,
            scope,
        } => {
            let (family, pdk_root) = resolve_scope(&scope)?;
            EnableHandler::execute(
                EnableArgs {
                    family,
                    pdk_root,
                    token,
                    sha256,
                    metadata_file,
                },
                &ctx,
            )
        }
        Commands::Disable { scope } => {
            let (family, pdk_root) = resolve_scope(&scope)?;
            DisableHandler::execute(DisableArgs { family, pdk_root }, &ctx)
        }
        Commands::Current { scope } => {
            let (family, pdk_root) = resolve_scope(&scope)?;
            CurrentHandler::execute(CurrentArgs { family, pdk_root }, &ctx)
        }
        Commands::Path { token, scope } => {
            let (family, pdk_root) = resolve_scope(&scope)?;
            PathHandler::execute(
                PathArgs {
                    family,
                    pdk_root,
                    token,
                },
                &ctx,
            )
        }
        Commands::Rm {
            token,
            force,
            scope,
        } => {
            let (family, pdk_root) = resolve_scope(&scope)?;
            RemoveHandler::execute(
                RemoveArgs {
                    family,
                    pdk_root,
                    token,
                    force,
                },
                &ctx,
            )
        }
        Commands::Prune { yes, scope } => {
            let (family, pdk_root) = resolve_scope(&scope)?;
            PruneHandler::execute(
                PruneArgs {
                    family,
                    pdk_root,
                    yes,
                },
                &ctx,
            )
        }
        Commands::Build {
            token,
            enable,
            tool,
            image,
            jobs,
            metadata_file,
            scope,
        } => {
            let (family, pdk_root) = resolve_scope(&scope)?;
            BuildHandler::execute(
                BuildArgs {
                    family,
                    pdk_root,
                    token,
                    enable,
                    tool,
                    image,
                    jobs,
                    metadata_file,
                },
                &ctx,
            )
        }
    }
}
