//! Argument types and CLI definitions for version commands.
//!
//! This module contains the clap-derived argument types used for parsing
//! command-line arguments.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use pdkup::family::Family;

/// Scope options shared by every command: which family, which root.
#[derive(Debug, Clone, Args)]
pub struct ScopeArgs {
    /// The PDK family to operate on
    #[arg(long, env = "PDK_FAMILY", default_value = "sky130")]
    pub pdk: String,

    /// Path to the PDK root (default: PDK_ROOT env var, then ~/.pdkup)
    #[arg(long)]
    pub pdk_root: Option<PathBuf>,
}

/// Version management subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// List installed versions
    Ls {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Show paths and on-disk sizes
        #[arg(long, short)]
        verbose: bool,
    },

    /// List versions available from the remote archive service
    LsRemote {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Download a version if needed and make it active
    Enable {
        /// Version token; resolved from the project's tool metadata when
        /// omitted
        token: Option<String>,

        /// Expected SHA-256 of the downloaded archive
        #[arg(long)]
        sha256: Option<String>,

        /// Explicit tool-metadata file for version resolution
        #[arg(short = 'f', long)]
        metadata_file: Option<PathBuf>,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Deactivate the currently active version
    Disable {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Print the active version token
    Current {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Print the on-disk path of a version (the active one by default)
    Path {
        /// Version token; the active version when omitted
        token: Option<String>,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Remove an installed version
    Rm {
        /// Version token to remove
        token: String,

        /// Remove without confirmation
        #[arg(long, short)]
        force: bool,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Remove all installed versions except the active one
    Prune {
        /// Prune without confirmation
        #[arg(long, short)]
        yes: bool,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Build a version from source with the external containerized builder
    Build {
        /// Version token; resolved from the project's tool metadata when
        /// omitted
        token: Option<String>,

        /// Activate the version after a successful build
        #[arg(long)]
        enable: bool,

        /// Container tool used to run the build
        #[arg(long, default_value = "docker")]
        tool: String,

        /// Build image override
        #[arg(long)]
        image: Option<String>,

        /// Number of parallel build jobs
        #[arg(short, long, default_value_t = 1)]
        jobs: usize,

        /// Explicit tool-metadata file for version resolution
        #[arg(short = 'f', long)]
        metadata_file: Option<PathBuf>,

        #[command(flatten)]
        scope: ScopeArgs,
    },
}

// ============================================================================
// Handler Argument Structs
// ============================================================================

/// Arguments for the ls command.
pub struct ListArgs {
    pub family: &'static Family,
    pub pdk_root: PathBuf,
    pub verbose: bool,
}

/// Arguments for the ls-remote command.
pub struct ListRemoteArgs {
    pub family: &'static Family,
    pub pdk_root: PathBuf,
}

/// Arguments for the enable command.
pub struct EnableArgs {
    pub family: &'static Family,
    pub pdk_root: PathBuf,
    pub token: Option<String>,
    pub sha256: Option<String>,
    pub metadata_file: Option<PathBuf>,
}

/// Arguments for the disable command.
pub struct DisableArgs {
    pub family: &'static Family,
    pub pdk_root: PathBuf,
}

/// Arguments for the current command.
pub struct CurrentArgs {
    pub family: &'static Family,
    pub pdk_root: PathBuf,
}

/// Arguments for the path command.
pub struct PathArgs {
    pub family: &'static Family,
    pub pdk_root: PathBuf,
    pub token: Option<String>,
}

/// Arguments for the rm command.
pub struct RemoveArgs {
    pub family: &'static Family,
    pub pdk_root: PathBuf,
    pub token: String,
    pub force: bool,
}

/// Arguments for the prune command.
pub struct PruneArgs {
    pub family: &'static Family,
    pub pdk_root: PathBuf,
    pub yes: bool,
}

/// Arguments for the build command.
pub struct BuildArgs {
    pub family: &'static Family,
    pub pdk_root: PathBuf,
    pub token: Option<String>,
    pub enable: bool,
    pub tool: String,
    pub image: Option<String>,
    pub jobs: usize,
    pub metadata_file: Option<PathBuf>,
}
