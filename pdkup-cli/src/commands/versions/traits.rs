//! Core traits for the version command handler pattern.
//!
//! This module defines the interfaces that handlers depend on, enabling
//! dependency injection and testability.

use std::io::Write;
use std::path::Path;

use pdkup::family::Family;
use pdkup::store::{
    BuildConfig, FetchProgress, InstalledVersion, StoreResult, VersionDescriptor, VersionStore,
};

use crate::error::CliError;

// ============================================================================
// Output Trait - Abstracts console output
// ============================================================================

/// Trait for outputting messages to the user.
///
/// This abstraction allows handlers to produce output without depending on
/// `println!` directly, making them testable.
pub trait Output {
    /// Print a line of text.
    fn println(&self, message: &str);

    /// Print text without a newline.
    fn print(&self, message: &str);

    /// Print an empty line.
    fn newline(&self) {
        self.println("");
    }

    /// Print an indented line.
    fn indented(&self, message: &str) {
        self.println(&format!("  {}", message));
    }

    /// Print a warning message.
    fn warning(&self, message: &str) {
        self.println(&format!("Warning: {}", message));
    }

    /// Print an error message.
    fn error(&self, message: &str) {
        self.println(&format!("Error: {}", message));
    }

    /// Print a success message.
    fn success(&self, message: &str) {
        self.println(&format!("Success: {}", message));
    }

    /// Build a transfer progress callback.
    ///
    /// The default writes an in-place byte counter to stderr, keeping
    /// stdout clean for command output.
    fn create_progress_callback(&self) -> FetchProgress {
        Box::new(|bytes, total| {
            match total {
                Some(total) if total > 0 => {
                    eprint!("\rDownloading... {} / {} bytes", bytes, total);
                }
                _ => {
                    eprint!("\rDownloading... {} bytes", bytes);
                }
            }
            std::io::stderr().flush().ok();
        })
    }

    /// Finish a progress line started by the callback.
    fn progress_done(&self) {
        eprintln!();
    }
}

// ============================================================================
// Version Service Trait
// ============================================================================

/// Trait for version store operations.
///
/// Abstracts the library entry points so handlers can be exercised against
/// mocks in tests.
pub trait VersionService {
    /// Create a version store rooted at the given directory.
    fn create_store(&self, pdk_root: &Path) -> VersionStore;

    /// List versions available from the remote archive service.
    fn list_remote(&self, family: &Family) -> StoreResult<Vec<VersionDescriptor>>;

    /// Ensure a version is installed, without touching the active pointer.
    fn install(
        &self,
        store: &VersionStore,
        family: &Family,
        token: &str,
        expected_digest: Option<&str>,
        on_progress: Option<FetchProgress>,
    ) -> StoreResult<()>;

    /// Ensure a version is installed and make it active.
    fn install_and_activate(
        &self,
        store: &VersionStore,
        family: &Family,
        token: &str,
        expected_digest: Option<&str>,
        on_progress: Option<FetchProgress>,
    ) -> StoreResult<()>;

    /// Activate an already-installed version.
    fn activate(&self, store: &VersionStore, family: &Family, token: &str) -> StoreResult<()>;

    /// Deactivate the family's active version, if any.
    fn deactivate(&self, store: &VersionStore, family: &Family) -> StoreResult<()>;

    /// Remove an installed version.
    fn remove(&self, store: &VersionStore, family: &Family, token: &str) -> StoreResult<()>;

    /// List installed versions.
    fn list_installed(
        &self,
        store: &VersionStore,
        family: &Family,
    ) -> StoreResult<Vec<InstalledVersion>>;

    /// Run the external builder and install its output archive.
    fn build_and_install(
        &self,
        store: &VersionStore,
        family: &Family,
        token: &str,
        config: BuildConfig,
    ) -> StoreResult<()>;
}

// ============================================================================
// User Interaction Trait
// ============================================================================

/// Trait for user interaction (prompts, confirmation).
pub trait UserInteraction {
    /// Prompt for yes/no confirmation.
    fn confirm(&self, message: &str) -> bool;
}

// ============================================================================
// Command Context - Bundles dependencies for handlers
// ============================================================================

/// Context providing dependencies to command handlers.
///
/// In production this carries the real implementations; tests substitute
/// mocks.
pub struct CommandContext<'a> {
    /// Output interface for user messages.
    pub output: &'a dyn Output,

    /// Version service for store operations.
    pub service: &'a dyn VersionService,

    /// User interaction for prompts.
    pub interaction: &'a dyn UserInteraction,
}

impl<'a> CommandContext<'a> {
    /// Create a new command context.
    pub fn new(
        output: &'a dyn Output,
        service: &'a dyn VersionService,
        interaction: &'a dyn UserInteraction,
    ) -> Self {
        Self {
            output,
            service,
            interaction,
        }
    }
}

// ============================================================================
// Command Handler Trait
// ============================================================================

/// Trait for command handlers.
///
/// Each subcommand has a handler that implements this trait. Handlers
/// receive their arguments and a context providing dependencies.
pub trait CommandHandler {
    /// The arguments type for this handler.
    type Args;

    /// Execute the command with the given arguments and context.
    fn execute(args: Self::Args, ctx: &CommandContext<'_>) -> Result<(), CliError>;
}
