//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and a distinct non-zero exit code per failure class.

use std::fmt;
use std::process;

use pdkup::store::StoreError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Unknown PDK family name
    UnknownFamily(String),
    /// No version is currently active for the family
    NoActiveVersion(String),
    /// Store or collaborator failure
    Store(StoreError),
}

impl CliError {
    /// Exit code for this error. Each failure class maps to its own code
    /// so scripts can distinguish them.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::LoggingInit(_) => 1,
            CliError::UnknownFamily(_) => 2,
            CliError::NoActiveVersion(_) => 3,
            CliError::Store(e) => match e {
                StoreError::NotInstalled { .. } => 4,
                StoreError::AlreadyInstalled { .. } => 5,
                StoreError::CannotRemoveActive { .. } => 6,
                StoreError::VersionNotAvailable { .. } => 7,
                StoreError::TransferInterrupted { .. } => 8,
                StoreError::DigestMismatch { .. } => 9,
                StoreError::PathTraversalRejected { .. } => 10,
                StoreError::NoVersionDeclared { .. } => 11,
                StoreError::NoDeclarationFound { .. } => 12,
                StoreError::BuildFailed { .. } => 13,
                StoreError::RemoteRequestFailed { .. } => 14,
                StoreError::DeclarationParseFailed { .. } => 15,
                StoreError::StorageIo { .. } => 16,
            },
        }
    }

    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::UnknownFamily(_) => {
                eprintln!();
                eprintln!("Known PDK families:");
                for family in pdkup::family::Family::all() {
                    eprintln!("  {}", family.name);
                }
            }
            CliError::Store(StoreError::NoDeclarationFound { .. }) => {
                eprintln!();
                eprintln!("Pass a version explicitly, or run from a project directory");
                eprintln!("with a tool_metadata.yml declaring one.");
            }
            CliError::Store(StoreError::CannotRemoveActive { .. }) => {
                eprintln!();
                eprintln!("Run 'pdkup disable' first if you really want to remove it.");
            }
            _ => {}
        }

        process::exit(self.exit_code())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::UnknownFamily(name) => write!(f, "Unknown PDK family '{}'", name),
            CliError::NoActiveVersion(family) => {
                write!(f, "No version is active for the {} PDK", family)
            }
            CliError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}
