//! Error types for the version store and its collaborators.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while managing the version store.
///
/// Every variant is terminal for the current command invocation; the store
/// never retries internally. Local recovery is limited to removing
/// temporary artifacts so a failed operation leaves no half-written version
/// directory or pointer visible.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested version is not installed locally.
    #[error("version {token} of the {family} PDK is not installed")]
    NotInstalled { family: String, token: String },

    /// A directory already exists at the final version path.
    #[error("version {token} of the {family} PDK is already installed at {path}")]
    AlreadyInstalled {
        family: String,
        token: String,
        path: PathBuf,
    },

    /// The version targeted for removal is currently active.
    #[error("version {token} is the active version for the {family} PDK; disable it first")]
    CannotRemoveActive { family: String, token: String },

    /// The remote archive service has no archive for this version.
    #[error("version {token} of the {family} PDK is not available remotely")]
    VersionNotAvailable { family: String, token: String },

    /// The archive byte stream ended early or failed mid-transfer.
    #[error("transfer of {token} ({family}) interrupted: {reason}")]
    TransferInterrupted {
        family: String,
        token: String,
        reason: String,
    },

    /// The streamed archive's digest does not match the expected one.
    #[error("digest mismatch for {token} ({family}): expected {expected}, got {actual}")]
    DigestMismatch {
        family: String,
        token: String,
        expected: String,
        actual: String,
    },

    /// An archive entry would extract outside the destination directory.
    #[error("archive entry {entry:?} escapes the extraction root")]
    PathTraversalRejected { entry: PathBuf },

    /// A metadata file was found but declares no version for this family.
    #[error("no version declared for {tool} in {path}")]
    NoVersionDeclared { tool: String, path: PathBuf },

    /// No tool-metadata file exists in the lookup path.
    #[error("no tool-metadata file found under {project_dir}")]
    NoDeclarationFound { project_dir: PathBuf },

    /// The external builder reported failure; surfaced opaquely.
    #[error("build of {token} ({family}) failed: {reason}")]
    BuildFailed {
        family: String,
        token: String,
        reason: String,
    },

    /// Remote listing or download failed for a reason other than not-found.
    #[error("remote request to {url} failed: {reason}")]
    RemoteRequestFailed { url: String, reason: String },

    /// The tool-metadata file exists but could not be parsed.
    #[error("failed to parse {path}: {reason}")]
    DeclarationParseFailed { path: PathBuf, reason: String },

    /// Generic storage I/O failure with path context.
    #[error("storage I/O failure at {path}: {source}")]
    StorageIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    /// Attach path context to a raw I/O error.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::StorageIo {
            path: path.into(),
            source,
        }
    }
}
