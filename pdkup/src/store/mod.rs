//! Version store and activation manager for prebuilt PDK archives.
//!
//! # Overview
//!
//! The store handles:
//! - Enumerating locally installed versions per PDK family
//! - Downloading and safely extracting version archives
//! - Atomically switching the per-family active version
//! - Resolving a requested version from a project's declared metadata
//!
//! # Architecture
//!
//! Trait seams keep the collaborators swappable and testable:
//!
//! - [`ReleaseClient`] - lists and fetches remote version archives
//! - [`Builder`] - produces an archive from source (external tool)
//!
//! On-disk state lives under a single [`PdkRoot`]; the two mutating
//! operations on shared state (extraction and pointer switch) both commit
//! through a single atomic rename, which is the only cross-process
//! synchronization this store relies on.

mod activation;
mod builder;
mod codec;
mod error;
mod installer;
mod layout;
mod local;
mod remote;
mod resolver;

pub use activation::{disable, enable};
pub use builder::{BuildConfig, Builder, ContainerBuilder};
pub use codec::{materialize, Compression};
pub use error::{StoreError, StoreResult};
pub use installer::{install_from_archive, FetchProgress, Installer};
pub use layout::{PdkRoot, PDK_ROOT_ENV, TEMP_PREFIX};
pub use local::{dir_size, sort_versions, InstalledVersion, VersionStore, STALE_TEMP_GRACE};
pub use remote::{ArchiveStream, HttpReleaseClient, ReleaseClient, ReleaseRepo, VersionDescriptor};
pub use resolver::{order_for_display, resolve_requested, DisplayVersion};
