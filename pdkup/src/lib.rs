//! pdkup - version manager for prebuilt PDK archives
//!
//! This library provides the core functionality for managing installed
//! process-design-kit versions: a per-family version store, atomic
//! activation, safe archive extraction, and version resolution from
//! project metadata.
//!
//! # High-Level API
//!
//! ```ignore
//! use pdkup::family::Family;
//! use pdkup::store::{HttpReleaseClient, Installer, PdkRoot, VersionStore};
//!
//! let store = VersionStore::new(PdkRoot::resolve(None));
//! let client = HttpReleaseClient::new();
//! let family = Family::by_name("sky130").unwrap();
//!
//! // Download the version if missing, then make it active.
//! Installer::new(&client, &store).ensure_active(family, "abc123", None, None)?;
//! ```

pub mod family;
pub mod logging;
pub mod store;

/// Version of the pdkup library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
