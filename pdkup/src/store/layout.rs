//! On-disk layout of the version store.
//!
//! All installed versions of all PDK families live under a single root:
//!
//! ```text
//! <PdkRoot>/<family>/versions/<token>/...   installed versions
//! <PdkRoot>/<family>/current               active pointer (symlink)
//! ```
//!
//! The root is resolved once per process and passed around as an explicit
//! handle; nothing in this crate reads the environment after construction.

use std::env;
use std::path::{Path, PathBuf};

use crate::family::Family;

/// Environment variable naming the store root.
pub const PDK_ROOT_ENV: &str = "PDK_ROOT";

/// Directory name under each family that holds installed versions.
const VERSIONS_DIR: &str = "versions";

/// File name of the per-family active pointer.
const ACTIVE_POINTER: &str = "current";

/// Name prefix reserved for in-flight extraction and pointer-swap
/// temporaries. Entries with this prefix are never enumerated as installed
/// versions and are subject to stale cleanup.
pub const TEMP_PREFIX: &str = ".tmp-";

/// Handle to the root directory that owns all installed PDK versions.
///
/// Resolution precedence: explicit path > `PDK_ROOT` environment variable >
/// `~/.pdkup`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdkRoot {
    path: PathBuf,
}

impl PdkRoot {
    /// Resolve the root, preferring `explicit` when given.
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        let path = explicit
            .or_else(|| env::var_os(PDK_ROOT_ENV).map(PathBuf::from))
            .unwrap_or_else(Self::default_path);
        Self { path }
    }

    /// The default root when neither a flag nor the environment names one.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pdkup")
    }

    /// Use an exact path, bypassing resolution. Intended for tests and
    /// embedders that manage their own configuration.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The root directory itself.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory owned by one family.
    pub fn family_dir(&self, family: &Family) -> PathBuf {
        self.path.join(family.name)
    }

    /// The `versions/` container for a family.
    pub fn versions_dir(&self, family: &Family) -> PathBuf {
        self.family_dir(family).join(VERSIONS_DIR)
    }

    /// Directory of one installed (or to-be-installed) version.
    pub fn version_dir(&self, family: &Family, token: &str) -> PathBuf {
        self.versions_dir(family).join(token)
    }

    /// Location of the family's active pointer.
    pub fn active_pointer(&self, family: &Family) -> PathBuf {
        self.family_dir(family).join(ACTIVE_POINTER)
    }

    /// Pointer target for a version, relative to the family directory.
    ///
    /// Keeping the target relative lets the whole root be relocated without
    /// breaking active pointers.
    pub fn pointer_target(&self, token: &str) -> PathBuf {
        Path::new(VERSIONS_DIR).join(token)
    }
}
