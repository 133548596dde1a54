//! Activation manager: atomic switching of the per-family active pointer.
//!
//! The pointer is a symlink at `<root>/<family>/current` targeting the
//! relative path `versions/<token>`. Every switch goes through a uniquely
//! named temporary symlink followed by a rename, so a concurrent reader of
//! [`VersionStore::get_active`] observes either the old or the new target
//! and a crash mid-switch leaves the previous pointer intact. The orphaned
//! temporary is swept by the stale-cleanup pass on the next mutating
//! operation.

use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::family::Family;

use super::error::{StoreError, StoreResult};
use super::layout::TEMP_PREFIX;
use super::local::VersionStore;

/// Point the family's active pointer at an installed version.
///
/// Fails with [`StoreError::NotInstalled`] when the version directory does
/// not exist; this never triggers a fetch.
pub fn enable(store: &VersionStore, family: &Family, token: &str) -> StoreResult<()> {
    if !store.is_installed(family, token) {
        return Err(StoreError::NotInstalled {
            family: family.name.to_string(),
            token: token.to_string(),
        });
    }

    let family_dir = store.root().family_dir(family);
    fs::create_dir_all(&family_dir).map_err(|e| StoreError::io(&family_dir, e))?;
    store.clean_stale(family)?;

    let pointer = store.root().active_pointer(family);
    guard_pointer_is_replaceable(&pointer)?;

    let staged = family_dir.join(unique_pointer_name());
    let target = store.root().pointer_target(token);
    symlink(&target, &staged).map_err(|e| StoreError::io(&staged, e))?;

    if let Err(e) = fs::rename(&staged, &pointer) {
        let _ = fs::remove_file(&staged);
        return Err(StoreError::io(&pointer, e));
    }

    tracing::info!(family = family.name, token, "activated version");
    Ok(())
}

/// Remove the family's active pointer.
///
/// A no-op when no version is active.
pub fn disable(store: &VersionStore, family: &Family) -> StoreResult<()> {
    let pointer = store.root().active_pointer(family);
    guard_pointer_is_replaceable(&pointer)?;

    match fs::remove_file(&pointer) {
        Ok(()) => {
            tracing::info!(family = family.name, "deactivated");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::io(&pointer, e)),
    }
}

/// Refuse to touch a pointer location occupied by anything that is not a
/// symlink; a user-made file or directory there is not ours to replace.
fn guard_pointer_is_replaceable(pointer: &std::path::Path) -> StoreResult<()> {
    match fs::symlink_metadata(pointer) {
        Ok(meta) if !meta.file_type().is_symlink() => Err(StoreError::io(
            pointer,
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                "active pointer location is occupied by a non-symlink; remove it manually",
            ),
        )),
        _ => Ok(()),
    }
}

/// Temporary pointer name unique across processes (PID) and within one
/// process (clock nanos), so concurrent switches never collide.
fn unique_pointer_name() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    format!("{}current-{}-{}", TEMP_PREFIX, process::id(), nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::layout::PdkRoot;
    use tempfile::TempDir;

    fn sky130() -> &'static Family {
        Family::by_name("sky130").unwrap()
    }

    fn store(temp: &TempDir) -> VersionStore {
        VersionStore::new(PdkRoot::at(temp.path()))
    }

    fn install_mock(temp: &TempDir, token: &str) {
        let dir = temp.path().join("sky130/versions").join(token);
        fs::create_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_enable_requires_installed() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let err = enable(&store, sky130(), "abc123").unwrap_err();
        assert!(matches!(err, StoreError::NotInstalled { .. }));
        assert!(store.get_active(sky130()).unwrap().is_none());
    }

    #[test]
    fn test_enable_switches_pointer() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        install_mock(&temp, "abc123");

        enable(&store, sky130(), "abc123").unwrap();

        let active = store.get_active(sky130()).unwrap().unwrap();
        assert_eq!(active.token, "abc123");
        assert_eq!(active.path, temp.path().join("sky130/versions/abc123"));
    }

    #[test]
    fn test_enable_replaces_previous() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        install_mock(&temp, "old000");
        install_mock(&temp, "new111");

        enable(&store, sky130(), "old000").unwrap();
        enable(&store, sky130(), "new111").unwrap();

        let active = store.get_active(sky130()).unwrap().unwrap();
        assert_eq!(active.token, "new111");
    }

    #[test]
    fn test_enable_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        install_mock(&temp, "abc123");

        enable(&store, sky130(), "abc123").unwrap();
        enable(&store, sky130(), "abc123").unwrap();

        assert_eq!(
            store.get_active(sky130()).unwrap().unwrap().token,
            "abc123"
        );
        // No staged temporaries left behind.
        let leftovers: Vec<_> = fs::read_dir(temp.path().join("sky130"))
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with(TEMP_PREFIX))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_disable_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        install_mock(&temp, "abc123");

        // Disabling with no pointer present is a no-op, not an error.
        disable(&store, sky130()).unwrap();

        enable(&store, sky130(), "abc123").unwrap();
        disable(&store, sky130()).unwrap();
        assert!(store.get_active(sky130()).unwrap().is_none());

        disable(&store, sky130()).unwrap();
    }

    #[test]
    fn test_refuses_non_symlink_pointer() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        install_mock(&temp, "abc123");
        fs::write(temp.path().join("sky130/current"), "not a symlink").unwrap();

        assert!(enable(&store, sky130(), "abc123").is_err());
        assert!(disable(&store, sky130()).is_err());
        // The obstruction is left untouched.
        assert!(temp.path().join("sky130/current").exists());
    }

    #[test]
    fn test_pointer_target_is_relative() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        install_mock(&temp, "abc123");

        enable(&store, sky130(), "abc123").unwrap();
        let target = fs::read_link(temp.path().join("sky130/current")).unwrap();
        assert!(target.is_relative());
    }
}
