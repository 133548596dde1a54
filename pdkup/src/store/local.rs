//! Local version store: discovery, enumeration, and removal of installed
//! PDK versions.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};

use crate::family::Family;

use super::error::{StoreError, StoreResult};
use super::layout::{PdkRoot, TEMP_PREFIX};

/// How long an interrupted run's temporaries are left alone before the
/// cleanup pass removes them.
pub const STALE_TEMP_GRACE: Duration = Duration::from_secs(48 * 60 * 60);

/// An installed version of a PDK family.
///
/// The date is informational only, supplied by the remote listing when one
/// is available; it is never stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledVersion {
    /// Opaque version token (a source-control commit hash in practice).
    pub token: String,
    /// Directory holding the extracted version.
    pub path: PathBuf,
    /// Commit date, when the remote listing knows it.
    pub date: Option<DateTime<Utc>>,
}

/// Store of installed versions under one [`PdkRoot`].
pub struct VersionStore {
    root: PdkRoot,
}

impl VersionStore {
    pub fn new(root: PdkRoot) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &PdkRoot {
        &self.root
    }

    /// Enumerate installed versions of a family.
    ///
    /// In-flight temporaries (the reserved `.tmp-` prefix) are never
    /// reported. Ordering is descending by date where known, with a stable
    /// lexicographic token fallback, so output is deterministic whether or
    /// not date information is available.
    pub fn list_installed(&self, family: &Family) -> StoreResult<Vec<InstalledVersion>> {
        let versions_dir = self.root.versions_dir(family);
        if !versions_dir.exists() {
            return Ok(Vec::new());
        }

        let entries =
            fs::read_dir(&versions_dir).map_err(|e| StoreError::io(&versions_dir, e))?;

        let mut versions = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with(TEMP_PREFIX) {
                continue;
            }
            versions.push(InstalledVersion {
                token: name.to_string(),
                path,
                date: None,
            });
        }

        sort_versions(&mut versions);
        Ok(versions)
    }

    /// Whether a fully materialized directory exists for this version.
    pub fn is_installed(&self, family: &Family, token: &str) -> bool {
        if token.starts_with(TEMP_PREFIX) {
            return false;
        }
        self.root.version_dir(family, token).is_dir()
    }

    /// Directory of an installed version.
    pub fn installed_path(&self, family: &Family, token: &str) -> StoreResult<PathBuf> {
        if !self.is_installed(family, token) {
            return Err(StoreError::NotInstalled {
                family: family.name.to_string(),
                token: token.to_string(),
            });
        }
        Ok(self.root.version_dir(family, token))
    }

    /// Resolve the family's active pointer.
    ///
    /// An absent pointer, or one whose target directory no longer exists
    /// (manual deletion outside the tool), reads as "no active version".
    pub fn get_active(&self, family: &Family) -> StoreResult<Option<InstalledVersion>> {
        let pointer = self.root.active_pointer(family);
        let target = match fs::read_link(&pointer) {
            Ok(target) => target,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&pointer, e)),
        };

        let Some(token) = target.file_name().and_then(|n| n.to_str()) else {
            tracing::warn!(family = family.name, ?target, "malformed active pointer");
            return Ok(None);
        };

        let version_dir = self.root.version_dir(family, token);
        if !version_dir.is_dir() {
            tracing::warn!(
                family = family.name,
                token,
                "active pointer targets a missing version; treating as inactive"
            );
            return Ok(None);
        }

        Ok(Some(InstalledVersion {
            token: token.to_string(),
            path: version_dir,
            date: None,
        }))
    }

    /// Delete an installed version's directory.
    ///
    /// Refuses to remove the active version so the pointer can never be
    /// left dangling by this operation.
    pub fn remove(&self, family: &Family, token: &str) -> StoreResult<()> {
        self.clean_stale(family)?;

        if !self.is_installed(family, token) {
            return Err(StoreError::NotInstalled {
                family: family.name.to_string(),
                token: token.to_string(),
            });
        }

        if let Some(active) = self.get_active(family)? {
            if active.token == token {
                return Err(StoreError::CannotRemoveActive {
                    family: family.name.to_string(),
                    token: token.to_string(),
                });
            }
        }

        let version_dir = self.root.version_dir(family, token);
        fs::remove_dir_all(&version_dir).map_err(|e| StoreError::io(&version_dir, e))?;
        tracing::info!(family = family.name, token, "removed installed version");
        Ok(())
    }

    /// Remove leftover temporaries older than [`STALE_TEMP_GRACE`].
    ///
    /// Interrupted runs orphan `.tmp-` directories and pointer temps; this
    /// pass runs at the start of mutating operations to keep them from
    /// accumulating. Returns the number of entries removed.
    pub fn clean_stale(&self, family: &Family) -> StoreResult<usize> {
        let mut removed = 0;
        for dir in [self.root.family_dir(family), self.root.versions_dir(family)] {
            removed += clean_stale_in(&dir, STALE_TEMP_GRACE)?;
        }
        Ok(removed)
    }
}

/// Descending by date where both are known; lexicographic token order
/// otherwise and as a tie-break.
pub fn sort_versions(versions: &mut [InstalledVersion]) {
    versions.sort_by(|a, b| match (&a.date, &b.date) {
        (Some(da), Some(db)) => db.cmp(da).then_with(|| a.token.cmp(&b.token)),
        _ => a.token.cmp(&b.token),
    });
}

/// Total on-disk size of a directory tree, in bytes.
pub fn dir_size(path: &Path) -> std::io::Result<u64> {
    let mut total = 0;

    if path.is_file() {
        return Ok(path.metadata()?.len());
    }

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            total += path.metadata()?.len();
        } else if path.is_dir() {
            total += dir_size(&path)?;
        }
    }

    Ok(total)
}

fn clean_stale_in(dir: &Path, grace: Duration) -> StoreResult<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let cutoff = SystemTime::now() - grace;
    let mut removed = 0;

    let entries = fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))?;
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.starts_with(TEMP_PREFIX) {
            continue;
        }

        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        if modified > cutoff {
            continue;
        }

        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        match result {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "removed stale temporary");
                removed += 1;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove stale temporary");
            }
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
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
        fs::write(dir.join("SOURCES"), format!("open_pdks {}", token)).unwrap();
    }

    #[test]
    fn test_list_empty_store() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        assert!(store.list_installed(sky130()).unwrap().is_empty());
    }

    #[test]
    fn test_list_skips_temp_entries() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        install_mock(&temp, "bbb");
        install_mock(&temp, "aaa");
        fs::create_dir_all(temp.path().join("sky130/versions/.tmp-12345")).unwrap();

        let versions = store.list_installed(sky130()).unwrap();
        let tokens: Vec<&str> = versions.iter().map(|v| v.token.as_str()).collect();
        assert_eq!(tokens, vec!["aaa", "bbb"]);
    }

    #[test]
    fn test_is_installed() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        assert!(!store.is_installed(sky130(), "abc123"));
        install_mock(&temp, "abc123");
        assert!(store.is_installed(sky130(), "abc123"));
        assert!(!store.is_installed(sky130(), ".tmp-abc123"));
    }

    #[test]
    fn test_get_active_none_when_absent() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        assert!(store.get_active(sky130()).unwrap().is_none());
    }

    #[test]
    fn test_get_active_dangling_is_none() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let family_dir = temp.path().join("sky130");
        fs::create_dir_all(&family_dir).unwrap();
        std::os::unix::fs::symlink("versions/ghost", family_dir.join("current")).unwrap();

        assert!(store.get_active(sky130()).unwrap().is_none());
    }

    #[test]
    fn test_remove_not_installed() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let err = store.remove(sky130(), "abc123").unwrap_err();
        assert!(matches!(err, StoreError::NotInstalled { .. }));
    }

    #[test]
    fn test_remove_installed() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        install_mock(&temp, "abc123");

        store.remove(sky130(), "abc123").unwrap();
        assert!(!store.is_installed(sky130(), "abc123"));
    }

    #[test]
    fn test_remove_active_is_guarded() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        install_mock(&temp, "abc123");
        std::os::unix::fs::symlink(
            "versions/abc123",
            temp.path().join("sky130").join("current"),
        )
        .unwrap();

        let err = store.remove(sky130(), "abc123").unwrap_err();
        assert!(matches!(err, StoreError::CannotRemoveActive { .. }));
        assert!(store.is_installed(sky130(), "abc123"));
    }

    #[test]
    fn test_sort_versions_dates_descending_unknown_last() {
        let date = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap();
        let mk = |token: &str, date| InstalledVersion {
            token: token.to_string(),
            path: PathBuf::new(),
            date,
        };
        let mut versions = vec![
            mk("a", None),
            mk("b", Some(date(2022, 1, 1))),
            mk("c", Some(date(2022, 6, 1))),
        ];
        sort_versions(&mut versions);
        let tokens: Vec<&str> = versions.iter().map(|v| v.token.as_str()).collect();
        assert_eq!(tokens, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_clean_stale_removes_old_temps_only() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        install_mock(&temp, "abc123");
        let stale = temp.path().join("sky130/versions/.tmp-stale");
        fs::create_dir_all(&stale).unwrap();

        // Fresh temporaries stay.
        assert_eq!(store.clean_stale(sky130()).unwrap(), 0);
        assert!(stale.exists());

        // Backdate past the grace period, then it goes.
        let old = SystemTime::now() - (STALE_TEMP_GRACE + Duration::from_secs(60));
        let times = fs::FileTimes::new().set_modified(old);
        fs::File::open(&stale).unwrap().set_times(times).unwrap();

        assert_eq!(store.clean_stale(sky130()).unwrap(), 1);
        assert!(!stale.exists());
        assert!(store.is_installed(sky130(), "abc123"));
    }

    #[test]
    fn test_dir_size() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a"), vec![0u8; 100]).unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("sub/b"), vec![0u8; 50]).unwrap();
        assert_eq!(dir_size(temp.path()).unwrap(), 150);
    }
}
