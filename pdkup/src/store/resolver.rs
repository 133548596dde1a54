//! Version resolution: from explicit tokens or a project's declared
//! tool-metadata file, plus the pure ordering used by listings.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::family::Family;

use super::error::{StoreError, StoreResult};
use super::remote::VersionDescriptor;

/// File name of a project's tool-version declaration.
const METADATA_FILE: &str = "tool_metadata.yml";

/// Subdirectory also searched for the declaration.
const DEPENDENCIES_DIR: &str = "dependencies";

/// One tool entry in a project's metadata file.
#[derive(Debug, Deserialize)]
struct ToolEntry {
    name: String,
    commit: String,
}

/// Determine the version token a command should act on.
///
/// An explicit token always wins and is returned unchanged, with no
/// existence check; whether it is installed or fetchable is the caller's
/// concern. Otherwise the project's declaration is consulted: an explicit
/// `metadata_file` if given, else `<project_dir>/tool_metadata.yml`, else
/// `<project_dir>/dependencies/tool_metadata.yml`.
pub fn resolve_requested(
    family: &Family,
    explicit: Option<&str>,
    project_dir: &Path,
    metadata_file: Option<&Path>,
) -> StoreResult<String> {
    if let Some(token) = explicit {
        return Ok(token.to_string());
    }

    let path = locate_declaration(project_dir, metadata_file)?;
    let token = lookup_declared(&path, family)?;
    tracing::info!(
        family = family.name,
        token,
        path = %path.display(),
        "resolved version from project declaration"
    );
    Ok(token)
}

/// Find the declaration file, or fail with `NoDeclarationFound`.
fn locate_declaration(project_dir: &Path, metadata_file: Option<&Path>) -> StoreResult<PathBuf> {
    if let Some(path) = metadata_file {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(StoreError::NoDeclarationFound {
            project_dir: path.to_path_buf(),
        });
    }

    for candidate in [
        project_dir.join(METADATA_FILE),
        project_dir.join(DEPENDENCIES_DIR).join(METADATA_FILE),
    ] {
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(StoreError::NoDeclarationFound {
        project_dir: project_dir.to_path_buf(),
    })
}

/// Read the token the file declares for this family's tool.
fn lookup_declared(path: &Path, family: &Family) -> StoreResult<String> {
    let content = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let entries: Vec<ToolEntry> =
        serde_yaml::from_str(&content).map_err(|e| StoreError::DeclarationParseFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    entries
        .iter()
        .find(|entry| entry.name == family.tool_name)
        .map(|entry| entry.commit.clone())
        .ok_or_else(|| StoreError::NoVersionDeclared {
            tool: family.tool_name.to_string(),
            path: path.to_path_buf(),
        })
}

/// A descriptor annotated for listing output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayVersion {
    pub descriptor: VersionDescriptor,
    pub installed: bool,
    pub active: bool,
}

/// Order descriptors for display and annotate installed/active state.
///
/// Pure: descending by commit date, unknown dates last in their original
/// remote order. Deterministic for a given input.
pub fn order_for_display(
    descriptors: Vec<VersionDescriptor>,
    installed: &HashSet<String>,
    active: Option<&str>,
) -> Vec<DisplayVersion> {
    let mut out: Vec<DisplayVersion> = descriptors
        .into_iter()
        .map(|descriptor| {
            let is_installed = installed.contains(&descriptor.token);
            let is_active = active == Some(descriptor.token.as_str());
            DisplayVersion {
                descriptor,
                installed: is_installed,
                active: is_active,
            }
        })
        .collect();

    // Stable sort keeps the remote-supplied order among unknown dates.
    out.sort_by(
        |a, b| match (&a.descriptor.commit_date, &b.descriptor.commit_date) {
            (Some(da), Some(db)) => db.cmp(da),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn sky130() -> &'static Family {
        Family::by_name("sky130").unwrap()
    }

    const DECLARATION: &str = "\
- name: magic
  commit: \"0fab2bd\"
- name: open_pdks
  commit: \"def456\"
";

    #[test]
    fn test_explicit_token_wins() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(METADATA_FILE), DECLARATION).unwrap();

        let token =
            resolve_requested(sky130(), Some("abc123"), temp.path(), None).unwrap();
        assert_eq!(token, "abc123");
    }

    #[test]
    fn test_declaration_lookup() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(METADATA_FILE), DECLARATION).unwrap();

        let token = resolve_requested(sky130(), None, temp.path(), None).unwrap();
        assert_eq!(token, "def456");
    }

    #[test]
    fn test_dependencies_fallback() {
        let temp = TempDir::new().unwrap();
        let deps = temp.path().join(DEPENDENCIES_DIR);
        fs::create_dir_all(&deps).unwrap();
        fs::write(deps.join(METADATA_FILE), DECLARATION).unwrap();

        let token = resolve_requested(sky130(), None, temp.path(), None).unwrap();
        assert_eq!(token, "def456");
    }

    #[test]
    fn test_no_declaration_found() {
        let temp = TempDir::new().unwrap();
        let err = resolve_requested(sky130(), None, temp.path(), None).unwrap_err();
        assert!(matches!(err, StoreError::NoDeclarationFound { .. }));
    }

    #[test]
    fn test_no_version_declared() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(METADATA_FILE),
            "- name: magic\n  commit: \"0fab2bd\"\n",
        )
        .unwrap();

        let err = resolve_requested(sky130(), None, temp.path(), None).unwrap_err();
        assert!(matches!(err, StoreError::NoVersionDeclared { .. }));
    }

    #[test]
    fn test_explicit_metadata_file_override() {
        let temp = TempDir::new().unwrap();
        let custom = temp.path().join("elsewhere.yml");
        fs::write(&custom, DECLARATION).unwrap();

        let token =
            resolve_requested(sky130(), None, temp.path(), Some(&custom)).unwrap();
        assert_eq!(token, "def456");

        let missing = temp.path().join("nope.yml");
        let err =
            resolve_requested(sky130(), None, temp.path(), Some(&missing)).unwrap_err();
        assert!(matches!(err, StoreError::NoDeclarationFound { .. }));
    }

    #[test]
    fn test_malformed_declaration() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(METADATA_FILE), "not: [valid").unwrap();

        let err = resolve_requested(sky130(), None, temp.path(), None).unwrap_err();
        assert!(matches!(err, StoreError::DeclarationParseFailed { .. }));
    }

    fn descriptor(token: &str, date: Option<(i32, u32, u32)>) -> VersionDescriptor {
        VersionDescriptor {
            token: token.to_string(),
            commit_date: date.map(|(y, m, d)| Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()),
            upload_date: None,
            prerelease: false,
        }
    }

    #[test]
    fn test_order_for_display_dates_descending_unknown_last() {
        let descriptors = vec![
            descriptor("a", None),
            descriptor("b", Some((2022, 1, 1))),
            descriptor("c", Some((2022, 6, 1))),
        ];

        let ordered = order_for_display(descriptors, &HashSet::new(), None);
        let tokens: Vec<&str> = ordered
            .iter()
            .map(|v| v.descriptor.token.as_str())
            .collect();
        assert_eq!(tokens, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_order_for_display_unknowns_keep_remote_order() {
        let descriptors = vec![
            descriptor("x", None),
            descriptor("y", None),
            descriptor("z", Some((2021, 3, 1))),
        ];

        let ordered = order_for_display(descriptors, &HashSet::new(), None);
        let tokens: Vec<&str> = ordered
            .iter()
            .map(|v| v.descriptor.token.as_str())
            .collect();
        assert_eq!(tokens, vec!["z", "x", "y"]);
    }

    #[test]
    fn test_order_for_display_annotations() {
        let descriptors = vec![
            descriptor("aaa", Some((2022, 1, 1))),
            descriptor("bbb", Some((2022, 2, 1))),
        ];
        let installed: HashSet<String> = ["aaa".to_string()].into();

        let ordered = order_for_display(descriptors, &installed, Some("aaa"));
        assert_eq!(ordered[0].descriptor.token, "bbb");
        assert!(!ordered[0].installed);
        assert!(!ordered[0].active);
        assert!(ordered[1].installed);
        assert!(ordered[1].active);
    }
}
