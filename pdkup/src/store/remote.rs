//! Remote archive service: listing and fetching prebuilt version archives.
//!
//! The store only ever sees the [`ReleaseClient`] trait, so tests run
//! against in-memory fakes and the release hosting can change without
//! touching the store. The shipped implementation speaks the GitHub
//! releases API.

use std::env;
use std::io::Read;
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;

use crate::family::Family;

use super::codec::Compression;
use super::error::{StoreError, StoreResult};

/// Default HTTP connect timeout.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Archive asset names probed in order when fetching a version.
const ASSET_NAMES: &[&str] = &["default.tar.zst", "default.tar.gz"];

/// One remotely available version, as reported by the archive service.
///
/// Read-only and never persisted; the dates are informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDescriptor {
    /// Opaque version token.
    pub token: String,
    /// Date of the source commit the archive was built from, when the
    /// service reports one.
    pub commit_date: Option<DateTime<Utc>>,
    /// Date the archive was uploaded.
    pub upload_date: Option<DateTime<Utc>>,
    /// Whether the service marks this version as a prerelease.
    pub prerelease: bool,
}

/// A fetched archive: the byte stream plus what the store needs to decode
/// it.
pub struct ArchiveStream {
    pub compression: Compression,
    pub content_length: Option<u64>,
    pub reader: Box<dyn Read>,
}

/// Client for the remote archive service.
pub trait ReleaseClient {
    /// List available versions of a family, newest first.
    fn list(&self, family: &Family) -> StoreResult<Vec<VersionDescriptor>>;

    /// Open the archive stream for one version.
    ///
    /// A missing remote archive is [`StoreError::VersionNotAvailable`];
    /// any other failure is surfaced as a remote request error.
    fn fetch(&self, family: &Family, token: &str) -> StoreResult<ArchiveStream>;
}

/// Release repository coordinates, overridable through the environment for
/// mirrors and testing.
#[derive(Debug, Clone)]
pub struct ReleaseRepo {
    pub owner: String,
    pub name: String,
}

impl ReleaseRepo {
    /// Resolve from `PDKUP_REPO_OWNER`/`PDKUP_REPO_NAME`, falling back to
    /// the canonical archive repository.
    pub fn from_env() -> Self {
        Self {
            owner: env::var("PDKUP_REPO_OWNER").unwrap_or_else(|_| "pdkup".to_string()),
            name: env::var("PDKUP_REPO_NAME").unwrap_or_else(|_| "pdk-archives".to_string()),
        }
    }

    fn api_base(&self) -> String {
        format!("https://api.github.com/repos/{}/{}", self.owner, self.name)
    }

    fn download_base(&self) -> String {
        format!("https://github.com/{}/{}/releases/download", self.owner, self.name)
    }
}

/// HTTP implementation of [`ReleaseClient`] against a GitHub-releases
/// style archive service.
///
/// Releases are tagged `<family>-<token>`; the commit date is recovered
/// from a `released on <ISO-8601>` line in the release notes.
pub struct HttpReleaseClient {
    client: reqwest::blocking::Client,
    repo: ReleaseRepo,
}

impl HttpReleaseClient {
    pub fn new() -> Self {
        Self::with_repo(ReleaseRepo::from_env())
    }

    pub fn with_repo(repo: ReleaseRepo) -> Self {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("pdkup/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to create HTTP client");

        Self { client, repo }
    }
}

impl Default for HttpReleaseClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Subset of the release API payload this client reads.
#[derive(Debug, Deserialize)]
struct ApiRelease {
    tag_name: String,
    draft: bool,
    prerelease: bool,
    published_at: Option<String>,
    body: Option<String>,
}

impl ReleaseClient for HttpReleaseClient {
    fn list(&self, family: &Family) -> StoreResult<Vec<VersionDescriptor>> {
        let url = format!("{}/releases?per_page=100", self.repo.api_base());
        let remote_err = |reason: String| StoreError::RemoteRequestFailed {
            url: url.clone(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| remote_err(e.to_string()))?;
        if !response.status().is_success() {
            return Err(remote_err(format!("HTTP {}", response.status())));
        }

        let body = response.text().map_err(|e| remote_err(e.to_string()))?;
        let releases: Vec<ApiRelease> =
            serde_json::from_str(&body).map_err(|e| remote_err(e.to_string()))?;

        let mut descriptors = parse_release_listing(&releases, family);
        descriptors.sort_by(|a, b| match (&a.commit_date, &b.commit_date) {
            (Some(da), Some(db)) => db.cmp(da),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        Ok(descriptors)
    }

    fn fetch(&self, family: &Family, token: &str) -> StoreResult<ArchiveStream> {
        for asset in ASSET_NAMES {
            let url = format!(
                "{}/{}-{}/{}",
                self.repo.download_base(),
                family.name,
                token,
                asset
            );

            let response =
                self.client
                    .get(&url)
                    .send()
                    .map_err(|e| StoreError::RemoteRequestFailed {
                        url: url.clone(),
                        reason: e.to_string(),
                    })?;

            if response.status() == reqwest::StatusCode::NOT_FOUND {
                continue;
            }
            if !response.status().is_success() {
                return Err(StoreError::RemoteRequestFailed {
                    url,
                    reason: format!("HTTP {}", response.status()),
                });
            }

            let compression = Compression::from_name(asset).expect("known asset name");
            return Ok(ArchiveStream {
                compression,
                content_length: response.content_length(),
                reader: Box::new(response),
            });
        }

        Err(StoreError::VersionNotAvailable {
            family: family.name.to_string(),
            token: token.to_string(),
        })
    }
}

/// Extract this family's descriptors from a raw release listing.
fn parse_release_listing(releases: &[ApiRelease], family: &Family) -> Vec<VersionDescriptor> {
    let commit_date_rx = Regex::new(r"released on ([\d\-:TZ]+)").expect("valid regex");

    let mut descriptors = Vec::new();
    for release in releases {
        if release.draft {
            continue;
        }
        let Some((tag_family, token)) = release.tag_name.rsplit_once('-') else {
            continue;
        };
        if tag_family != family.name || token.is_empty() {
            continue;
        }

        let commit_date = release
            .body
            .as_deref()
            .and_then(|body| commit_date_rx.captures(body))
            .and_then(|captures| parse_iso8601(&captures[1]));
        let upload_date = release.published_at.as_deref().and_then(parse_iso8601);

        descriptors.push(VersionDescriptor {
            token: token.to_string(),
            commit_date,
            upload_date,
            prerelease: release.prerelease,
        });
    }
    descriptors
}

fn parse_iso8601(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
