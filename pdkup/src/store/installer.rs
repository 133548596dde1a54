//! Orchestration of fetch, materialize, and activate.
//!
//! This is the only component that triggers a download: the activation
//! manager itself never fetches, and a remote miss is terminal here.
//! Building from source is a separate explicit command, never an implicit
//! fallback.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::family::Family;

use super::activation;
use super::codec::{self, Compression};
use super::error::{StoreError, StoreResult};
use super::local::VersionStore;
use super::remote::ReleaseClient;

/// Progress callback for archive transfers: `(bytes_so_far, total)`.
pub type FetchProgress = Box<dyn Fn(u64, Option<u64>) + Send + Sync>;

/// Reader adapter reporting cumulative byte counts to a callback.
struct ProgressReader<R: Read> {
    inner: R,
    seen: u64,
    total: Option<u64>,
    on_progress: FetchProgress,
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.seen += n as u64;
        (self.on_progress)(self.seen, self.total);
        Ok(n)
    }
}

/// Installs versions into a [`VersionStore`] and activates them.
pub struct Installer<'a, C: ReleaseClient> {
    client: &'a C,
    store: &'a VersionStore,
}

impl<'a, C: ReleaseClient> Installer<'a, C> {
    pub fn new(client: &'a C, store: &'a VersionStore) -> Self {
        Self { client, store }
    }

    /// Make sure the version exists in the store, fetching and decoding it
    /// on a miss. Returns the version directory.
    ///
    /// Nothing globally observable changes on failure: the final directory
    /// appears only after a fully verified extraction.
    pub fn ensure_present(
        &self,
        family: &Family,
        token: &str,
        expected_digest: Option<&str>,
        on_progress: Option<FetchProgress>,
    ) -> StoreResult<PathBuf> {
        self.store.clean_stale(family)?;

        if self.store.is_installed(family, token) {
            tracing::debug!(family = family.name, token, "version already installed");
            return Ok(self.store.root().version_dir(family, token));
        }

        tracing::info!(family = family.name, token, "fetching version archive");
        let archive = self.client.fetch(family, token)?;

        let versions_dir = self.store.root().versions_dir(family);
        let compression = archive.compression;
        let reader: Box<dyn Read> = match on_progress {
            Some(on_progress) => Box::new(ProgressReader {
                inner: archive.reader,
                seen: 0,
                total: archive.content_length,
                on_progress,
            }),
            None => archive.reader,
        };

        codec::materialize(
            reader,
            &versions_dir,
            family.name,
            token,
            compression,
            expected_digest,
        )
    }

    /// Ensure the version is present, then make it active.
    ///
    /// If activation fails after a successful install, the version stays
    /// installed; a later `enable` succeeds without re-downloading.
    pub fn ensure_active(
        &self,
        family: &Family,
        token: &str,
        expected_digest: Option<&str>,
        on_progress: Option<FetchProgress>,
    ) -> StoreResult<PathBuf> {
        let path = self.ensure_present(family, token, expected_digest, on_progress)?;
        activation::enable(self.store, family, token)?;
        Ok(path)
    }
}

/// Install a version from a local archive file through the same codec path
/// used for remote fetches. This is how builder output enters the store.
pub fn install_from_archive(
    store: &VersionStore,
    family: &Family,
    token: &str,
    archive_path: &Path,
) -> StoreResult<PathBuf> {
    store.clean_stale(family)?;

    let name = archive_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let compression = Compression::from_name(name).ok_or_else(|| {
        StoreError::io(
            archive_path,
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "unrecognized archive extension",
            ),
        )
    })?;

    let file = File::open(archive_path).map_err(|e| StoreError::io(archive_path, e))?;
    codec::materialize(
        file,
        &store.root().versions_dir(family),
        family.name,
        token,
        compression,
        None,
    )
}
