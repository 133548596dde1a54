//! Archive codec: turns a downloaded byte stream into a verified,
//! installed version directory.
//!
//! The contract is narrow on purpose: a compressed tar stream goes in, a
//! fully materialized directory comes out under its final name, or nothing
//! does. Extraction happens in a uniquely named temporary sibling inside
//! the `versions/` container (same filesystem), and the only way the final
//! directory can appear is a single atomic rename at the end.

use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use sha2::{Digest, Sha256};

use super::error::{StoreError, StoreResult};
use super::layout::TEMP_PREFIX;

/// Compression scheme of an archive stream.
///
/// Selected by the caller (usually from the asset file name) so the store
/// never inspects archive contents to guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// gzip-compressed tar (`.tar.gz`)
    Gzip,
    /// zstd-compressed tar (`.tar.zst`)
    Zstd,
}

impl Compression {
    /// Detect the scheme from an asset or file name.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::Gzip)
        } else if name.ends_with(".tar.zst") {
            Some(Self::Zstd)
        } else {
            None
        }
    }
}

/// Reader adapter that feeds every raw byte through a SHA-256 hasher.
///
/// The digest covers the compressed stream as transferred, not the
/// extracted contents.
struct DigestReader<R: Read> {
    inner: R,
    hasher: Sha256,
    bytes_read: u64,
}

impl<R: Read> DigestReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            bytes_read: 0,
        }
    }

    fn finalize(self) -> (String, u64) {
        (format!("{:x}", self.hasher.finalize()), self.bytes_read)
    }
}

impl<R: Read> Read for DigestReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        self.bytes_read += n as u64;
        Ok(n)
    }
}

/// Extract a compressed tar stream into `versions_dir/<token>`.
///
/// On success the final directory exists and is complete; on any failure
/// the temporary extraction directory is deleted and the final name never
/// appears. An existing directory at the final name is an error, never
/// overwritten.
///
/// `expected_digest`, when given, is a lowercase hex SHA-256 over the raw
/// compressed bytes; it is verified only after the stream has been fully
/// consumed.
pub fn materialize<R: Read>(
    reader: R,
    versions_dir: &Path,
    family: &str,
    token: &str,
    compression: Compression,
    expected_digest: Option<&str>,
) -> StoreResult<PathBuf> {
    let final_dir = versions_dir.join(token);
    if final_dir.exists() {
        return Err(StoreError::AlreadyInstalled {
            family: family.to_string(),
            token: token.to_string(),
            path: final_dir,
        });
    }

    fs::create_dir_all(versions_dir).map_err(|e| StoreError::io(versions_dir, e))?;

    let tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempdir_in(versions_dir)
        .map_err(|e| StoreError::io(versions_dir, e))?;

    let mut digest_reader = DigestReader::new(reader);
    let entries = extract_tar(&mut digest_reader, compression, tmp.path(), family, token)?;

    // Consume any trailing bytes (checksums, padding) so the digest covers
    // the whole stream as transferred.
    io::copy(&mut digest_reader, &mut io::sink()).map_err(|e| StoreError::TransferInterrupted {
        family: family.to_string(),
        token: token.to_string(),
        reason: e.to_string(),
    })?;

    let (actual_digest, bytes_read) = digest_reader.finalize();
    if let Some(expected) = expected_digest {
        if !actual_digest.eq_ignore_ascii_case(expected) {
            return Err(StoreError::DigestMismatch {
                family: family.to_string(),
                token: token.to_string(),
                expected: expected.to_ascii_lowercase(),
                actual: actual_digest,
            });
        }
    }

    // Disarm the auto-cleanup guard only for the rename itself; a failed
    // rename removes the temporary by hand.
    let tmp_path = tmp.keep();
    if let Err(e) = fs::rename(&tmp_path, &final_dir) {
        let _ = fs::remove_dir_all(&tmp_path);
        if final_dir.exists() {
            return Err(StoreError::AlreadyInstalled {
                family: family.to_string(),
                token: token.to_string(),
                path: final_dir,
            });
        }
        return Err(StoreError::io(&final_dir, e));
    }

    tracing::debug!(
        family,
        token,
        entries,
        bytes = bytes_read,
        "materialized version directory"
    );

    Ok(final_dir)
}

/// Run the decompressor and unpack every tar entry under `dest`.
///
/// Returns the number of entries written.
fn extract_tar<R: Read>(
    reader: &mut R,
    compression: Compression,
    dest: &Path,
    family: &str,
    token: &str,
) -> StoreResult<usize> {
    let stream_err = |e: io::Error| StoreError::TransferInterrupted {
        family: family.to_string(),
        token: token.to_string(),
        reason: e.to_string(),
    };

    let decoder: Box<dyn Read + '_> = match compression {
        Compression::Gzip => Box::new(flate2::read::GzDecoder::new(reader)),
        Compression::Zstd => Box::new(zstd::stream::read::Decoder::new(reader).map_err(stream_err)?),
    };

    let mut archive = tar::Archive::new(decoder);
    let mut count = 0usize;

    for entry in archive.entries().map_err(stream_err)? {
        let mut entry = entry.map_err(stream_err)?;
        let entry_path = entry.path().map_err(stream_err)?.into_owned();
        let safe_path = sanitize_entry_path(&entry_path)?;
        let out_path = dest.join(safe_path);

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        entry
            .unpack(&out_path)
            .map_err(|e| StoreError::io(&out_path, e))?;
        count += 1;
    }

    Ok(count)
}

/// Normalize an archive entry path, rejecting anything that would resolve
/// outside the extraction root.
///
/// Rejection fails the whole operation; entries are never silently
/// skipped.
fn sanitize_entry_path(entry: &Path) -> StoreResult<PathBuf> {
    let mut out = PathBuf::new();
    for component in entry.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(StoreError::PathTraversalRejected {
                    entry: entry.to_path_buf(),
                })
            }
        }
    }
    Ok(out)
}
