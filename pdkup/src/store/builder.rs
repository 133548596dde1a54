//! Builder collaborator: producing a version archive from source.
//!
//! Building is delegated wholesale to an external containerized build
//! tool; this module only defines the seam and a thin implementation that
//! shells out to it. Builder output enters the store through
//! [`install_from_archive`](super::installer::install_from_archive), the
//! same codec path as remote fetches, and is never triggered implicitly
//! by `enable`.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use crate::family::Family;

use super::error::{StoreError, StoreResult};

/// Configuration for a containerized build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Container tool binary (`docker`, `podman`, ...).
    pub tool: String,
    /// Build image to run.
    pub image: String,
    /// Parallel jobs passed through to the build.
    pub jobs: usize,
    /// Host directory the container writes the finished archive into.
    pub out_dir: PathBuf,
}

impl BuildConfig {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            tool: "docker".to_string(),
            image: "ghcr.io/pdkup/builder:latest".to_string(),
            jobs: 1,
            out_dir: out_dir.into(),
        }
    }
}

/// Produces a version archive from source.
pub trait Builder {
    /// Build one version, returning the path to the produced archive.
    fn build(&self, family: &Family, token: &str) -> StoreResult<PathBuf>;
}

/// [`Builder`] that runs the build inside a container.
///
/// The container is expected to drop `<family>-<token>.tar.gz` into the
/// mounted output directory; anything else is a build failure.
pub struct ContainerBuilder {
    config: BuildConfig,
}

impl ContainerBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }
}

impl Builder for ContainerBuilder {
    fn build(&self, family: &Family, token: &str) -> StoreResult<PathBuf> {
        let build_failed = |reason: String| StoreError::BuildFailed {
            family: family.name.to_string(),
            token: token.to_string(),
            reason,
        };

        fs::create_dir_all(&self.config.out_dir)
            .map_err(|e| StoreError::io(&self.config.out_dir, e))?;
        let out_dir = self
            .config
            .out_dir
            .canonicalize()
            .map_err(|e| StoreError::io(&self.config.out_dir, e))?;

        tracing::info!(
            family = family.name,
            token,
            image = self.config.image,
            "starting containerized build"
        );

        let output = Command::new(&self.config.tool)
            .arg("run")
            .arg("--rm")
            .arg("-v")
            .arg(format!("{}:/out", out_dir.display()))
            .arg("-e")
            .arg(format!("PDK_FAMILY={}", family.name))
            .arg("-e")
            .arg(format!("PDK_VERSION={}", token))
            .arg("-e")
            .arg(format!("BUILD_JOBS={}", self.config.jobs))
            .arg(&self.config.image)
            .output()
            .map_err(|e| build_failed(format!("failed to run {}: {}", self.config.tool, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: String = stderr
                .lines()
                .rev()
                .take(10)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect::<Vec<_>>()
                .join("\n");
            return Err(build_failed(format!("exit status {}: {}", output.status, tail)));
        }

        let archive = out_dir.join(format!("{}-{}.tar.gz", family.name, token));
        if !archive.is_file() {
            return Err(build_failed(format!(
                "build completed but {} was not produced",
                archive.display()
            )));
        }

        Ok(archive)
    }
}
