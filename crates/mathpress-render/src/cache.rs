//! Artifact cache over the generated asset directory.
//!
//! The cache tracks exactly one thing: whether an artifact file named by a
//! formula digest exists under the asset directory. There is no metadata
//! sidecar, no expiry and no eviction; a hit short-circuits rendering for
//! the lifetime of the directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RenderError;
use crate::pipeline::RenderOutcome;

/// Directory of rendered artifacts keyed by formula digest.
///
/// Constructed once per build and shared by reference across worker
/// threads; all methods take `&self`. Two threads may race on the same key
/// and both render — the pipeline's rename-from-temp write discipline makes
/// that wasted work, never a torn file.
#[derive(Debug)]
pub struct ArtifactCache {
    asset_dir: PathBuf,
}

impl ArtifactCache {
    /// Create a cache rooted at `<site_dir>/<asset_subdir>`, creating the
    /// directory if needed.
    ///
    /// Failure to create the directory is fatal: a build that cannot write
    /// its own output assets cannot succeed.
    pub fn new(site_dir: &Path, asset_subdir: &str) -> Result<Self, RenderError> {
        let asset_dir = site_dir.join(asset_subdir);
        fs::create_dir_all(&asset_dir).map_err(|source| RenderError::CreateAssetDir {
            path: asset_dir.clone(),
            source,
        })?;
        Ok(Self { asset_dir })
    }

    /// Directory holding the rendered artifacts.
    #[must_use]
    pub fn asset_dir(&self) -> &Path {
        &self.asset_dir
    }

    /// Canonical path of the artifact for `basename`.
    #[must_use]
    pub fn artifact_path(&self, basename: &str) -> PathBuf {
        self.asset_dir.join(format!("{basename}.svg"))
    }

    /// Look up an existing artifact.
    ///
    /// The existence check is the last observable action before returning,
    /// so a returned path always named an existing file at that moment.
    #[must_use]
    pub fn lookup(&self, basename: &str) -> Option<PathBuf> {
        let path = self.artifact_path(basename);
        path.is_file().then_some(path)
    }

    /// Return the artifact for `basename`, rendering it on miss.
    ///
    /// `render` is called only when no artifact exists yet; its contract is
    /// to leave a valid file at the canonical path on every `Ok` return
    /// (placeholders included).
    pub fn materialize<F>(&self, basename: &str, render: F) -> Result<PathBuf, RenderError>
    where
        F: FnOnce(&Path) -> Result<RenderOutcome, RenderError>,
    {
        if let Some(path) = self.lookup(basename) {
            return Ok(path);
        }

        let path = self.artifact_path(basename);
        let outcome = render(&path)?;
        tracing::debug!(basename, outcome = ?outcome, "materialized artifact");
        debug_assert!(path.is_file(), "render left no artifact at {}", path.display());
        Ok(path)
    }
}
