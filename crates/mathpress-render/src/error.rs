//! Render error types.

use std::io;
use std::path::PathBuf;

/// Fatal errors from the render cache and pipeline.
///
/// Toolchain failures are not represented here: the pipeline absorbs them
/// into placeholder artifacts so a broken formula never breaks a build.
/// Only the inability to write the build's own output assets surfaces as an
/// error, since a build that cannot write its assets cannot succeed.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create asset directory {path}: {source}")]
    CreateAssetDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create temporary render directory: {0}")]
    CreateTempDir(#[source] io::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Options(#[from] OptionsError),
}

/// Validation errors for [`LatexOptions`](crate::LatexOptions).
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("asset_subdir must not be empty")]
    EmptyAssetSubdir,

    #[error("asset_subdir must be a relative path inside the site root, got {0:?}")]
    AssetSubdirEscapes(String),

    #[error("{0} must not be empty")]
    EmptyCommand(&'static str),
}
