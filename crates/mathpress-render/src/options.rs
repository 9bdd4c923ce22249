//! Render pipeline options.

use std::path::PathBuf;

use crate::consts::{DEFAULT_ASSET_SUBDIR, DEFAULT_DVISVGM_CMD, DEFAULT_LATEX_CMD};
use crate::error::OptionsError;

/// Options recognized by the math render pipeline.
///
/// Validated by [`MathProcessor::new`](crate::MathProcessor::new); invalid
/// options are rejected at construction rather than at render time.
#[derive(Debug, Clone)]
pub struct LatexOptions {
    /// Artifact directory relative to the site root.
    pub asset_subdir: String,
    /// Whitespace-split command line for the typesetting engine. The
    /// pipeline appends `-output-directory <tmp>` and the `.tex` path.
    pub latex_cmd: String,
    /// Whitespace-split command line for the PDF-to-SVG converter. The
    /// pipeline appends the PDF path and `-o <output>`.
    pub dvisvgm_cmd: String,
    /// Override for scoped temporary render directories. When set, the
    /// per-render directories are kept on disk for debugging instead of
    /// being removed after each render.
    pub temp_dir: Option<PathBuf>,
    /// Treat single-dollar `$...$` spans as inline math. Off by default to
    /// avoid false positives on literal dollar signs.
    pub inline_math: bool,
}

impl Default for LatexOptions {
    fn default() -> Self {
        Self {
            asset_subdir: DEFAULT_ASSET_SUBDIR.to_owned(),
            latex_cmd: DEFAULT_LATEX_CMD.to_owned(),
            dvisvgm_cmd: DEFAULT_DVISVGM_CMD.to_owned(),
            temp_dir: None,
            inline_math: false,
        }
    }
}

impl LatexOptions {
    /// Validate the options.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.asset_subdir.is_empty() {
            return Err(OptionsError::EmptyAssetSubdir);
        }
        let subdir = std::path::Path::new(&self.asset_subdir);
        if subdir.is_absolute()
            || subdir
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(OptionsError::AssetSubdirEscapes(self.asset_subdir.clone()));
        }
        if self.latex_cmd.split_whitespace().next().is_none() {
            return Err(OptionsError::EmptyCommand("latex_cmd"));
        }
        if self.dvisvgm_cmd.split_whitespace().next().is_none() {
            return Err(OptionsError::EmptyCommand("dvisvgm_cmd"));
        }
        Ok(())
    }
}
