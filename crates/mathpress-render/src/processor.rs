//! Per-document math processor.
//!
//! [`MathProcessor`] is the boundary the build framework calls: one
//! processor per build invocation, one `process_document` call per page.

use std::path::Path;

use crate::cache::ArtifactCache;
use crate::embed::{image_tag, sanitize_alt, substitute};
use crate::error::RenderError;
use crate::extract::extract_fragments;
use crate::fragment::MathFragment;
use crate::key::FormulaKey;
use crate::options::LatexOptions;
use crate::pipeline::{MathMode, render_formula};

/// Renders the math in markdown documents against a shared artifact cache.
///
/// Constructed once per build; holds no ambient state beyond the validated
/// options and the cache handle. All methods take `&self`, so one processor
/// can serve parallel document workers.
#[derive(Debug)]
pub struct MathProcessor {
    options: LatexOptions,
    cache: ArtifactCache,
}

impl MathProcessor {
    /// Create a processor writing artifacts under
    /// `<site_dir>/<asset_subdir>`.
    ///
    /// Validates the options and creates the asset directory; both failures
    /// are fatal for the build.
    pub fn new(site_dir: &Path, options: LatexOptions) -> Result<Self, RenderError> {
        options.validate()?;
        let cache = ArtifactCache::new(site_dir, &options.asset_subdir)?;
        Ok(Self { options, cache })
    }

    /// Directory holding the rendered artifacts.
    #[must_use]
    pub fn asset_dir(&self) -> &Path {
        self.cache.asset_dir()
    }

    /// Transform one document, replacing each math construct with an image
    /// reference to its rendered artifact.
    ///
    /// A document without math is returned unchanged. Toolchain failures
    /// are absorbed per fragment into placeholder artifacts; only asset
    /// I/O errors propagate.
    pub fn process_document(&self, markdown: &str) -> Result<String, RenderError> {
        let fragments = extract_fragments(markdown, self.options.inline_math);
        if fragments.is_empty() {
            return Ok(markdown.to_owned());
        }

        let mut replacements = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            let tag = self.render_fragment(&fragment)?;
            replacements.push((fragment, Some(tag)));
        }
        Ok(substitute(markdown, replacements))
    }

    /// Render one fragment through the cache and return its image tag.
    fn render_fragment(&self, fragment: &MathFragment) -> Result<String, RenderError> {
        let mode = if fragment.kind.is_display() {
            MathMode::Display
        } else {
            MathMode::Inline
        };
        let key = FormulaKey {
            body: &fragment.body,
            display: fragment.kind.is_display(),
        };
        let basename = key.basename();

        self.cache.materialize(&basename, |canonical| {
            render_formula(&fragment.body, mode, canonical, &basename, &self.options)
        })?;

        let alt = sanitize_alt(&fragment.body);
        Ok(image_tag(&self.options.asset_subdir, &basename, &alt, fragment.kind))
    }
}
