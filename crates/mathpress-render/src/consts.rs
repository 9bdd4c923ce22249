//! Shared constants for LaTeX rendering.

/// Version tag mixed into every formula digest.
///
/// Bump this when the preamble or toolchain conventions change, so artifacts
/// rendered under the old convention are never reused for the new one.
pub(crate) const HASH_VERSION: &[u8] = b"pdflatex_v1";

/// Default artifact directory, relative to the site root.
pub const DEFAULT_ASSET_SUBDIR: &str = "assets/latex";

/// Default typesetting invocation (non-interactive, halt on first error).
pub const DEFAULT_LATEX_CMD: &str = "pdflatex -interaction=nonstopmode -halt-on-error";

/// Default PDF-to-SVG conversion invocation (no embedded fonts).
pub const DEFAULT_DVISVGM_CMD: &str = "dvisvgm --no-fonts";

/// Info-string tag that marks a fenced code block as LaTeX math.
pub(crate) const MATH_FENCE_TAG: &str = "pdflatex";

/// Maximum length of a generated alt attribute, in characters.
pub(crate) const MAX_ALT_CHARS: usize = 120;
