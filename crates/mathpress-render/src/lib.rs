//! LaTeX math rendering for mathpress.
//!
//! This crate turns embedded LaTeX math in markdown documents into
//! pre-rendered SVG images, so published pages need no math runtime:
//! - Fragment extraction for ```` ```pdflatex ```` fenced blocks, `$$...$$`
//!   display math and (optionally) `$...$` inline math
//! - Content-addressed artifact cache keyed by a SHA-256 formula digest
//! - Two-stage external toolchain (`pdflatex` then `dvisvgm`) invoked only
//!   on cache miss, with placeholder artifacts on toolchain failure
//! - Substitution of each recognized span with an `<img>` reference
//!
//! # Architecture
//!
//! The crate is organized into modules:
//! - [`fragment`]: `MathKind` and `MathFragment` value types
//! - [`extract`]: document scanning producing ordered, non-overlapping fragments
//! - [`key`]: `FormulaKey` content digest (cache key and filename stem)
//! - [`cache`]: `ArtifactCache` over the generated asset directory
//! - [`pipeline`]: the pdflatex/dvisvgm subprocess pipeline
//! - [`embed`]: alt-text sanitization and span substitution
//! - [`processor`]: `MathProcessor`, the per-document entry point
//!
//! # Example
//!
//! ```no_run
//! use mathpress_render::{LatexOptions, MathProcessor};
//!
//! let processor = MathProcessor::new("site".as_ref(), LatexOptions::default())?;
//! let page = processor.process_document("Euler: $$e^{i\\pi} + 1 = 0$$")?;
//! assert!(page.contains("<img src=\"/assets/latex/latex-"));
//! # Ok::<(), mathpress_render::RenderError>(())
//! ```
//!
//! Toolchain failures never fail a build: a broken formula produces a
//! visibly broken placeholder image instead, and the captured engine log is
//! emitted at warn level. Only the inability to write the build's own
//! assets is an error.

mod cache;
mod consts;
mod embed;
mod error;
mod extract;
mod fragment;
mod key;
mod options;
mod pipeline;
mod processor;

pub use cache::ArtifactCache;
pub use consts::{DEFAULT_ASSET_SUBDIR, DEFAULT_DVISVGM_CMD, DEFAULT_LATEX_CMD};
pub use error::{OptionsError, RenderError};
pub use extract::extract_fragments;
pub use fragment::{MathFragment, MathKind};
pub use key::FormulaKey;
pub use options::LatexOptions;
pub use pipeline::RenderOutcome;
pub use processor::MathProcessor;
