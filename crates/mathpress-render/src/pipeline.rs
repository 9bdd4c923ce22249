//! Two-stage LaTeX-to-SVG render pipeline.
//!
//! On a cache miss the pipeline wraps the formula in a minimal document,
//! typesets it with the configured engine and converts the resulting PDF to
//! SVG, all inside a scoped temporary directory. Subprocess output is
//! captured and never reaches the caller's terminal; it is surfaced through
//! `tracing` when a stage fails.
//!
//! The pipeline never fails from the caller's perspective: every toolchain
//! failure ends with a valid placeholder SVG at the canonical artifact
//! path, so neither the cache nor the substitution pass needs a failure
//! branch. Only I/O errors writing the build's own output propagate.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use crate::error::RenderError;
use crate::options::LatexOptions;

/// How a formula body is typeset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MathMode {
    /// Body used as-is inside the preview environment.
    Display,
    /// Body wrapped in `\( ... \)`.
    Inline,
}

/// Outcome of one render.
///
/// Every variant leaves a valid SVG at the canonical path; the failed
/// variants carry the captured subprocess log for diagnostics.
#[derive(Debug)]
pub enum RenderOutcome {
    /// Both toolchain stages succeeded.
    Rendered,
    /// The typesetting engine exited non-zero or could not be run; a
    /// `LaTeX error` placeholder was written instead.
    TypesettingFailed { log: String },
    /// The converter exited non-zero or produced no output; a
    /// `Conversion error` placeholder was written instead.
    ConversionFailed { log: String },
}

/// Scoped working directory for one render invocation.
///
/// System-temp directories are removed when dropped. When the caller
/// configures a `temp_dir` override the directory persists for debugging —
/// cleanup is skipped by configuration, not by default.
enum Workdir {
    Scoped(TempDir),
    Kept(PathBuf),
}

impl Workdir {
    fn new(override_dir: Option<&Path>) -> Result<Self, RenderError> {
        match override_dir {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(RenderError::CreateTempDir)?;
                let tmp = TempDir::with_prefix_in("mathpress-", dir)
                    .map_err(RenderError::CreateTempDir)?;
                Ok(Self::Kept(tmp.keep()))
            }
            None => {
                let tmp =
                    TempDir::with_prefix("mathpress-").map_err(RenderError::CreateTempDir)?;
                Ok(Self::Scoped(tmp))
            }
        }
    }

    fn path(&self) -> &Path {
        match self {
            Self::Scoped(tmp) => tmp.path(),
            Self::Kept(path) => path,
        }
    }
}

/// Result of one tool invocation, with the combined stdout+stderr log.
enum ToolRun {
    Success,
    Failed(String),
}

/// Render one formula to the canonical artifact path.
///
/// No timeout is imposed on the subprocesses; bounding a hung external tool
/// is left to the integration layer.
pub(crate) fn render_formula(
    body: &str,
    mode: MathMode,
    canonical: &Path,
    basename: &str,
    options: &LatexOptions,
) -> Result<RenderOutcome, RenderError> {
    let workdir = Workdir::new(options.temp_dir.as_deref())?;
    let dir = workdir.path();

    let tex_path = dir.join(format!("{basename}.tex"));
    fs::write(&tex_path, wrap_document(body, mode)).map_err(|source| RenderError::Write {
        path: tex_path.clone(),
        source,
    })?;

    let run = run_tool(
        &options.latex_cmd,
        &[OsStr::new("-output-directory"), dir.as_os_str(), tex_path.as_os_str()],
        dir,
    );
    if let ToolRun::Failed(log) = run {
        tracing::warn!(basename, log = %log.trim(), "typesetting failed");
        write_placeholder(canonical, "LaTeX error")?;
        return Ok(RenderOutcome::TypesettingFailed { log });
    }

    let pdf_path = dir.join(format!("{basename}.pdf"));
    let svg_tmp = dir.join(format!("{basename}.svg"));
    let run = run_tool(
        &options.dvisvgm_cmd,
        &[pdf_path.as_os_str(), OsStr::new("-o"), svg_tmp.as_os_str()],
        dir,
    );
    if let ToolRun::Failed(log) = run {
        tracing::warn!(basename, log = %log.trim(), "conversion failed");
        write_placeholder(canonical, "Conversion error")?;
        return Ok(RenderOutcome::ConversionFailed { log });
    }

    // Converter exited zero; promote its output into place atomically.
    if let Err(e) = promote(&svg_tmp, canonical) {
        let log = format!("converter produced no usable output: {e}");
        tracing::warn!(basename, log = %log, "conversion failed");
        write_placeholder(canonical, "Conversion error")?;
        return Ok(RenderOutcome::ConversionFailed { log });
    }

    Ok(RenderOutcome::Rendered)
}

/// Wrap a formula body in a minimal document.
///
/// The `preview` package with `tightpage` crops the output to the formula,
/// so the image carries no page margin.
fn wrap_document(body: &str, mode: MathMode) -> String {
    let content = match mode {
        MathMode::Display => body.to_owned(),
        MathMode::Inline => format!("\\({body}\\)"),
    };
    format!(
        "\\documentclass{{article}}\n\
         \\usepackage[active,tightpage]{{preview}}\n\
         \\usepackage{{amsmath,amssymb}}\n\
         \\begin{{document}}\n\
         \\begin{{preview}}\n\
         {content}\n\
         \\end{{preview}}\n\
         \\end{{document}}\n"
    )
}

/// Run one external tool with captured output.
///
/// `cmd_line` is split on whitespace; `extra` arguments are appended. Both
/// stdout and stderr are captured and combined into the returned log, so
/// nothing reaches the caller's terminal.
fn run_tool(cmd_line: &str, extra: &[&OsStr], cwd: &Path) -> ToolRun {
    let mut parts = cmd_line.split_whitespace();
    let Some(program) = parts.next() else {
        return ToolRun::Failed("empty command line".to_owned());
    };

    let output = Command::new(program)
        .args(parts)
        .args(extra)
        .current_dir(cwd)
        .output();

    match output {
        Ok(out) if out.status.success() => ToolRun::Success,
        Ok(out) => {
            let mut log = format!("`{program}` exited with {}\n", out.status);
            log.push_str(&String::from_utf8_lossy(&out.stdout));
            log.push_str(&String::from_utf8_lossy(&out.stderr));
            ToolRun::Failed(log)
        }
        Err(e) => ToolRun::Failed(format!("failed to run `{program}`: {e}")),
    }
}

/// Write a minimal placeholder SVG carrying diagnostic text.
fn write_placeholder(canonical: &Path, message: &str) -> Result<(), RenderError> {
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg"><text y="14">{message}</text></svg>"#
    );
    fs::write(canonical, svg).map_err(|source| RenderError::Write {
        path: canonical.to_path_buf(),
        source,
    })
}

/// Move a finished artifact into place.
///
/// Rename is atomic on the same filesystem, so concurrent renders of the
/// same key can only replace a complete file with a complete file. Falls
/// back to a copy when the temp directory lives on another filesystem.
fn promote(tmp: &Path, canonical: &Path) -> io::Result<()> {
    if fs::rename(tmp, canonical).is_ok() {
        return Ok(());
    }
    fs::copy(tmp, canonical).map(|_| ())
}
