//! `build` command implementation.
//!
//! Walks the source tree, renders the math in every markdown page and
//! mirrors the result (plus any plain asset files) into the site directory.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use rayon::prelude::*;

use mathpress_config::{CliSettings, Config};
use mathpress_render::MathProcessor;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to the config file (default: discover mathpress.toml upwards)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Source directory holding the markdown documentation
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Destination directory for the generated site
    #[arg(long)]
    site_dir: Option<PathBuf>,

    /// Also render single-dollar inline math
    #[arg(long)]
    inline_math: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli = CliSettings {
            source_dir: self.source_dir,
            site_dir: self.site_dir,
            inline_math: self.inline_math.then_some(true),
        };
        let config = match &self.config {
            Some(path) => Config::from_file(path, &cli)?,
            None => Config::load(&std::env::current_dir()?, &cli)?,
        };

        if let Some(path) = &config.config_path {
            output.info(&format!("Using config: {}", path.display()));
        }

        let summary = build_site(&config)?;
        if summary.pages == 0 && summary.copied == 0 {
            output.warning(&format!(
                "No source files found in {}",
                config.source_dir.display()
            ));
            return Ok(());
        }

        output.success(&format!(
            "Built {} pages ({} assets copied) into {}",
            summary.pages,
            summary.copied,
            config.site_dir.display()
        ));
        Ok(())
    }
}

/// Counts of what a build produced.
struct BuildSummary {
    /// Markdown pages rendered.
    pages: usize,
    /// Non-markdown files copied verbatim.
    copied: usize,
}

/// What happened to a single source file.
enum Outcome {
    Rendered,
    Copied,
}

/// Render the whole source tree into the site directory.
fn build_site(config: &Config) -> Result<BuildSummary, CliError> {
    let files = scan_source(&config.source_dir);

    fs::create_dir_all(&config.site_dir).map_err(CliError::Io)?;
    let processor = MathProcessor::new(&config.site_dir, config.latex.clone())?;

    let outcomes: Vec<Outcome> = files
        .par_iter()
        .map(|file| build_file(file, &config.site_dir, &processor))
        .collect::<Result<_, _>>()?;

    let pages = outcomes
        .iter()
        .filter(|o| matches!(o, Outcome::Rendered))
        .count();
    Ok(BuildSummary {
        pages,
        copied: outcomes.len() - pages,
    })
}

/// Build one source file: render markdown, copy everything else.
fn build_file(file: &SourceFile, site_dir: &Path, processor: &MathProcessor) -> Result<Outcome, CliError> {
    let dest = site_dir.join(&file.rel);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    if file.path.extension().is_some_and(|e| e == "md") {
        let markdown = fs::read_to_string(&file.path)?;
        let rendered = processor.process_document(&markdown)?;
        fs::write(&dest, rendered)?;
        tracing::info!(page = %file.rel.display(), "rendered page");
        Ok(Outcome::Rendered)
    } else {
        fs::copy(&file.path, &dest)?;
        tracing::info!(file = %file.rel.display(), "copied file");
        Ok(Outcome::Copied)
    }
}

/// Reference to one file under the source tree.
struct SourceFile {
    /// Absolute path of the source file.
    path: PathBuf,
    /// Path relative to the source root, reused under the site root.
    rel: PathBuf,
}

/// Walk the source tree and collect every non-hidden file.
///
/// Returns an empty Vec if the source directory doesn't exist.
fn scan_source(source_dir: &Path) -> Vec<SourceFile> {
    let mut files = Vec::new();
    if source_dir.exists() {
        scan_directory(source_dir, Path::new(""), &mut files);
    }
    files
}

/// Scan a directory, skipping hidden files and dirs, recursing into the rest.
fn scan_directory(dir_path: &Path, rel_prefix: &Path, files: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir_path) else {
        return;
    };

    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }

        let path = entry.path();
        let rel = rel_prefix.join(&name);
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            scan_directory(&path, &rel, files);
        } else {
            files.push(SourceFile { path, rel });
        }
    }
}
