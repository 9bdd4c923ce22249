//! Configuration management for mathpress.
//!
//! Parses `mathpress.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! The `[latex]` section maps onto [`LatexOptions`] and recognizes exactly
//! the pipeline's options; unknown keys are rejected rather than ignored so
//! a typo never silently falls back to a default. The `temp_dir` value
//! supports `~` and `${VAR}` expansion.
//!
//! ```toml
//! [build]
//! source_dir = "docs"
//! site_dir = "site"
//!
//! [latex]
//! asset_subdir = "assets/latex"
//! latex_cmd = "pdflatex -interaction=nonstopmode -halt-on-error"
//! dvisvgm_cmd = "dvisvgm --no-fonts"
//! temp_dir = "~/scratch/mathpress"
//! inline_math = false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use mathpress_render::{LatexOptions, OptionsError};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mathpress.toml";

/// Default documentation source directory.
const DEFAULT_SOURCE_DIR: &str = "docs";

/// Default generated site directory.
const DEFAULT_SITE_DIR: &str = "site";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to expand temp_dir {value:?}: {reason}")]
    Expand { value: String, reason: String },

    #[error(transparent)]
    Options(#[from] OptionsError),
}

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override generated site directory.
    pub site_dir: Option<PathBuf>,
    /// Override the inline-math extractor rule.
    pub inline_math: Option<bool>,
}

/// Raw configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    build: RawBuild,
    latex: RawLatex,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct RawBuild {
    source_dir: Option<String>,
    site_dir: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct RawLatex {
    asset_subdir: Option<String>,
    latex_cmd: Option<String>,
    dvisvgm_cmd: Option<String>,
    temp_dir: Option<String>,
    inline_math: Option<bool>,
}

/// Resolved application configuration.
#[derive(Debug)]
pub struct Config {
    /// Source directory holding the markdown documentation.
    pub source_dir: PathBuf,
    /// Destination directory for the generated site.
    pub site_dir: PathBuf,
    /// Validated render pipeline options.
    pub latex: LatexOptions,
    /// Path of the config file the values came from, if one was found.
    pub config_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration, discovering `mathpress.toml` in `start_dir` or
    /// any of its parent directories.
    ///
    /// A missing config file is not an error; defaults apply. CLI settings
    /// take precedence over file values.
    pub fn load(start_dir: &Path, cli: &CliSettings) -> Result<Self, ConfigError> {
        match discover(start_dir) {
            Some(path) => Self::from_file(&path, cli),
            None => resolve(RawConfig::default(), None, start_dir, cli),
        }
    }

    /// Load configuration from an explicit file path.
    ///
    /// Relative `build` directories resolve against the file's parent.
    pub fn from_file(path: &Path, cli: &CliSettings) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        resolve(raw, Some(path.to_path_buf()), &base, cli)
    }
}

/// Search `start_dir` and its ancestors for the config file.
fn discover(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}

/// Resolve raw values into a validated [`Config`].
fn resolve(
    raw: RawConfig,
    config_path: Option<PathBuf>,
    base: &Path,
    cli: &CliSettings,
) -> Result<Config, ConfigError> {
    let source_dir = cli.source_dir.clone().unwrap_or_else(|| {
        base.join(raw.build.source_dir.as_deref().unwrap_or(DEFAULT_SOURCE_DIR))
    });
    let site_dir = cli
        .site_dir
        .clone()
        .unwrap_or_else(|| base.join(raw.build.site_dir.as_deref().unwrap_or(DEFAULT_SITE_DIR)));

    let defaults = LatexOptions::default();
    let temp_dir = raw.latex.temp_dir.map(|value| expand_path(&value)).transpose()?;
    let latex = LatexOptions {
        asset_subdir: raw.latex.asset_subdir.unwrap_or(defaults.asset_subdir),
        latex_cmd: raw.latex.latex_cmd.unwrap_or(defaults.latex_cmd),
        dvisvgm_cmd: raw.latex.dvisvgm_cmd.unwrap_or(defaults.dvisvgm_cmd),
        temp_dir,
        inline_math: cli
            .inline_math
            .or(raw.latex.inline_math)
            .unwrap_or(defaults.inline_math),
    };
    latex.validate()?;

    Ok(Config {
        source_dir,
        site_dir,
        latex,
        config_path,
    })
}

/// Expand `~` and `${VAR}` in a configured path.
fn expand_path(value: &str) -> Result<PathBuf, ConfigError> {
    shellexpand::full(value)
        .map(|expanded| PathBuf::from(expanded.into_owned()))
        .map_err(|e| ConfigError::Expand {
            value: value.to_owned(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();

        let config = Config::load(dir.path(), &CliSettings::default()).unwrap();

        assert_eq!(config.source_dir, dir.path().join("docs"));
        assert_eq!(config.site_dir, dir.path().join("site"));
        assert_eq!(config.latex.asset_subdir, "assets/latex");
        assert!(!config.latex.inline_math);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_load_full_config_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"
[build]
source_dir = "content"
site_dir = "public"

[latex]
asset_subdir = "img/math"
latex_cmd = "lualatex -halt-on-error"
dvisvgm_cmd = "dvisvgm --no-fonts --exact"
inline_math = true
"#,
        )
        .unwrap();

        let config = Config::load(dir.path(), &CliSettings::default()).unwrap();

        assert_eq!(config.source_dir, dir.path().join("content"));
        assert_eq!(config.site_dir, dir.path().join("public"));
        assert_eq!(config.latex.asset_subdir, "img/math");
        assert_eq!(config.latex.latex_cmd, "lualatex -halt-on-error");
        assert!(config.latex.inline_math);
        assert_eq!(
            config.config_path.as_deref(),
            Some(dir.path().join(CONFIG_FILENAME).as_path())
        );
    }

    #[test]
    fn test_discovery_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "[build]\nsite_dir = \"out\"\n").unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();

        let config = Config::load(&nested, &CliSettings::default()).unwrap();

        // Relative dirs resolve against the config file's directory.
        assert_eq!(config.site_dir, dir.path().join("out"));
    }

    #[test]
    fn test_cli_settings_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            "[build]\nsource_dir = \"content\"\n",
        )
        .unwrap();

        let cli = CliSettings {
            source_dir: Some(PathBuf::from("/elsewhere/docs")),
            inline_math: Some(true),
            ..CliSettings::default()
        };
        let config = Config::load(dir.path(), &cli).unwrap();

        assert_eq!(config.source_dir, PathBuf::from("/elsewhere/docs"));
        assert!(config.latex.inline_math);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            "[latex]\npdflatex_cmd = \"pdflatex\"\n",
        )
        .unwrap();

        let result = Config::load(dir.path(), &CliSettings::default());

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_invalid_latex_options_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            "[latex]\nasset_subdir = \"../outside\"\n",
        )
        .unwrap();

        let result = Config::load(dir.path(), &CliSettings::default());

        assert!(matches!(result, Err(ConfigError::Options(_))));
    }

    #[test]
    fn test_temp_dir_passed_through() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            "[latex]\ntemp_dir = \"/tmp/mathpress-scratch\"\n",
        )
        .unwrap();

        let config = Config::load(dir.path(), &CliSettings::default()).unwrap();

        assert_eq!(
            config.latex.temp_dir.as_deref(),
            Some(Path::new("/tmp/mathpress-scratch"))
        );
    }
}
