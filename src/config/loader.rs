use crate::config::schema::{CompilerConfig, ValidationError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked up in the source directory.
pub const CONFIG_FILE_NAME: &str = "variants.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read compiler config from {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to parse compiler config TOML{}: {source}", origin(path.as_deref()))]
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },

    #[error("invalid compiler config{}: {source}", origin(path.as_deref()))]
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

fn origin(path: Option<&Path>) -> String {
    path.map(|p| format!(" ({})", p.display())).unwrap_or_default()
}

fn parse(input: &str, path: Option<&Path>) -> Result<CompilerConfig, ConfigError> {
    let origin_path = || path.map(Path::to_path_buf);

    let config: CompilerConfig =
        toml_edit::de::from_str(input).map_err(|source| ConfigError::Toml {
            path: origin_path(),
            source,
        })?;
    config
        .validate()
        .map_err(|source| ConfigError::Validation {
            path: origin_path(),
            source,
        })?;

    Ok(config)
}

pub fn load_from_str(input: &str) -> Result<CompilerConfig, ConfigError> {
    parse(input, None)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<CompilerConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents, Some(path))
}

/// Load `variants.toml` from `dir` if present, otherwise use the defaults.
///
/// Returns the path the config was read from, if any.
pub fn load_or_default(dir: &Path) -> Result<(CompilerConfig, Option<PathBuf>), ConfigError> {
    let candidate = dir.join(CONFIG_FILE_NAME);
    if candidate.is_file() {
        let config = load_from_path(&candidate)?;
        return Ok((config, Some(candidate)));
    }
    Ok((CompilerConfig::default(), None))
}
