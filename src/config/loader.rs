use crate::config::schema::{Settings, ValidationError};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming a settings file when `--config` is absent.
pub const CONFIG_ENV_VAR: &str = "INIEDIT_CONFIG";

/// How a settings file was located. Shown in every loading error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsOrigin {
    /// Named directly, e.g. by `--config`.
    File(PathBuf),
    /// Named by [`CONFIG_ENV_VAR`].
    Env(PathBuf),
}

impl SettingsOrigin {
    pub fn path(&self) -> &Path {
        match self {
            SettingsOrigin::File(path) | SettingsOrigin::Env(path) => path,
        }
    }
}

impl fmt::Display for SettingsOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsOrigin::File(path) => write!(f, "{}", path.display()),
            SettingsOrigin::Env(path) => {
                write!(f, "{} (from ${})", path.display(), CONFIG_ENV_VAR)
            }
        }
    }
}

/// Settings text that does not describe valid settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("not valid TOML: {0}")]
    Toml(#[from] toml_edit::de::Error),

    #[error("{0}")]
    Validation(#[from] ValidationError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings file {origin}: {source}")]
    Read {
        origin: SettingsOrigin,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {origin}: {source}")]
    Invalid {
        origin: SettingsOrigin,
        #[source]
        source: SettingsError,
    },
}

impl ConfigError {
    pub fn origin(&self) -> &SettingsOrigin {
        match self {
            ConfigError::Read { origin, .. } | ConfigError::Invalid { origin, .. } => origin,
        }
    }
}

pub fn load_from_str(input: &str) -> Result<Settings, SettingsError> {
    let settings: Settings = toml_edit::de::from_str(input)?;
    settings.validate()?;
    Ok(settings)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    load(SettingsOrigin::File(path.as_ref().to_path_buf()))
}

/// Load the file named by `explicit`, else by `$INIEDIT_CONFIG`, else fall
/// back to defaults.
pub fn load_from_env(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }

    match env::var_os(CONFIG_ENV_VAR) {
        Some(path) if !path.is_empty() => load(SettingsOrigin::Env(PathBuf::from(path))),
        _ => Ok(Settings::default()),
    }
}

fn load(origin: SettingsOrigin) -> Result<Settings, ConfigError> {
    let contents = match fs::read_to_string(origin.path()) {
        Ok(contents) => contents,
        Err(source) => return Err(ConfigError::Read { origin, source }),
    };
    load_from_str(&contents).map_err(|source| ConfigError::Invalid { origin, source })
}
