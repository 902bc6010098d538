use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dispatch::archive::DEFAULT_MAX_ENTRY_BYTES;

pub const CONFIG_FILE_VAR: &str = "GBXIO_CONFIG";
pub const OUTPUT_DIR_VAR: &str = "GBXIO_OUTPUT_DIR";
pub const MAX_ENTRY_BYTES_VAR: &str = "GBXIO_MAX_ENTRY_BYTES";
pub const PRETTY_JSON_VAR: &str = "GBXIO_PRETTY_JSON";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} for {var}")]
    InvalidVar { var: &'static str, value: String },
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where `run` writes outputs unless `--out` is given.
    pub output_dir: PathBuf,
    /// Archive entries above this uncompressed size are skipped.
    pub max_entry_bytes: u64,
    pub pretty_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("out"),
            max_entry_bytes: DEFAULT_MAX_ENTRY_BYTES,
            pretty_json: false,
        }
    }
}

impl Config {
    /// Like [`Config::try_from_env`], but falls back to defaults on any error.
    pub fn from_env() -> Self {
        match Self::try_from_env() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = %e, "invalid configuration, using defaults");
                Self::default()
            }
        }
    }

    /// Optional TOML file from `GBXIO_CONFIG`, then environment overrides.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        let mut cfg = match std::env::var(CONFIG_FILE_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(&path))?,
            _ => Self::default(),
        };

        if let Ok(dir) = std::env::var(OUTPUT_DIR_VAR) {
            if !dir.trim().is_empty() {
                cfg.output_dir = PathBuf::from(dir);
            }
        }
        if let Ok(raw) = std::env::var(MAX_ENTRY_BYTES_VAR) {
            cfg.max_entry_bytes = raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
                var: MAX_ENTRY_BYTES_VAR,
                value: raw.clone(),
            })?;
        }
        if let Ok(v) = std::env::var(PRETTY_JSON_VAR) {
            cfg.pretty_json = !v.is_empty();
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entry_bytes < 4 {
            return Err(ConfigError::Invalid(format!(
                "max_entry_bytes must be at least 4, got {}",
                self.max_entry_bytes
            )));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("output_dir must not be empty".into()));
        }
        Ok(())
    }
}
