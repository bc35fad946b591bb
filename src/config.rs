//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/evtree/evtree.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `EVTREE_*` prefix

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Config, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

/// Default nesting limit applied when decoding files.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("environment override: {0}")]
    Environment(#[from] config::ConfigError),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// How `show` prints a decoded tree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    /// Box-drawing rendering
    #[default]
    Tree,
    /// One encoded token per line
    Array,
    /// Encoded tokens as a JSON array
    Json,
}

impl fmt::Display for OutputStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputStyle::Tree => "tree",
            OutputStyle::Array => "array",
            OutputStyle::Json => "json",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tree" => Ok(OutputStyle::Tree),
            "array" => Ok(OutputStyle::Array),
            "json" => Ok(OutputStyle::Json),
            _ => Err(ConfigError::InvalidValue {
                key: "style".into(),
                value: s.into(),
            }),
        }
    }
}

/// Unified configuration for evtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Output style for `show`
    pub style: OutputStyle,
    /// Maximum nesting accepted when decoding
    pub max_depth: usize,
    /// Colored terminal output
    pub color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            style: OutputStyle::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            color: true,
        }
    }
}

/// Raw settings for intermediate parsing (None means "not specified, inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub style: Option<OutputStyle>,
    pub max_depth: Option<usize>,
    pub color: Option<bool>,
}

/// Get the XDG config directory for evtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "evtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("evtree.toml"))
}

/// Boolean spellings accepted from the environment.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            style: overlay.style.unwrap_or(self.style),
            max_depth: overlay.max_depth.unwrap_or(self.max_depth),
            color: overlay.color.unwrap_or(self.color),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Optional config file given on the command line; unlike the
    ///   global file it must exist.
    #[instrument(level = "debug")]
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let global = global_config_path().filter(|p| p.exists());
        Self::load_from(global.as_deref(), explicit)
    }

    /// Same as [`Settings::load`] with the global file location supplied by the caller.
    pub fn load_from(global: Option<&Path>, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut current = Self::default();

        if let Some(path) = global {
            current = current.merge_with(&load_raw_settings(path)?);
        }
        if let Some(path) = explicit {
            current = current.merge_with(&load_raw_settings(path)?);
        }

        current = Self::apply_env_overrides(current)?;
        debug!(?current, "settings loaded");
        Ok(current)
    }

    /// Apply EVTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("EVTREE"))
            .build()?;

        if let Ok(val) = config.get_string("style") {
            settings.style = val.parse()?;
        }
        if let Ok(val) = config.get_string("max_depth") {
            settings.max_depth = val.parse().map_err(|_| ConfigError::InvalidValue {
                key: "max_depth".into(),
                value: val,
            })?;
        }
        if let Ok(val) = config.get_string("color") {
            settings.color = parse_flag(&val).ok_or(ConfigError::InvalidValue {
                key: "color".into(),
                value: val,
            })?;
        }

        Ok(settings)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
