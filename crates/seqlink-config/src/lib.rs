//! Configuration for seqlink.
//!
//! Layered TOML + environment loading, the two-column pairs file, and
//! translation to `seqlink_core::ConnectorConfig`. The binary applies its
//! command-line overrides on top.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use seqlink_core::config::{DEFAULT_CLIENT_NAME, DEFAULT_LISTENER_PORT};
use seqlink_core::{ConnectorConfig, DesiredPair};

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "SEQLINK_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("pairs file not found: {}", path.display())]
    PairsNotFound { path: PathBuf },

    #[error("malformed pairs file {}, line {line}: {reason}", path.display())]
    MalformedPairs {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Client name registered with the sequencer.
    #[serde(default = "default_client_name")]
    pub client_name: String,

    /// Port created to receive lifecycle announcements.
    #[serde(default = "default_listener_port")]
    pub listener_port: String,

    /// Pairs file read in addition to `pairs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairs_file: Option<PathBuf>,

    /// Port pairs to keep connected.
    #[serde(default)]
    pub pairs: Vec<DesiredPair>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_name: default_client_name(),
            listener_port: default_listener_port(),
            pairs_file: None,
            pairs: Vec::new(),
        }
    }
}

fn default_client_name() -> String {
    DEFAULT_CLIENT_NAME.into()
}
fn default_listener_port() -> String {
    DEFAULT_LISTENER_PORT.into()
}

impl Config {
    /// Reject names the sequencer would refuse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_name("client_name", &self.client_name)?;
        check_name("listener_port", &self.listener_port)
    }

    /// Connector configuration with `extra` pairs appended after the
    /// configured ones.
    pub fn into_connector_config(self, extra: Vec<DesiredPair>) -> ConnectorConfig {
        let mut pairs = self.pairs;
        pairs.extend(extra);
        ConnectorConfig {
            client_name: self.client_name,
            listener_port: self.listener_port,
            pairs,
        }
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn check_name(field: &str, value: &str) -> Result<(), ConfigError> {
    let reason = if value.trim().is_empty() {
        "must not be empty"
    } else if value.contains('\0') {
        "must not contain NUL bytes"
    } else {
        return Ok(());
    };
    Err(ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    })
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "seqlink").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("seqlink");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from defaults, the TOML file and the environment.
///
/// An explicit `path` must exist; the default location may be absent.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(p) if !p.exists() => {
            return Err(ConfigError::ConfigNotFound {
                path: p.to_path_buf(),
            });
        }
        Some(p) => p.to_path_buf(),
        None => config_path(),
    };
    debug!(path = %path.display(), "loading config");

    let config: Config = figment(&path).extract()?;
    config.validate()?;
    Ok(config)
}

fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
}

// ── Pairs file ──────────────────────────────────────────────────────

/// Read a pairs file: two columns (source, destination), no header.
///
/// Any row without exactly two fields rejects the whole file.
pub fn load_pairs_csv(path: &Path) -> Result<Vec<DesiredPair>, ConfigError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConfigError::PairsNotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Io(e),
    })?;

    let pairs = read_pairs(file, path)?;
    debug!(path = %path.display(), pairs = pairs.len(), "loaded pairs file");
    Ok(pairs)
}

fn read_pairs<R: Read>(reader: R, path: &Path) -> Result<Vec<DesiredPair>, ConfigError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let malformed = |line: u64, reason: String| ConfigError::MalformedPairs {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let mut pairs = Vec::new();
    for record in csv.records() {
        let record = record.map_err(|e| {
            let line = e.position().map_or(0, csv::Position::line);
            malformed(line, e.to_string())
        })?;
        let line = record.position().map_or(0, csv::Position::line);

        match (record.len(), record.get(0), record.get(1)) {
            (2, Some(source), Some(destination)) => {
                pairs.push(DesiredPair::new(source, destination));
            }
            (fields, _, _) => {
                return Err(malformed(
                    line,
                    format!("expected 2 fields, found {fields}"),
                ));
            }
        }
    }

    Ok(pairs)
}

// ── Tests ───────────────────────────────────────────────────────────
