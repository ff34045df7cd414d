//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use seqlink_config::ConfigError;
use seqlink_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Sequencer ────────────────────────────────────────────────────
    #[error("Cannot open the ALSA sequencer")]
    #[diagnostic(
        code(seqlink::sequencer_unavailable),
        help(
            "{reason}\n\
             Check that the snd-seq kernel module is loaded, /dev/snd/seq exists,\n\
             and your user may access it (usually via the audio group)."
        )
    )]
    SequencerUnavailable { reason: String },

    #[error("This build of seqlink has no {backend} support")]
    #[diagnostic(
        code(seqlink::backend_unavailable),
        help("Rebuild with: cargo install seqlink --features {backend}")
    )]
    BackendUnavailable { backend: &'static str },

    #[error("Cannot listen for sequencer announcements")]
    #[diagnostic(
        code(seqlink::listener),
        help(
            "{reason}\n\
             The listener port must be creatable and subscribable to the system announce port."
        )
    )]
    ListenerSetup { reason: String },

    #[error("Lost the connection to the sequencer")]
    #[diagnostic(code(seqlink::disconnected))]
    Disconnected,

    #[error("Cannot read the sequencer state: {reason}")]
    #[diagnostic(code(seqlink::refresh_failed), help("Clients may be changing rapidly; try again."))]
    RefreshFailed { reason: String },

    // ── Pairs ────────────────────────────────────────────────────────
    #[error("No port pairs specified")]
    #[diagnostic(
        code(seqlink::no_pairs),
        help(
            "Pass a pairs file with --pairs (-f), add [[pairs]] tables or pairs_file to the\n\
             config file, or use --info (-i) to only print the sequencer state."
        )
    )]
    NoPairs,

    #[error("Pairs file not found: {path}")]
    #[diagnostic(code(seqlink::pairs_not_found))]
    PairsNotFound { path: String },

    #[error("Malformed pairs file at line {line}: {reason}")]
    #[diagnostic(
        code(seqlink::malformed_pairs),
        help(
            "File: {path}\n\
             Each line must hold exactly two comma-separated port names: source,destination"
        )
    )]
    MalformedPairs {
        path: String,
        line: u64,
        reason: String,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(seqlink::no_config),
        help("Omit --config to use the default location, or create the file.")
    )]
    NoConfig { path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(seqlink::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(seqlink::config))]
    Config(Box<figment::Error>),

    // ── Internal / IO ────────────────────────────────────────────────
    #[error("Internal error: {message}")]
    #[diagnostic(code(seqlink::internal))]
    Internal { message: String },

    #[error("Cannot render {format} output: {reason}")]
    #[diagnostic(code(seqlink::render))]
    Render { format: &'static str, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SequencerUnavailable { .. }
            | Self::BackendUnavailable { .. }
            | Self::ListenerSetup { .. }
            | Self::Disconnected => exit_code::CONNECTION,
            Self::NoPairs | Self::Validation { .. } => exit_code::USAGE,
            Self::PairsNotFound { .. } | Self::NoConfig { .. } => exit_code::NOT_FOUND,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SequencerUnavailable { reason } => CliError::SequencerUnavailable { reason },
            CoreError::BackendUnavailable { backend } => CliError::BackendUnavailable { backend },
            CoreError::ListenerSetup { reason } => CliError::ListenerSetup { reason },
            CoreError::Disconnected => CliError::Disconnected,
            CoreError::RefreshFailed { reason } => CliError::RefreshFailed { reason },
            other @ (CoreError::PortNotFound { .. }
            | CoreError::QueryFailed { .. }
            | CoreError::ConnectFailed { .. }
            | CoreError::Internal(_)) => CliError::Internal {
                message: other.to_string(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ConfigNotFound { path } => CliError::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::PairsNotFound { path } => CliError::PairsNotFound {
                path: path.display().to_string(),
            },
            ConfigError::MalformedPairs { path, line, reason } => CliError::MalformedPairs {
                path: path.display().to_string(),
                line,
                reason,
            },
            ConfigError::Figment(err) => CliError::Config(err),
            ConfigError::Serialization(err) => CliError::Render {
                format: "toml",
                reason: err.to_string(),
            },
            ConfigError::Io(err) => CliError::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn setup_failures_map_to_exit_codes() {
        let open: CliError = CoreError::SequencerUnavailable {
            reason: "No such file or directory".into(),
        }
        .into();
        assert_eq!(open.exit_code(), exit_code::CONNECTION);

        let missing: CliError = ConfigError::PairsNotFound {
            path: PathBuf::from("pairs.csv"),
        }
        .into();
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let malformed: CliError = ConfigError::MalformedPairs {
            path: PathBuf::from("pairs.csv"),
            line: 3,
            reason: "expected 2 fields, found 1".into(),
        }
        .into();
        assert_eq!(malformed.exit_code(), exit_code::GENERAL);
        assert_eq!(CliError::NoPairs.exit_code(), exit_code::USAGE);
    }
}
