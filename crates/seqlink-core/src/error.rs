// ── Core error types ──
//
// Domain errors surfaced by seqlink-core. Consumers never see raw service
// errors: the `From<seqlink_api::Error>` impl folds them into the variants
// below, keyed by what went wrong rather than which call failed.

use thiserror::Error;

use seqlink_api::Addr;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Sequencer errors ─────────────────────────────────────────────
    #[error("Cannot open sequencer: {reason}")]
    SequencerUnavailable { reason: String },

    #[error("Sequencer backend not available: {backend} support was not built in")]
    BackendUnavailable { backend: &'static str },

    #[error("Sequencer disconnected")]
    Disconnected,

    #[error("Cannot set up event listener: {reason}")]
    ListenerSetup { reason: String },

    // ── State errors ─────────────────────────────────────────────────
    #[error("Refresh failed, keeping previous snapshot: {reason}")]
    RefreshFailed { reason: String },

    #[error("Port not found: {addr}")]
    PortNotFound { addr: Addr },

    #[error("Cannot query subscriptions of {port}: {reason}")]
    QueryFailed { port: Addr, reason: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect {sender} to {destination}: {reason}")]
    ConnectFailed {
        sender: Addr,
        destination: Addr,
        reason: String,
    },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from service errors ───────────────────────────────────

impl From<seqlink_api::Error> for CoreError {
    fn from(err: seqlink_api::Error) -> Self {
        use seqlink_api::Error as Api;

        match err {
            Api::Open { reason } => CoreError::SequencerUnavailable { reason },
            Api::InvalidName { name } => CoreError::SequencerUnavailable {
                reason: format!("invalid name {name:?}"),
            },
            Api::BackendUnavailable(backend) => CoreError::BackendUnavailable { backend },
            Api::Closed | Api::EventStreamClosed => CoreError::Disconnected,
            Api::Enumerate { reason } => CoreError::RefreshFailed { reason },
            Api::QuerySubscriptions { port, reason, .. } => CoreError::QueryFailed { port, reason },
            Api::CreatePort { name, reason } => CoreError::ListenerSetup {
                reason: format!("port {name:?}: {reason}"),
            },
            Api::Subscribe {
                sender,
                dest,
                reason,
            } => CoreError::ConnectFailed {
                sender,
                destination: dest,
                reason,
            },
            Api::EventInput { reason } => CoreError::Internal(format!("event input: {reason}")),
            Api::UnknownEventType(code) => {
                CoreError::Internal(format!("unknown event type code {code}"))
            }
        }
    }
}
