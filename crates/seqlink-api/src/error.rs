use thiserror::Error;

use crate::types::{Addr, Direction};

/// Top-level error type for the `seqlink-api` crate.
///
/// Covers every failure mode of the sequencer client surface: opening the
/// handle, enumeration, port creation, subscriptions and event input.
/// `seqlink-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Handle lifecycle ────────────────────────────────────────────
    /// The sequencer device could not be opened or configured.
    #[error("Cannot open sequencer: {reason}")]
    Open { reason: String },

    /// The handle was closed and can no longer be used.
    #[error("Sequencer handle is closed")]
    Closed,

    /// A name contained an interior NUL byte.
    #[error("Invalid name {name:?}: names must not contain NUL bytes")]
    InvalidName { name: String },

    /// The service was built without support for this backend.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(&'static str),

    // ── Queries ─────────────────────────────────────────────────────
    /// Client/port enumeration failed mid-scan.
    #[error("Enumeration failed: {reason}")]
    Enumerate { reason: String },

    /// Counting the subscribers of a port failed.
    #[error("Cannot query {direction} subscriptions of {port}: {reason}")]
    QuerySubscriptions {
        port: Addr,
        direction: Direction,
        reason: String,
    },

    // ── Mutations ───────────────────────────────────────────────────
    /// Port creation was refused.
    #[error("Cannot create port {name:?}: {reason}")]
    CreatePort { name: String, reason: String },

    /// A subscription request was rejected (endpoints invalid,
    /// incompatible, or already connected).
    #[error("Cannot subscribe {sender} -> {dest}: {reason}")]
    Subscribe {
        sender: Addr,
        dest: Addr,
        reason: String,
    },

    // ── Events ──────────────────────────────────────────────────────
    /// Reading the next event failed.
    #[error("Event input failed: {reason}")]
    EventInput { reason: String },

    /// The event stream has ended; no further events will arrive.
    #[error("Event stream closed")]
    EventStreamClosed,

    /// The service reported an event type code outside the known set.
    #[error("Unknown event type code {0}")]
    UnknownEventType(u8),
}

impl Error {
    /// Returns `true` if the handle or stream is gone for good.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed | Self::EventStreamClosed)
    }
}
