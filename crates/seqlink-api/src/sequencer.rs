// ── Sequencer service traits ──
//
// The operations the connector consumes from the sequencer. Backends
// implement these; the core is generic over them.

use crate::error::Error;
use crate::event::EventKind;
use crate::types::{Addr, ClientId, ClientRecord, Direction, PortCaps, PortId};

/// A duplex client connection to the sequencer.
///
/// All calls are synchronous round-trips to a local service. A handle is
/// used by one caller at a time; it is `Send` so it can move into the task
/// that owns it, but it is never shared.
pub trait Sequencer: Send {
    /// Blocking stream of lifecycle events produced by [`listen`](Self::listen).
    type Events: EventSource + 'static;

    /// Client id the sequencer assigned to this handle.
    fn client_id(&self) -> ClientId;

    /// Enumerate every client and, for each, every port.
    ///
    /// The service gives no transactional guarantee: clients may come and go
    /// while the scan runs. A failure aborts the whole enumeration.
    fn enumerate(&self) -> Result<Vec<ClientRecord>, Error>;

    /// Create a port on the local client.
    fn create_port(&self, name: &str, caps: PortCaps) -> Result<PortId, Error>;

    /// Subscribe `dest` to events from `sender`.
    fn subscribe(&self, sender: Addr, dest: Addr) -> Result<(), Error>;

    /// Number of active subscriptions where `port` is on the given side.
    fn subscription_count(&self, port: Addr, direction: Direction) -> Result<usize, Error>;

    /// Create a listener port, route the system announce port into it, and
    /// return the blocking event stream it feeds.
    fn listen(&mut self, port_name: &str) -> Result<Self::Events, Error>;

    /// Release the handle. Calling it again is a no-op.
    fn close(&mut self);
}

/// Blocking source of sequencer events.
pub trait EventSource: Send {
    /// Block until the next event arrives.
    ///
    /// Returns [`Error::EventStreamClosed`] once no more events can arrive.
    fn next_event(&mut self) -> Result<EventKind, Error>;
}
