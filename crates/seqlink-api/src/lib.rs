// seqlink-api: client surface of the ALSA MIDI sequencer.
//
// Everything the rest of the workspace knows about the sequencer goes
// through the `Sequencer` and `EventSource` traits defined here.

pub mod error;
pub mod event;
pub mod sequencer;
pub mod types;

#[cfg(feature = "alsa")]
pub mod alsa;

#[cfg(any(test, feature = "memory"))]
pub mod memory;

pub use error::Error;
pub use event::EventKind;
pub use sequencer::{EventSource, Sequencer};
pub use types::{Addr, ClientId, ClientKind, ClientRecord, Direction, PortCaps, PortId, PortRecord};

/// Client id of the sequencer's own system client.
pub const SYSTEM_CLIENT: ClientId = 0;

/// Port on the system client that broadcasts client/port lifecycle events.
pub const SYSTEM_ANNOUNCE_PORT: PortId = 1;
