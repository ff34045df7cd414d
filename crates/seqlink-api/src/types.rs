// ── Wire-level sequencer types ──
//
// Plain records as the service reports them. `seqlink-core` converts
// these into its own domain model.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::warn;

/// Sequencer client number.
pub type ClientId = u8;

/// Port number, unique within its client.
pub type PortId = u8;

/// Client numbers from here on are handed out to user-space applications;
/// everything below belongs to kernel drivers.
pub const FIRST_USER_CLIENT: ClientId = 128;

// ── Addr ─────────────────────────────────────────────────────────────

/// Address of a port on the sequencer: `client:port`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Addr {
    pub client: ClientId,
    pub port: PortId,
}

impl Addr {
    pub const fn new(client: ClientId, port: PortId) -> Self {
        Self { client, port }
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.client, self.port)
    }
}

// ── PortCaps ─────────────────────────────────────────────────────────

bitflags! {
    /// Port capability bits, with the values the sequencer uses.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct PortCaps: u32 {
        const READ       = 1 << 0;
        const WRITE      = 1 << 1;
        const SYNC_READ  = 1 << 2;
        const SYNC_WRITE = 1 << 3;
        const DUPLEX     = 1 << 4;
        const SUBS_READ  = 1 << 5;
        const SUBS_WRITE = 1 << 6;
        const NO_EXPORT  = 1 << 7;
    }
}

impl PortCaps {
    /// Readable and open to read subscriptions: usable as a connection source.
    pub const SENDER: Self = Self::READ.union(Self::SUBS_READ);

    /// Writable and open to write subscriptions: usable as a connection destination.
    pub const RECEIVER: Self = Self::WRITE.union(Self::SUBS_WRITE);

    /// Names of the set flags, lowest bit first.
    pub fn names(self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

// ── ClientKind ───────────────────────────────────────────────────────

/// Whether a client is an application or a kernel driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    User,
    Kernel,
}

// ── Direction ────────────────────────────────────────────────────────

/// Which side of a subscription a port is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The port is the sender.
    Outgoing,
    /// The port is the destination.
    Incoming,
}

// ── Enumeration records ──────────────────────────────────────────────

/// A port as reported by enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRecord {
    pub id: PortId,
    pub name: String,
    pub caps: PortCaps,
}

/// A client and its ports as reported by enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: ClientId,
    pub name: String,
    pub kind: ClientKind,
    pub ports: Vec<PortRecord>,
}

// ── Building records from raw enumeration data ───────────────────────
//
// One unreadable entry must not spoil the whole scan: an out-of-range id or
// a name that is not valid UTF-8 drops that entry with a warning.

impl PortRecord {
    pub fn from_raw<E: fmt::Display>(
        client: i32,
        raw_id: i32,
        name: Result<&str, E>,
        caps: u32,
    ) -> Option<Self> {
        let Ok(id) = PortId::try_from(raw_id) else {
            warn!(client, port = raw_id, "skipping port with out-of-range id");
            return None;
        };
        let name = match name {
            Ok(name) => name.to_owned(),
            Err(e) => {
                warn!(client, port = raw_id, error = %e, "skipping port with unreadable name");
                return None;
            }
        };

        Some(Self {
            id,
            name,
            caps: PortCaps::from_bits_truncate(caps),
        })
    }
}

impl ClientRecord {
    /// The client is dropped, ports included, if its own id or name is
    /// unusable.
    pub fn from_raw<E: fmt::Display>(
        raw_id: i32,
        name: Result<&str, E>,
        ports: Vec<PortRecord>,
    ) -> Option<Self> {
        let Ok(id) = ClientId::try_from(raw_id) else {
            warn!(client = raw_id, "skipping client with out-of-range id");
            return None;
        };
        let name = match name {
            Ok(name) => name.to_owned(),
            Err(e) => {
                warn!(client = raw_id, error = %e, "skipping client with unreadable name");
                return None;
            }
        };
        let kind = if id < FIRST_USER_CLIENT {
            ClientKind::Kernel
        } else {
            ClientKind::User
        };

        Some(Self {
            id,
            name,
            kind,
            ports,
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn caps_bits_match_sequencer_values() {
        assert_eq!(PortCaps::READ.bits(), 0x01);
        assert_eq!(PortCaps::SUBS_READ.bits(), 0x20);
        assert_eq!(PortCaps::SUBS_WRITE.bits(), 0x40);
        assert_eq!(PortCaps::NO_EXPORT.bits(), 0x80);
        assert_eq!(PortCaps::all().bits(), 0xff);
    }

    #[test]
    fn caps_names_in_bit_order() {
        let caps = PortCaps::SUBS_WRITE | PortCaps::READ | PortCaps::DUPLEX;
        assert_eq!(caps.names(), vec!["READ", "DUPLEX", "SUBS_WRITE"]);
        assert!(PortCaps::empty().names().is_empty());
    }

    #[test]
    fn addr_display() {
        assert_eq!(Addr::new(128, 0).to_string(), "128:0");
    }

    #[test]
    fn unreadable_names_drop_only_their_entry() {
        let bad_utf8: Result<&str, String> = Err("invalid utf-8 sequence".into());

        let ports: Vec<PortRecord> = [
            PortRecord::from_raw(20, 0, Ok::<_, String>("UM-2G MIDI 1"), 0x21),
            PortRecord::from_raw(20, 1, bad_utf8.clone(), 0x42),
            PortRecord::from_raw(20, 300, Ok::<_, String>("Too high"), 0x42),
        ]
        .into_iter()
        .flatten()
        .collect();
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].name, "UM-2G MIDI 1");
        assert_eq!(ports[0].caps, PortCaps::SENDER);

        let client = ClientRecord::from_raw(20, Ok::<_, String>("UM-2G"), ports).unwrap();
        assert_eq!(client.kind, ClientKind::Kernel);
        assert_eq!(client.ports.len(), 1);

        assert!(ClientRecord::from_raw(24, bad_utf8, Vec::new()).is_none());
        assert!(ClientRecord::from_raw(-1, Ok::<_, String>("Ghost"), Vec::new()).is_none());
        let app = ClientRecord::from_raw(128, Ok::<_, String>("seqlink"), Vec::new()).unwrap();
        assert_eq!(app.kind, ClientKind::User);
    }

    #[test]
    fn client_kind_strings() {
        assert_eq!(ClientKind::Kernel.to_string(), "kernel");
        assert_eq!("user".parse::<ClientKind>().ok(), Some(ClientKind::User));
    }
}
