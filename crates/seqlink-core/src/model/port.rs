use serde::Serialize;

use seqlink_api::{Addr, ClientId, ClientKind, PortCaps, PortId};

/// A sequencer client as of one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub kind: ClientKind,
    pub ports: Vec<Port>,
}

/// A port as of one snapshot.
///
/// `client` is the owning client's id. Connection state is deliberately
/// absent: it is queried from the service every time it matters (see
/// [`crate::predicates`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Port {
    pub client: ClientId,
    pub id: PortId,
    pub name: String,
    pub caps: PortCaps,
}

impl Port {
    pub fn addr(&self) -> Addr {
        Addr::new(self.client, self.id)
    }
}
