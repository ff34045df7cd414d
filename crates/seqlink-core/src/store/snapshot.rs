use seqlink_api::{ClientId, PortId};

use crate::model::{Client, Port};

/// Clients and ports as reported by one enumeration.
///
/// Within a snapshot, (client id, port id) identifies at most one port.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    clients: Vec<Client>,
}

impl Snapshot {
    pub(crate) fn new(clients: Vec<Client>) -> Self {
        Self { clients }
    }

    /// Clients in enumeration order.
    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    /// Every port of every client, in enumeration order.
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.clients.iter().flat_map(|c| c.ports.iter())
    }

    pub fn find_port(&self, client: ClientId, port: PortId) -> Option<&Port> {
        self.clients
            .iter()
            .find(|c| c.id == client)
            .and_then(|c| c.ports.iter().find(|p| p.id == port))
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
