// ── Service-to-domain conversions ──
//
// Enumeration records become snapshot entities. Each port learns the id of
// the client that owns it.

use seqlink_api::{ClientRecord, PortRecord};

use crate::model::{Client, Port};

impl From<ClientRecord> for Client {
    fn from(record: ClientRecord) -> Self {
        let id = record.id;
        Self {
            id,
            name: record.name,
            kind: record.kind,
            ports: record
                .ports
                .into_iter()
                .map(|port| port_from_record(id, port))
                .collect(),
        }
    }
}

fn port_from_record(client: seqlink_api::ClientId, record: PortRecord) -> Port {
    Port {
        client,
        id: record.id,
        name: record.name,
        caps: record.caps,
    }
}

#[cfg(test)]
mod tests {
    use seqlink_api::{Addr, ClientKind, PortCaps};

    use super::*;

    #[test]
    fn ports_point_back_at_their_client() {
        let record = ClientRecord {
            id: 20,
            name: "UM-2G".into(),
            kind: ClientKind::Kernel,
            ports: vec![
                PortRecord {
                    id: 0,
                    name: "UM-2G MIDI 1".into(),
                    caps: PortCaps::SENDER | PortCaps::RECEIVER,
                },
                PortRecord {
                    id: 1,
                    name: "UM-2G MIDI 2".into(),
                    caps: PortCaps::RECEIVER,
                },
            ],
        };

        let client = Client::from(record);
        assert_eq!(client.ports.len(), 2);
        assert!(client.ports.iter().all(|p| p.client == 20));
        assert_eq!(client.ports[1].addr(), Addr::new(20, 1));
    }
}
