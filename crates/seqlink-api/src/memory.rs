//! In-process sequencer with a scriptable topology.
//!
//! Behaves like the real service for everything the connector relies on
//! (enumeration order, capability checks on subscribe, duplicate rejection,
//! subscriber counts, announce events) and records every request so tests
//! can assert on exactly what was asked of it. Handles are cheap clones of
//! one shared topology.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use crate::error::Error;
use crate::event::EventKind;
use crate::sequencer::{EventSource, Sequencer};
use crate::types::{Addr, ClientId, ClientKind, ClientRecord, Direction, PortCaps, PortId, PortRecord};
use crate::{SYSTEM_ANNOUNCE_PORT, SYSTEM_CLIENT};

/// Client id given to the local handle by [`MemorySequencer::new`].
pub const LOCAL_CLIENT: ClientId = 128;

#[derive(Default)]
struct Topology {
    clients: Vec<ClientRecord>,
    subscriptions: Vec<(Addr, Addr)>,
    rejected: Vec<(Addr, Addr)>,
    failing_queries: Vec<Addr>,
    pending_enumeration_failures: usize,
    enumerations: usize,
    subscribe_requests: Vec<(Addr, Addr)>,
    listeners: Vec<Sender<Result<EventKind, String>>>,
    closed: bool,
}

impl Topology {
    fn port(&self, addr: Addr) -> Option<&PortRecord> {
        self.clients
            .iter()
            .find(|c| c.id == addr.client)
            .and_then(|c| c.ports.iter().find(|p| p.id == addr.port))
    }

    fn client_mut(&mut self, id: ClientId) -> Option<&mut ClientRecord> {
        self.clients.iter_mut().find(|c| c.id == id)
    }

    fn next_free_port(&self, client: ClientId) -> PortId {
        self.clients
            .iter()
            .find(|c| c.id == client)
            .and_then(|c| c.ports.iter().map(|p| p.id).max())
            .map_or(0, |max| max.saturating_add(1))
    }

    fn subscribe(&mut self, sender: Addr, dest: Addr) -> Result<(), Error> {
        let reject = |reason: &str| Error::Subscribe {
            sender,
            dest,
            reason: reason.to_owned(),
        };

        let Some(src) = self.port(sender) else {
            return Err(reject("no such sender port"));
        };
        let Some(dst) = self.port(dest) else {
            return Err(reject("no such destination port"));
        };
        if !src.caps.contains(PortCaps::SENDER) {
            return Err(reject("sender does not allow read subscriptions"));
        }
        if !dst.caps.contains(PortCaps::RECEIVER) {
            return Err(reject("destination does not allow write subscriptions"));
        }
        if self.rejected.contains(&(sender, dest)) {
            return Err(reject("operation not permitted"));
        }
        if self.subscriptions.contains(&(sender, dest)) {
            return Err(reject("device or resource busy"));
        }

        self.subscriptions.push((sender, dest));
        Ok(())
    }

    fn broadcast(&mut self, item: &Result<EventKind, String>) {
        self.listeners.retain(|tx| tx.send(item.clone()).is_ok());
    }
}

// ── MemorySequencer ──────────────────────────────────────────────────

/// Handle on an in-memory sequencer topology.
#[derive(Clone)]
pub struct MemorySequencer {
    topology: Arc<Mutex<Topology>>,
    client_id: ClientId,
}

impl MemorySequencer {
    /// A topology holding the system client (`Timer`, `Announce`) and an
    /// empty local client named `name` with id [`LOCAL_CLIENT`].
    pub fn new(name: &str) -> Self {
        let system = ClientRecord {
            id: SYSTEM_CLIENT,
            name: "System".into(),
            kind: ClientKind::Kernel,
            ports: vec![
                PortRecord {
                    id: 0,
                    name: "Timer".into(),
                    caps: PortCaps::SENDER | PortCaps::RECEIVER,
                },
                PortRecord {
                    id: SYSTEM_ANNOUNCE_PORT,
                    name: "Announce".into(),
                    caps: PortCaps::SENDER | PortCaps::NO_EXPORT,
                },
            ],
        };
        let local = ClientRecord {
            id: LOCAL_CLIENT,
            name: name.to_owned(),
            kind: ClientKind::User,
            ports: Vec::new(),
        };

        Self {
            topology: Arc::new(Mutex::new(Topology {
                clients: vec![system, local],
                ..Topology::default()
            })),
            client_id: LOCAL_CLIENT,
        }
    }

    // ── Topology scripting ───────────────────────────────────────────

    /// Register a client. Clients enumerate in ascending id order.
    pub fn add_client(&self, id: ClientId, name: &str, kind: ClientKind) -> &Self {
        let mut topo = self.topology.lock();
        topo.clients.retain(|c| c.id != id);
        topo.clients.push(ClientRecord {
            id,
            name: name.to_owned(),
            kind,
            ports: Vec::new(),
        });
        topo.clients.sort_by_key(|c| c.id);
        drop(topo);
        self
    }

    /// Add a port to an existing client. Returns its address.
    ///
    /// # Panics
    ///
    /// Panics if the client has not been added.
    pub fn add_port(&self, client: ClientId, port: PortId, name: &str, caps: PortCaps) -> Addr {
        let mut topo = self.topology.lock();
        let Some(owner) = topo.client_mut(client) else {
            panic!("add_port: client {client} does not exist");
        };
        owner.ports.retain(|p| p.id != port);
        owner.ports.push(PortRecord {
            id: port,
            name: name.to_owned(),
            caps,
        });
        owner.ports.sort_by_key(|p| p.id);
        Addr::new(client, port)
    }

    /// Remove a client, its ports, and every subscription touching them.
    pub fn remove_client(&self, id: ClientId) {
        let mut topo = self.topology.lock();
        topo.clients.retain(|c| c.id != id);
        topo.subscriptions
            .retain(|(s, d)| s.client != id && d.client != id);
    }

    /// Record an existing subscription without going through `subscribe`.
    pub fn connect(&self, sender: Addr, dest: Addr) {
        self.topology.lock().subscriptions.push((sender, dest));
    }

    /// Make every future subscribe request for this pair fail.
    pub fn reject(&self, sender: Addr, dest: Addr) {
        self.topology.lock().rejected.push((sender, dest));
    }

    /// Make subscriber-count queries on `port` fail.
    pub fn fail_queries_for(&self, port: Addr) {
        self.topology.lock().failing_queries.push(port);
    }

    /// Make the next `count` enumerations fail.
    pub fn fail_enumerations(&self, count: usize) {
        self.topology.lock().pending_enumeration_failures = count;
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Deliver an event to every listener.
    pub fn emit(&self, kind: EventKind) {
        self.topology.lock().broadcast(&Ok(kind));
    }

    /// Make every listener's next read fail with `reason`.
    pub fn fail_read(&self, reason: &str) {
        self.topology.lock().broadcast(&Err(reason.to_owned()));
    }

    /// End every listener's stream.
    pub fn end_events(&self) {
        self.topology.lock().listeners.clear();
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// Number of enumerations served, failed ones included.
    pub fn enumerations(&self) -> usize {
        self.topology.lock().enumerations
    }

    /// Every subscribe request received, in order, accepted or not.
    pub fn subscribe_requests(&self) -> Vec<(Addr, Addr)> {
        self.topology.lock().subscribe_requests.clone()
    }

    /// Active subscriptions.
    pub fn subscriptions(&self) -> Vec<(Addr, Addr)> {
        self.topology.lock().subscriptions.clone()
    }

    /// Whether `close` has been called on any handle.
    pub fn is_closed(&self) -> bool {
        self.topology.lock().closed
    }
}

impl Sequencer for MemorySequencer {
    type Events = MemoryEvents;

    fn client_id(&self) -> ClientId {
        self.client_id
    }

    fn enumerate(&self) -> Result<Vec<ClientRecord>, Error> {
        let mut topo = self.topology.lock();
        if topo.closed {
            return Err(Error::Closed);
        }
        topo.enumerations += 1;
        if topo.pending_enumeration_failures > 0 {
            topo.pending_enumeration_failures -= 1;
            return Err(Error::Enumerate {
                reason: "client vanished during scan".into(),
            });
        }
        Ok(topo.clients.clone())
    }

    fn create_port(&self, name: &str, caps: PortCaps) -> Result<PortId, Error> {
        let mut topo = self.topology.lock();
        if topo.closed {
            return Err(Error::Closed);
        }
        let id = topo.next_free_port(self.client_id);
        let Some(local) = topo.client_mut(self.client_id) else {
            return Err(Error::CreatePort {
                name: name.to_owned(),
                reason: "local client is gone".into(),
            });
        };
        local.ports.push(PortRecord {
            id,
            name: name.to_owned(),
            caps,
        });
        Ok(id)
    }

    fn subscribe(&self, sender: Addr, dest: Addr) -> Result<(), Error> {
        let mut topo = self.topology.lock();
        if topo.closed {
            return Err(Error::Closed);
        }
        topo.subscribe_requests.push((sender, dest));
        topo.subscribe(sender, dest)
    }

    fn subscription_count(&self, port: Addr, direction: Direction) -> Result<usize, Error> {
        let topo = self.topology.lock();
        if topo.closed {
            return Err(Error::Closed);
        }
        if topo.failing_queries.contains(&port) || topo.port(port).is_none() {
            return Err(Error::QuerySubscriptions {
                port,
                direction,
                reason: "no such port".into(),
            });
        }
        let count = topo
            .subscriptions
            .iter()
            .filter(|(sender, dest)| match direction {
                Direction::Outgoing => *sender == port,
                Direction::Incoming => *dest == port,
            })
            .count();
        Ok(count)
    }

    fn listen(&mut self, port_name: &str) -> Result<MemoryEvents, Error> {
        let port = self.create_port(port_name, PortCaps::RECEIVER)?;
        let announce = Addr::new(SYSTEM_CLIENT, SYSTEM_ANNOUNCE_PORT);
        self.subscribe(announce, Addr::new(self.client_id, port))?;

        let (tx, rx) = crossbeam_channel::unbounded();
        self.topology.lock().listeners.push(tx);
        Ok(MemoryEvents { rx })
    }

    fn close(&mut self) {
        let mut topo = self.topology.lock();
        topo.closed = true;
        topo.listeners.clear();
    }
}

// ── MemoryEvents ─────────────────────────────────────────────────────

/// Event stream fed by [`MemorySequencer::emit`].
pub struct MemoryEvents {
    rx: Receiver<Result<EventKind, String>>,
}

impl EventSource for MemoryEvents {
    fn next_event(&mut self) -> Result<EventKind, Error> {
        match self.rx.recv() {
            Ok(Ok(kind)) => Ok(kind),
            Ok(Err(reason)) => Err(Error::EventInput { reason }),
            Err(_) => Err(Error::EventStreamClosed),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn topology() -> (MemorySequencer, Addr, Addr) {
        let seq = MemorySequencer::new("test");
        seq.add_client(20, "Keyboard", ClientKind::Kernel);
        seq.add_client(24, "Synth", ClientKind::Kernel);
        let out = seq.add_port(20, 0, "Keys", PortCaps::SENDER);
        let inp = seq.add_port(24, 0, "Synth In", PortCaps::RECEIVER);
        (seq, out, inp)
    }

    #[test]
    fn enumerates_in_client_order() {
        let (seq, _, _) = topology();
        let ids: Vec<_> = seq.enumerate().unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![0, 20, 24, LOCAL_CLIENT]);
        assert_eq!(seq.enumerations(), 1);
    }

    #[test]
    fn subscribe_counts_both_sides() {
        let (seq, out, inp) = topology();
        seq.subscribe(out, inp).unwrap();

        assert_eq!(seq.subscription_count(out, Direction::Outgoing).unwrap(), 1);
        assert_eq!(seq.subscription_count(out, Direction::Incoming).unwrap(), 0);
        assert_eq!(seq.subscription_count(inp, Direction::Incoming).unwrap(), 1);
    }

    #[test]
    fn duplicate_subscription_is_rejected() {
        let (seq, out, inp) = topology();
        seq.subscribe(out, inp).unwrap();
        let err = seq.subscribe(out, inp).unwrap_err();
        assert!(matches!(err, Error::Subscribe { .. }));
        assert_eq!(seq.subscribe_requests().len(), 2);
        assert_eq!(seq.subscriptions().len(), 1);
    }

    #[test]
    fn incompatible_endpoints_are_rejected() {
        let (seq, out, inp) = topology();
        assert!(seq.subscribe(inp, out).is_err());
        assert!(seq.subscribe(out, Addr::new(99, 0)).is_err());
        assert!(seq.subscriptions().is_empty());
    }

    #[test]
    fn scripted_enumeration_failures() {
        let (seq, _, _) = topology();
        seq.fail_enumerations(1);
        assert!(matches!(seq.enumerate(), Err(Error::Enumerate { .. })));
        assert!(seq.enumerate().is_ok());
        assert_eq!(seq.enumerations(), 2);
    }

    #[test]
    fn listen_routes_announcements() {
        let (mut seq, _, _) = topology();
        let mut events = seq.listen("Listener").unwrap();

        let local = seq
            .enumerate()
            .unwrap()
            .into_iter()
            .find(|c| c.id == LOCAL_CLIENT)
            .unwrap();
        assert_eq!(local.ports[0].name, "Listener");
        assert_eq!(
            seq.subscriptions(),
            vec![(Addr::new(0, 1), Addr::new(LOCAL_CLIENT, 0))]
        );

        seq.emit(EventKind::PortStart);
        assert_eq!(events.next_event().unwrap(), EventKind::PortStart);

        seq.fail_read("No space left on device");
        assert!(matches!(events.next_event(), Err(Error::EventInput { .. })));

        seq.end_events();
        assert!(matches!(events.next_event(), Err(Error::EventStreamClosed)));
    }

    #[test]
    fn closed_handle_refuses_work() {
        let (mut seq, out, inp) = topology();
        seq.close();
        seq.close();
        assert!(seq.is_closed());
        assert!(matches!(seq.enumerate(), Err(Error::Closed)));
        assert!(matches!(seq.subscribe(out, inp), Err(Error::Closed)));
    }

    #[test]
    fn removing_a_client_drops_its_subscriptions() {
        let (seq, out, inp) = topology();
        seq.connect(out, inp);
        seq.remove_client(24);
        assert!(seq.subscriptions().is_empty());
        assert_eq!(seq.subscription_count(out, Direction::Outgoing).unwrap(), 0);
    }
}
