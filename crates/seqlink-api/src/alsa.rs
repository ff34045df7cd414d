//! ALSA sequencer backend.
//!
//! Wraps `alsa::seq::Seq`. Two handles are used per process: the query
//! handle returned by [`AlsaSequencer::open`], and a dedicated input handle
//! opened by [`listen`](Sequencer::listen) so that blocking on event input
//! never stalls enumeration or subscription requests.

use std::ffi::{CStr, CString};

use alsa::seq::{
    self as aseq, ClientIter, PortCap, PortIter, PortSubscribe, PortSubscribeIter, PortType,
    QuerySubsType, Seq,
};
use tracing::debug;

use crate::error::Error;
use crate::event::EventKind;
use crate::sequencer::{EventSource, Sequencer};
use crate::types::{Addr, ClientId, ClientRecord, Direction, PortCaps, PortId, PortRecord};
use crate::{SYSTEM_ANNOUNCE_PORT, SYSTEM_CLIENT};

// ── AlsaSequencer ────────────────────────────────────────────────────

/// Query handle on the system ALSA sequencer.
pub struct AlsaSequencer {
    seq: Option<Seq>,
    name: CString,
    client_id: ClientId,
}

impl AlsaSequencer {
    /// Open a duplex connection to the `default` sequencer under `name`.
    pub fn open(name: &str) -> Result<Self, Error> {
        let name = c_name(name)?;
        let seq = open_handle(&name)?;
        let client_id = local_client_id(&seq)?;
        debug!(client_id, "opened ALSA sequencer");

        Ok(Self {
            seq: Some(seq),
            name,
            client_id,
        })
    }

    fn handle(&self) -> Result<&Seq, Error> {
        self.seq.as_ref().ok_or(Error::Closed)
    }
}

impl Sequencer for AlsaSequencer {
    type Events = AlsaEvents;

    fn client_id(&self) -> ClientId {
        self.client_id
    }

    fn enumerate(&self) -> Result<Vec<ClientRecord>, Error> {
        let seq = self.handle()?;
        let mut clients = Vec::new();

        for info in ClientIter::new(seq) {
            let raw_id = info.get_client();
            let ports = PortIter::new(seq, raw_id)
                .filter_map(|port| {
                    PortRecord::from_raw(
                        raw_id,
                        port.get_port(),
                        port.get_name(),
                        port.get_capability().bits(),
                    )
                })
                .collect();
            clients.extend(ClientRecord::from_raw(raw_id, info.get_name(), ports));
        }

        Ok(clients)
    }

    fn create_port(&self, name: &str, caps: PortCaps) -> Result<PortId, Error> {
        create_port_on(self.handle()?, name, caps)
    }

    fn subscribe(&self, sender: Addr, dest: Addr) -> Result<(), Error> {
        subscribe_on(self.handle()?, sender, dest)
    }

    fn subscription_count(&self, port: Addr, direction: Direction) -> Result<usize, Error> {
        let seq = self.handle()?;
        let query = match direction {
            Direction::Outgoing => QuerySubsType::READ,
            Direction::Incoming => QuerySubsType::WRITE,
        };
        Ok(PortSubscribeIter::new(seq, to_alsa(port), query).count())
    }

    fn listen(&mut self, port_name: &str) -> Result<AlsaEvents, Error> {
        let seq = open_handle(&self.name)?;
        let client = local_client_id(&seq)?;
        let port = create_port_on(&seq, port_name, PortCaps::RECEIVER)?;

        let announce = Addr::new(SYSTEM_CLIENT, SYSTEM_ANNOUNCE_PORT);
        subscribe_on(&seq, announce, Addr::new(client, port))?;
        debug!(client, port, "listening for sequencer announcements");

        Ok(AlsaEvents { seq })
    }

    fn close(&mut self) {
        if self.seq.take().is_some() {
            debug!(client_id = self.client_id, "closed ALSA sequencer");
        }
    }
}

// ── AlsaEvents ───────────────────────────────────────────────────────

/// Input handle that blocks on the listener port.
pub struct AlsaEvents {
    seq: Seq,
}

impl EventSource for AlsaEvents {
    fn next_event(&mut self) -> Result<EventKind, Error> {
        let mut input = self.seq.input();
        let event = input.event_input().map_err(|e| Error::EventInput {
            reason: e.to_string(),
        })?;
        #[allow(clippy::as_conversions)]
        let code = event.get_type() as u8;
        EventKind::try_from(code)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn c_name(name: &str) -> Result<CString, Error> {
    CString::new(name).map_err(|_| Error::InvalidName {
        name: name.to_owned(),
    })
}

fn open_handle(name: &CStr) -> Result<Seq, Error> {
    // No direction means duplex.
    let seq = Seq::open(None, None, false).map_err(|e| Error::Open {
        reason: e.to_string(),
    })?;
    seq.set_client_name(name).map_err(|e| Error::Open {
        reason: format!("cannot set client name: {e}"),
    })?;
    Ok(seq)
}

fn local_client_id(seq: &Seq) -> Result<ClientId, Error> {
    let id = seq.client_id().map_err(|e| Error::Open {
        reason: format!("cannot obtain client id: {e}"),
    })?;
    ClientId::try_from(id).map_err(|_| Error::Open {
        reason: format!("client id {id} out of range"),
    })
}

fn create_port_on(seq: &Seq, name: &str, caps: PortCaps) -> Result<PortId, Error> {
    let cname = c_name(name)?;
    let raw = seq
        .create_simple_port(
            &cname,
            PortCap::from_bits_truncate(caps.bits()),
            PortType::MIDI_GENERIC | PortType::APPLICATION,
        )
        .map_err(|e| Error::CreatePort {
            name: name.to_owned(),
            reason: e.to_string(),
        })?;
    PortId::try_from(raw).map_err(|_| Error::CreatePort {
        name: name.to_owned(),
        reason: format!("port id {raw} out of range"),
    })
}

fn subscribe_on(seq: &Seq, sender: Addr, dest: Addr) -> Result<(), Error> {
    let reject = |reason: String| Error::Subscribe {
        sender,
        dest,
        reason,
    };

    let subs = PortSubscribe::empty().map_err(|e| reject(e.to_string()))?;
    subs.set_sender(to_alsa(sender));
    subs.set_dest(to_alsa(dest));
    seq.subscribe_port(&subs).map_err(|e| reject(e.to_string()))
}

fn to_alsa(addr: Addr) -> aseq::Addr {
    aseq::Addr {
        client: i32::from(addr.client),
        port: i32::from(addr.port),
    }
}
