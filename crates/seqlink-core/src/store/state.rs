use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{debug, warn};

use seqlink_api::{ClientId, PortId, Sequencer};

use super::Snapshot;
use crate::error::CoreError;
use crate::model::{Client, Port};

/// Current view of the sequencer's clients and ports.
///
/// Readers get an `Arc<Snapshot>` that stays valid while they hold it; a
/// refresh swaps in a new snapshot without disturbing them.
pub struct SequencerState {
    current: ArcSwap<Snapshot>,
}

impl SequencerState {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Snapshot::default()),
        }
    }

    /// Re-enumerate the service and replace the snapshot.
    ///
    /// On failure the previous snapshot stays in place and
    /// [`CoreError::RefreshFailed`] is returned.
    pub fn refresh<S: Sequencer>(&self, service: &S) -> Result<(), CoreError> {
        let records = service.enumerate().map_err(|e| {
            warn!(error = %e, "sequencer enumeration failed, keeping previous snapshot");
            CoreError::RefreshFailed {
                reason: e.to_string(),
            }
        })?;

        let clients: Vec<Client> = records.into_iter().map(Client::from).collect();
        let port_count: usize = clients.iter().map(|c| c.ports.len()).sum();
        debug!(clients = clients.len(), ports = port_count, "sequencer state refreshed");

        self.current
            .store(Arc::new(Snapshot::new(clients)));
        Ok(())
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Look a port up in the current snapshot.
    pub fn find_port(&self, client: ClientId, port: PortId) -> Option<Port> {
        self.current.load().find_port(client, port).cloned()
    }
}

impl Default for SequencerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use seqlink_api::memory::MemorySequencer;
    use seqlink_api::{ClientKind, PortCaps};

    use super::*;

    #[test]
    fn starts_empty() {
        let state = SequencerState::new();
        assert!(state.snapshot().is_empty());
        assert!(state.find_port(0, 0).is_none());
    }

    #[test]
    fn refresh_replaces_snapshot() {
        let seq = MemorySequencer::new("test");
        let state = SequencerState::new();
        state.refresh(&seq).unwrap();
        let before = state.snapshot();

        seq.add_client(20, "Keyboard", ClientKind::Kernel);
        seq.add_port(20, 0, "Keys", PortCaps::SENDER);
        state.refresh(&seq).unwrap();

        assert!(before.find_port(20, 0).is_none());
        assert_eq!(state.find_port(20, 0).unwrap().name, "Keys");
        assert!(state.find_port(20, 1).is_none());
        assert!(state.find_port(21, 0).is_none());
    }

    #[test]
    fn failed_refresh_keeps_previous_snapshot() {
        let seq = MemorySequencer::new("test");
        seq.add_client(20, "Keyboard", ClientKind::Kernel);
        seq.add_port(20, 0, "Keys", PortCaps::SENDER);

        let state = SequencerState::new();
        state.refresh(&seq).unwrap();
        let before = state.snapshot();

        seq.remove_client(20);
        seq.fail_enumerations(1);
        let err = state.refresh(&seq).unwrap_err();

        assert!(matches!(err, CoreError::RefreshFailed { .. }));
        assert!(state.find_port(20, 0).is_some());
        assert!(Arc::ptr_eq(&before, &state.snapshot()));
    }
}
