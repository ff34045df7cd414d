// ── Connection requests ──
//
// One subscribe call per request. A successful connect changes the
// topology, so the state is refreshed right after it.

use tracing::{info, warn};

use seqlink_api::Sequencer;

use crate::error::CoreError;
use crate::model::Port;
use crate::store::SequencerState;

/// Issues connect requests against a service and keeps the state current.
pub struct ConnectionRequestor<'a, S> {
    service: &'a S,
    state: &'a SequencerState,
}

impl<'a, S: Sequencer> ConnectionRequestor<'a, S> {
    pub fn new(service: &'a S, state: &'a SequencerState) -> Self {
        Self { service, state }
    }

    /// Subscribe `destination` to `source`.
    ///
    /// A refresh failure after a successful subscribe is logged; the
    /// connection itself still counts as made.
    pub fn connect(&self, source: &Port, destination: &Port) -> Result<(), CoreError> {
        self.service
            .subscribe(source.addr(), destination.addr())
            .map_err(CoreError::from)?;

        info!(
            source = %source.addr(),
            destination = %destination.addr(),
            "connected {} to {}",
            source.name,
            destination.name,
        );

        if let Err(e) = self.state.refresh(self.service) {
            warn!(error = %e, "refresh after connect failed");
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use seqlink_api::memory::MemorySequencer;
    use seqlink_api::{ClientKind, PortCaps};

    use super::*;

    fn setup() -> (MemorySequencer, SequencerState) {
        let seq = MemorySequencer::new("test");
        seq.add_client(20, "Keyboard", ClientKind::Kernel);
        seq.add_client(24, "Synth", ClientKind::Kernel);
        seq.add_port(20, 0, "Keys", PortCaps::SENDER);
        seq.add_port(24, 0, "Synth In", PortCaps::RECEIVER);
        let state = SequencerState::new();
        state.refresh(&seq).unwrap();
        (seq, state)
    }

    #[test]
    fn success_refreshes_state() {
        let (seq, state) = setup();
        let src = state.find_port(20, 0).unwrap();
        let dst = state.find_port(24, 0).unwrap();

        ConnectionRequestor::new(&seq, &state)
            .connect(&src, &dst)
            .unwrap();

        assert_eq!(seq.subscriptions(), vec![(src.addr(), dst.addr())]);
        assert_eq!(seq.enumerations(), 2);
    }

    #[test]
    fn rejection_is_typed_and_skips_refresh() {
        let (seq, state) = setup();
        let src = state.find_port(20, 0).unwrap();
        let dst = state.find_port(24, 0).unwrap();
        seq.reject(src.addr(), dst.addr());

        let err = ConnectionRequestor::new(&seq, &state)
            .connect(&src, &dst)
            .unwrap_err();

        assert!(matches!(err, CoreError::ConnectFailed { .. }));
        assert_eq!(seq.enumerations(), 1);
    }

    #[test]
    fn refresh_failure_after_connect_is_not_an_error() {
        let (seq, state) = setup();
        let src = state.find_port(20, 0).unwrap();
        let dst = state.find_port(24, 0).unwrap();
        seq.fail_enumerations(1);

        ConnectionRequestor::new(&seq, &state)
            .connect(&src, &dst)
            .unwrap();
        assert_eq!(seq.subscriptions().len(), 1);
    }
}
