// ── Connector ──
//
// The single entry point for consumers. Owns the sequencer handle, the
// state snapshot and the desired pairs, and wires them into one-shot
// reconciliation or a long-running event loop.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use seqlink_api::{ClientId, EventKind, PortId, Sequencer};

use crate::config::ConnectorConfig;
use crate::dispatch::{self, DispatchOutcome, EventDispatcher};
use crate::error::CoreError;
use crate::model::{ClientSummary, DesiredPair, Port, PortSummary};
use crate::predicates::{has_incoming_connection, has_outgoing_connection};
use crate::reconcile::{ReconcileReport, Reconciler};
use crate::store::{SequencerState, Snapshot};

// ── RunStats ─────────────────────────────────────────────────────────

/// Totals for one [`Connector::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub events: usize,
    pub passes: usize,
    pub connected: usize,
    pub refresh_failures: usize,
}

// ── Connector ────────────────────────────────────────────────────────

/// Keeps configured port pairs connected on one sequencer.
pub struct Connector<S: Sequencer> {
    service: S,
    state: SequencerState,
    reconciler: Reconciler,
}

impl<S: Sequencer> Connector<S> {
    /// Take ownership of an open sequencer handle and load its state.
    pub fn new(service: S) -> Result<Self, CoreError> {
        let state = SequencerState::new();
        state.refresh(&service)?;
        debug!(client_id = service.client_id(), "connector ready");

        Ok(Self {
            service,
            state,
            reconciler: Reconciler::new(),
        })
    }

    /// [`new`](Self::new), then add the configured pairs.
    pub fn with_config(service: S, config: &ConnectorConfig) -> Result<Self, CoreError> {
        let mut connector = Self::new(service)?;
        connector.add_pairs(config.pairs.iter().cloned());
        Ok(connector)
    }

    // ── Pairs ────────────────────────────────────────────────────────

    pub fn add_pair(&mut self, source: impl Into<String>, destination: impl Into<String>) {
        self.reconciler.add_pair(DesiredPair::new(source, destination));
    }

    pub fn add_pairs(&mut self, pairs: impl IntoIterator<Item = DesiredPair>) {
        self.reconciler.extend(pairs);
    }

    pub fn pairs(&self) -> &[DesiredPair] {
        self.reconciler.pairs()
    }

    // ── State ────────────────────────────────────────────────────────

    pub fn refresh(&self) -> Result<(), CoreError> {
        self.state.refresh(&self.service)
    }

    /// The current snapshot.
    pub fn clients(&self) -> Arc<Snapshot> {
        self.state.snapshot()
    }

    pub fn find_port(&self, client: ClientId, port: PortId) -> Result<Port, CoreError> {
        self.state
            .find_port(client, port)
            .ok_or(CoreError::PortNotFound {
                addr: seqlink_api::Addr::new(client, port),
            })
    }

    /// Report rows for every client and port in the current snapshot,
    /// with live connection markers.
    ///
    /// A port whose subscriptions cannot be queried is shown unconnected.
    pub fn describe(&self) -> Vec<ClientSummary> {
        let snapshot = self.state.snapshot();
        snapshot
            .clients()
            .iter()
            .map(|client| ClientSummary {
                id: client.id,
                name: client.name.clone(),
                kind: client.kind,
                ports: client.ports.iter().map(|p| self.summarize(p)).collect(),
            })
            .collect()
    }

    fn summarize(&self, port: &Port) -> PortSummary {
        let query = |result: Result<bool, CoreError>| {
            result.unwrap_or_else(|e| {
                warn!(error = %e, port = %port.addr(), "cannot query connections");
                false
            })
        };

        PortSummary {
            client: port.client,
            id: port.id,
            name: port.name.clone(),
            caps: port.caps.names(),
            incoming: query(has_incoming_connection(&self.service, port)),
            outgoing: query(has_outgoing_connection(&self.service, port)),
        }
    }

    // ── Reconciliation ───────────────────────────────────────────────

    pub fn reconcile_once(&self) -> ReconcileReport {
        self.reconciler.reconcile_once(&self.service, &self.state)
    }

    pub fn dispatch(&self, kind: EventKind) -> DispatchOutcome {
        EventDispatcher::new(&self.service, &self.state, &self.reconciler).dispatch(kind)
    }

    // ── Event loop ───────────────────────────────────────────────────

    /// Create the listener port, route announcements into it and start
    /// the event pump.
    pub fn listen(&mut self, port_name: &str) -> Result<mpsc::Receiver<EventKind>, CoreError> {
        let source = self
            .service
            .listen(port_name)
            .map_err(|e| match CoreError::from(e) {
                fatal @ (CoreError::Disconnected | CoreError::ListenerSetup { .. }) => fatal,
                other => CoreError::ListenerSetup {
                    reason: other.to_string(),
                },
            })?;
        info!(port = port_name, "listening for sequencer announcements");

        dispatch::spawn_event_pump(source)
    }

    /// Dispatch events serially until `cancel` fires.
    ///
    /// Cancellation is the only clean exit. If the event stream ends first,
    /// the sequencer went away and [`CoreError::Disconnected`] is returned.
    pub async fn run(
        &mut self,
        mut events: mpsc::Receiver<EventKind>,
        cancel: CancellationToken,
    ) -> Result<RunStats, CoreError> {
        let mut stats = RunStats::default();

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("event loop cancelled");
                    break;
                }
                event = events.recv() => {
                    let Some(kind) = event else {
                        warn!(
                            events = stats.events,
                            passes = stats.passes,
                            "event stream ended unexpectedly"
                        );
                        return Err(CoreError::Disconnected);
                    };
                    stats.events += 1;
                    match self.dispatch(kind) {
                        DispatchOutcome::Reconciled(report) => {
                            stats.passes += 1;
                            stats.connected += report.connected();
                        }
                        DispatchOutcome::RefreshFailed { reason } => {
                            stats.refresh_failures += 1;
                            warn!(event = %kind, %reason, "skipping reconciliation");
                        }
                        DispatchOutcome::Ignored => {}
                    }
                }
            }
        }

        Ok(stats)
    }

    /// Release the sequencer handle.
    pub fn close(&mut self) {
        self.service.close();
    }
}
