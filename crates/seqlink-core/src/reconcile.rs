// ── Reconciliation ──
//
// Walks the snapshot looking for ports whose names match a desired pair and
// connects every unconnected combination it finds in a single pass.

use serde::Serialize;
use tracing::{debug, trace, warn};

use seqlink_api::{Addr, Sequencer};

use crate::connect::ConnectionRequestor;
use crate::model::{DesiredPair, Port};
use crate::predicates::{has_incoming_connection, has_outgoing_connection};
use crate::store::SequencerState;

// ── Report ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Connected,
    Failed { reason: String },
}

/// One connect request issued during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub source: Addr,
    pub source_name: String,
    pub destination: Addr,
    pub destination_name: String,
    pub outcome: AttemptOutcome,
}

/// Every connect request a pass issued, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    attempts: Vec<Attempt>,
}

impl ReconcileReport {
    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    /// Number of connect requests issued.
    pub fn requested(&self) -> usize {
        self.attempts.len()
    }

    pub fn connected(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.outcome == AttemptOutcome::Connected)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.requested() - self.connected()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}

// ── Reconciler ───────────────────────────────────────────────────────

/// Owns the desired pairs and runs reconciliation passes over them.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    pairs: Vec<DesiredPair>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair. Duplicates are kept.
    pub fn add_pair(&mut self, pair: DesiredPair) {
        self.pairs.push(pair);
    }

    pub fn pairs(&self) -> &[DesiredPair] {
        &self.pairs
    }

    /// One reconciliation pass.
    ///
    /// Sources come from the snapshot current when the pass starts; a
    /// source only qualifies while it has no outgoing subscription, checked
    /// once before its pairs are walked. Destinations are looked up in the
    /// snapshot current when each pair is evaluated, so connections made
    /// earlier in the pass are visible. Every free destination matching a
    /// pair gets a request; a failed request does not stop the pass.
    pub fn reconcile_once<S: Sequencer>(
        &self,
        service: &S,
        state: &SequencerState,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        if self.pairs.is_empty() {
            return report;
        }

        let requestor = ConnectionRequestor::new(service, state);
        let pass = state.snapshot();

        for source in pass.ports() {
            match has_outgoing_connection(service, source) {
                Ok(false) => {}
                Ok(true) => {
                    trace!(port = %source.addr(), name = %source.name, "source already connected");
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, port = %source.addr(), "skipping source");
                    continue;
                }
            }

            for pair in self.pairs.iter().filter(|p| p.source == source.name) {
                let current = state.snapshot();
                for destination in current.ports().filter(|p| p.name == pair.destination) {
                    if !destination_is_free(service, destination) {
                        continue;
                    }
                    report.attempts.push(attempt(&requestor, source, destination));
                }
            }
        }

        debug!(
            requested = report.requested(),
            connected = report.connected(),
            "reconciliation pass finished"
        );
        report
    }
}

impl Extend<DesiredPair> for Reconciler {
    fn extend<I: IntoIterator<Item = DesiredPair>>(&mut self, iter: I) {
        self.pairs.extend(iter);
    }
}

fn destination_is_free<S: Sequencer>(service: &S, destination: &Port) -> bool {
    match has_incoming_connection(service, destination) {
        Ok(connected) => {
            if connected {
                trace!(port = %destination.addr(), name = %destination.name, "destination already connected");
            }
            !connected
        }
        Err(e) => {
            warn!(error = %e, port = %destination.addr(), "skipping destination");
            false
        }
    }
}

fn attempt<S: Sequencer>(
    requestor: &ConnectionRequestor<'_, S>,
    source: &Port,
    destination: &Port,
) -> Attempt {
    let outcome = match requestor.connect(source, destination) {
        Ok(()) => AttemptOutcome::Connected,
        Err(e) => {
            warn!(error = %e, "cannot connect {} to {}", source.name, destination.name);
            AttemptOutcome::Failed {
                reason: e.to_string(),
            }
        }
    };

    Attempt {
        source: source.addr(),
        source_name: source.name.clone(),
        destination: destination.addr(),
        destination_name: destination.name.clone(),
        outcome,
    }
}
