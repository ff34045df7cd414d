// ── Event dispatch ──
//
// Lifecycle events arrive through a blocking read. A dedicated pump thread
// performs that read and hands each event to a bounded channel; the
// dispatcher consumes the channel serially and decides which events warrant
// a refresh and a reconciliation pass.

use std::thread;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use seqlink_api::{EventKind, EventSource, Sequencer};

use crate::error::CoreError;
use crate::reconcile::{ReconcileReport, Reconciler};
use crate::store::SequencerState;

const EVENT_CHANNEL_SIZE: usize = 256;

/// Consecutive read failures tolerated before the pump starts pausing
/// between reads.
const BACKOFF_AFTER_READ_ERRORS: u32 = 16;

const READ_ERROR_BACKOFF: Duration = Duration::from_millis(20);

// ── DispatchOutcome ──────────────────────────────────────────────────

/// What handling one event amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The state was refreshed and a pass ran.
    Reconciled(ReconcileReport),
    /// The event does not affect which ports could be connected.
    Ignored,
    /// The refresh failed; no pass ran on stale data.
    RefreshFailed { reason: String },
}

/// Events after which new matches may exist.
pub fn triggers_reconcile(kind: EventKind) -> bool {
    matches!(kind, EventKind::PortStart | EventKind::ClientExit)
}

// ── EventDispatcher ──────────────────────────────────────────────────

/// Turns one event into at most one refresh and one reconciliation pass.
pub struct EventDispatcher<'a, S> {
    service: &'a S,
    state: &'a SequencerState,
    reconciler: &'a Reconciler,
}

impl<'a, S: Sequencer> EventDispatcher<'a, S> {
    pub fn new(service: &'a S, state: &'a SequencerState, reconciler: &'a Reconciler) -> Self {
        Self {
            service,
            state,
            reconciler,
        }
    }

    pub fn dispatch(&self, kind: EventKind) -> DispatchOutcome {
        debug!(event = %kind, "received");

        if !triggers_reconcile(kind) {
            return DispatchOutcome::Ignored;
        }

        if let Err(e) = self.state.refresh(self.service) {
            return DispatchOutcome::RefreshFailed {
                reason: e.to_string(),
            };
        }
        DispatchOutcome::Reconciled(self.reconciler.reconcile_once(self.service, self.state))
    }
}

// ── Event pump ───────────────────────────────────────────────────────

/// Move `source` onto its own thread and forward its events.
///
/// The pump stops only when the source reports the stream closed or the
/// receiver is dropped. Read failures are logged and retried; events with an
/// unknown type code are skipped.
pub fn spawn_event_pump<E: EventSource + 'static>(
    source: E,
) -> Result<mpsc::Receiver<EventKind>, CoreError> {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_SIZE);

    thread::Builder::new()
        .name("seqlink-events".into())
        .spawn(move || pump(source, &tx))
        .map_err(|e| CoreError::ListenerSetup {
            reason: format!("cannot start event pump: {e}"),
        })?;

    Ok(rx)
}

fn pump<E: EventSource>(mut source: E, tx: &mpsc::Sender<EventKind>) {
    let mut failures = 0_u32;

    loop {
        match source.next_event() {
            Ok(kind) => {
                failures = 0;
                if tx.blocking_send(kind).is_err() {
                    debug!("event receiver dropped, stopping pump");
                    break;
                }
            }
            Err(e) if e.is_closed() => {
                debug!("event stream closed, stopping pump");
                break;
            }
            Err(seqlink_api::Error::UnknownEventType(code)) => {
                debug!(code, "skipping event with unknown type");
            }
            Err(_) if tx.is_closed() => {
                debug!("event receiver dropped, stopping pump");
                break;
            }
            Err(e) => {
                failures = failures.saturating_add(1);
                // Warn on the 1st, 2nd, 4th, 8th ... failure of a run.
                if failures.is_power_of_two() {
                    warn!(error = %e, failures, "event read failed");
                }
                if failures > BACKOFF_AFTER_READ_ERRORS {
                    thread::sleep(READ_ERROR_BACKOFF);
                }
            }
        }
    }
}
