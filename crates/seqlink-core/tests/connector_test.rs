#![allow(clippy::unwrap_used)]

// End-to-end connector behavior against the in-memory sequencer.

use pretty_assertions::assert_eq;
use seqlink_api::memory::{LOCAL_CLIENT, MemorySequencer};
use seqlink_api::{Addr, ClientKind, EventKind, PortCaps};
use seqlink_core::{AttemptOutcome, Connector, CoreError, DispatchOutcome, RunStats};
use tokio_util::sync::CancellationToken;

const KEYBOARD: u8 = 20;
const SYNTH: u8 = 24;
const SAMPLER: u8 = 28;

/// Keyboard "A" (sender) and synth "B" (receiver), unconnected.
fn studio() -> (MemorySequencer, Addr, Addr) {
    let seq = MemorySequencer::new("seqlink");
    seq.add_client(KEYBOARD, "Keyboard", ClientKind::Kernel);
    seq.add_client(SYNTH, "Synth", ClientKind::Kernel);
    let a = seq.add_port(KEYBOARD, 0, "A", PortCaps::SENDER);
    let b = seq.add_port(SYNTH, 0, "B", PortCaps::RECEIVER);
    (seq, a, b)
}

fn connector(seq: &MemorySequencer, pairs: &[(&str, &str)]) -> Connector<MemorySequencer> {
    let mut connector = Connector::new(seq.clone()).unwrap();
    for (source, destination) in pairs {
        connector.add_pair(*source, *destination);
    }
    connector
}

// ── Reconciliation ───────────────────────────────────────────────────

#[test]
fn matching_pair_is_connected_exactly_once() {
    let (seq, a, b) = studio();
    let connector = connector(&seq, &[("A", "B")]);

    let report = connector.reconcile_once();

    assert_eq!(seq.subscribe_requests(), vec![(a, b)]);
    assert_eq!(report.requested(), 1);
    assert_eq!(report.attempts()[0].outcome, AttemptOutcome::Connected);
}

#[test]
fn second_pass_is_a_no_op() {
    let (seq, _, _) = studio();
    let connector = connector(&seq, &[("A", "B")]);

    connector.reconcile_once();
    let requests = seq.subscribe_requests().len();
    let report = connector.reconcile_once();

    assert!(report.is_empty());
    assert_eq!(seq.subscribe_requests().len(), requests);
}

#[test]
fn destination_with_incoming_connection_is_left_alone() {
    let (seq, _, b) = studio();
    seq.add_client(SAMPLER, "Sampler", ClientKind::User);
    let other = seq.add_port(SAMPLER, 0, "Other", PortCaps::SENDER);
    seq.connect(other, b);
    let connector = connector(&seq, &[("A", "B")]);

    let report = connector.reconcile_once();

    assert!(report.is_empty());
    assert!(seq.subscribe_requests().is_empty());
}

#[test]
fn source_with_outgoing_connection_is_left_alone() {
    let (seq, a, _) = studio();
    seq.add_client(SAMPLER, "Sampler", ClientKind::User);
    let elsewhere = seq.add_port(SAMPLER, 0, "Elsewhere", PortCaps::RECEIVER);
    seq.connect(a, elsewhere);
    let connector = connector(&seq, &[("A", "B")]);

    assert!(connector.reconcile_once().is_empty());
}

#[test]
fn failed_candidate_does_not_stop_the_pass() {
    let (seq, a, b) = studio();
    seq.add_client(SAMPLER, "Sampler", ClientKind::User);
    let c = seq.add_port(SAMPLER, 0, "C", PortCaps::SENDER);
    let d = seq.add_port(SAMPLER, 1, "D", PortCaps::RECEIVER);
    seq.reject(a, b);
    let connector = connector(&seq, &[("A", "B"), ("C", "D")]);

    let report = connector.reconcile_once();

    assert_eq!(seq.subscribe_requests(), vec![(a, b), (c, d)]);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.connected(), 1);
    assert_eq!(seq.subscriptions(), vec![(c, d)]);
}

#[test]
fn destination_taken_earlier_in_the_pass_is_skipped() {
    let (seq, a, b) = studio();
    seq.add_client(SAMPLER, "Sampler", ClientKind::User);
    seq.add_port(SAMPLER, 0, "A", PortCaps::SENDER);
    let connector = connector(&seq, &[("A", "B")]);

    connector.reconcile_once();

    assert_eq!(seq.subscribe_requests(), vec![(a, b)]);
}

#[test]
fn report_serializes_outcomes() {
    let (seq, a, b) = studio();
    seq.reject(a, b);
    let connector = connector(&seq, &[("A", "B")]);

    let report = connector.reconcile_once();

    insta::assert_json_snapshot!(report.attempts()[0].outcome, @r###"
    {
      "status": "failed",
      "reason": "Cannot connect 20:0 to 24:0: operation not permitted"
    }
    "###);
}

// ── Events ───────────────────────────────────────────────────────────

#[test]
fn port_start_runs_one_refresh_and_one_pass() {
    let (seq, _, _) = studio();
    let connector = connector(&seq, &[("A", "Missing")]);
    let before = seq.enumerations();

    let outcome = connector.dispatch(EventKind::PortStart);

    assert!(matches!(outcome, DispatchOutcome::Reconciled(ref r) if r.is_empty()));
    assert_eq!(seq.enumerations(), before + 1);
}

#[test]
fn client_exit_triggers_reconciliation() {
    let (seq, a, b) = studio();
    let connector = connector(&seq, &[("A", "B")]);

    let outcome = connector.dispatch(EventKind::ClientExit);

    let DispatchOutcome::Reconciled(report) = outcome else {
        panic!("expected a pass, got {outcome:?}");
    };
    assert_eq!(report.connected(), 1);
    assert_eq!(seq.subscriptions(), vec![(a, b)]);
}

#[test]
fn other_events_trigger_nothing() {
    let (seq, _, _) = studio();
    let connector = connector(&seq, &[("A", "B")]);
    let before = seq.enumerations();

    for kind in [
        EventKind::ClientStart,
        EventKind::PortExit,
        EventKind::PortSubscribed,
        EventKind::NoteOn,
        EventKind::None,
    ] {
        assert_eq!(connector.dispatch(kind), DispatchOutcome::Ignored);
    }

    assert_eq!(seq.enumerations(), before);
    assert!(seq.subscribe_requests().is_empty());
}

#[test]
fn refresh_failure_keeps_previous_snapshot() {
    let (seq, _, _) = studio();
    let connector = connector(&seq, &[("A", "B")]);

    seq.remove_client(SYNTH);
    seq.fail_enumerations(1);
    let outcome = connector.dispatch(EventKind::PortStart);

    assert!(matches!(outcome, DispatchOutcome::RefreshFailed { .. }));
    assert!(connector.find_port(SYNTH, 0).is_ok());
    assert!(seq.subscribe_requests().is_empty());
}

#[tokio::test]
async fn hot_plugged_port_is_connected_by_the_event_loop() {
    let seq = MemorySequencer::new("seqlink");
    seq.add_client(KEYBOARD, "Keyboard", ClientKind::Kernel);
    let a = seq.add_port(KEYBOARD, 0, "A", PortCaps::SENDER);
    let mut connector = connector(&seq, &[("A", "B")]);

    assert!(connector.reconcile_once().is_empty());
    let events = connector.listen("Listener").unwrap();

    seq.emit(EventKind::ClientStart);
    seq.add_client(SYNTH, "Synth", ClientKind::Kernel);
    let b = seq.add_port(SYNTH, 0, "B", PortCaps::RECEIVER);
    seq.emit(EventKind::PortStart);
    seq.end_events();

    let result = connector.run(events, CancellationToken::new()).await;

    assert!(matches!(result, Err(CoreError::Disconnected)));
    assert!(seq.subscriptions().contains(&(a, b)));
}

#[tokio::test]
async fn event_loop_survives_repeated_read_failures() {
    let seq = MemorySequencer::new("seqlink");
    seq.add_client(KEYBOARD, "Keyboard", ClientKind::Kernel);
    let a = seq.add_port(KEYBOARD, 0, "A", PortCaps::SENDER);
    let mut connector = connector(&seq, &[("A", "B")]);
    let events = connector.listen("Listener").unwrap();

    for _ in 0..40 {
        seq.fail_read("No space left on device");
    }
    seq.add_client(SYNTH, "Synth", ClientKind::Kernel);
    let b = seq.add_port(SYNTH, 0, "B", PortCaps::RECEIVER);
    seq.emit(EventKind::PortStart);

    let cancel = CancellationToken::new();
    let stop = cancel.clone();
    let watcher = seq.clone();
    tokio::spawn(async move {
        while !watcher.subscriptions().contains(&(a, b)) {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        stop.cancel();
    });

    let stats = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        connector.run(events, cancel),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(
        stats,
        RunStats {
            events: 1,
            passes: 1,
            connected: 1,
            refresh_failures: 0,
        }
    );
    seq.end_events();
}

#[tokio::test]
async fn listener_receives_system_announcements() {
    let (seq, _, _) = studio();
    let mut connector = connector(&seq, &[]);

    let _events = connector.listen("Listener").unwrap();

    assert_eq!(
        seq.subscriptions(),
        vec![(Addr::new(0, 1), Addr::new(LOCAL_CLIENT, 0))]
    );
}

#[tokio::test]
async fn cancellation_stops_the_event_loop() {
    let (seq, _, _) = studio();
    let mut connector = connector(&seq, &[("A", "B")]);
    let events = connector.listen("Listener").unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let stats = connector.run(events, cancel).await.unwrap();

    assert_eq!(stats, RunStats::default());
    seq.end_events();
}

// ── Facade ───────────────────────────────────────────────────────────

#[test]
fn describe_reports_live_connection_markers() {
    let (seq, a, b) = studio();
    seq.connect(a, b);
    let connector = connector(&seq, &[]);

    let clients = connector.describe();
    let keyboard = clients.iter().find(|c| c.id == KEYBOARD).unwrap();
    let synth = clients.iter().find(|c| c.id == SYNTH).unwrap();

    assert_eq!(keyboard.ports[0].to_string(), "Port 0 A: READ SUBS_READ O");
    assert_eq!(synth.ports[0].to_string(), "Port 0 B: WRITE SUBS_WRITE I");
    assert_eq!(clients[0].to_string(), "Client 0 System type=kernel");
}

#[test]
fn find_port_reports_missing_addresses() {
    let (seq, _, _) = studio();
    let connector = connector(&seq, &[]);

    assert_eq!(connector.find_port(KEYBOARD, 0).unwrap().name, "A");
    assert!(matches!(
        connector.find_port(KEYBOARD, 9),
        Err(CoreError::PortNotFound { addr }) if addr == Addr::new(KEYBOARD, 9)
    ));
}

#[test]
fn initial_refresh_failure_is_surfaced() {
    let (seq, _, _) = studio();
    seq.fail_enumerations(1);
    assert!(matches!(
        Connector::new(seq.clone()),
        Err(CoreError::RefreshFailed { .. })
    ));
}

#[test]
fn closed_connector_cannot_refresh() {
    let (seq, _, _) = studio();
    let mut connector = connector(&seq, &[]);

    connector.close();
    connector.close();

    assert!(seq.is_closed());
    assert!(connector.refresh().is_err());
    assert!(connector.clients().find_port(KEYBOARD, 0).is_some());
}
