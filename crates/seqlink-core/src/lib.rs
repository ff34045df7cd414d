// seqlink-core: sequencer state model and the port-pair reconciliation engine.

pub mod config;
pub mod connect;
pub mod connector;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod predicates;
pub mod reconcile;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::ConnectorConfig;
pub use connector::{Connector, RunStats};
pub use dispatch::{DispatchOutcome, EventDispatcher};
pub use error::CoreError;
pub use reconcile::{Attempt, AttemptOutcome, ReconcileReport, Reconciler};
pub use store::{SequencerState, Snapshot};

pub use model::{Client, ClientSummary, DesiredPair, Port, PortSummary};

// The service surface is part of this crate's API.
pub use seqlink_api::{Addr, ClientId, ClientKind, EventKind, PortCaps, PortId, Sequencer};
