// ── Sequencer state store ──
//
// Snapshot of every client and port, replaced wholesale on each refresh.

mod snapshot;
mod state;

pub use snapshot::Snapshot;
pub use state::SequencerState;
