// ── Domain model ──
//
// The connector's view of the sequencer: clients and their ports as of the
// last refresh, the desired port pairs, and the report rows behind `--info`.

pub mod pair;
pub mod port;
pub mod summary;

pub use pair::DesiredPair;
pub use port::{Client, Port};
pub use summary::{ClientSummary, PortSummary};
