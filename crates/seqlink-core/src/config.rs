// ── Runtime connector configuration ──
//
// What the connector needs to run, already resolved from flags, the config
// file and the pairs file. The binary builds a `ConnectorConfig` and hands
// it in; core never reads files.

use serde::{Deserialize, Serialize};

use crate::model::DesiredPair;

/// Client name registered with the sequencer when none is configured.
pub const DEFAULT_CLIENT_NAME: &str = "seqlink";

/// Name of the port that receives system announcements.
pub const DEFAULT_LISTENER_PORT: &str = "Listener";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Name this process registers as with the sequencer.
    pub client_name: String,
    /// Name of the port created for lifecycle announcements.
    pub listener_port: String,
    /// Port pairs to keep connected, in evaluation order.
    pub pairs: Vec<DesiredPair>,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            client_name: DEFAULT_CLIENT_NAME.into(),
            listener_port: DEFAULT_LISTENER_PORT.into(),
            pairs: Vec::new(),
        }
    }
}
