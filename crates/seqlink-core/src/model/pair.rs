use std::fmt;

use serde::{Deserialize, Serialize};

/// A (source port name, destination port name) pair to keep connected.
///
/// Names are matched exactly against port names. Several pairs may share a
/// source or a destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DesiredPair {
    pub source: String,
    pub destination: String,
}

impl DesiredPair {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

impl fmt::Display for DesiredPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}
