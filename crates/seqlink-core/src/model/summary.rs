// ── State report rows ──
//
// Read-only rows for the state dump. Unlike `Port`, a `PortSummary` carries
// the connection markers, captured when the summary was built.

use std::fmt;

use serde::Serialize;

use seqlink_api::{ClientId, ClientKind, PortId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSummary {
    pub id: ClientId,
    pub name: String,
    pub kind: ClientKind,
    pub ports: Vec<PortSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortSummary {
    pub client: ClientId,
    pub id: PortId,
    pub name: String,
    /// Capability names, lowest bit first.
    pub caps: Vec<&'static str>,
    /// Some port is subscribed to this one.
    pub incoming: bool,
    /// This port is subscribed to some port.
    pub outgoing: bool,
}

impl PortSummary {
    /// `I`, `O`, `I O` or empty.
    pub fn markers(&self) -> String {
        match (self.incoming, self.outgoing) {
            (true, true) => "I O".into(),
            (true, false) => "I".into(),
            (false, true) => "O".into(),
            (false, false) => String::new(),
        }
    }
}

impl fmt::Display for ClientSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Client {} {} type={}", self.id, self.name, self.kind)
    }
}

impl fmt::Display for PortSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Port {} {}:", self.id, self.name)?;
        for cap in &self.caps {
            write!(f, " {cap}")?;
        }
        if self.incoming {
            f.write_str(" I")?;
        }
        if self.outgoing {
            f.write_str(" O")?;
        }
        Ok(())
    }
}
