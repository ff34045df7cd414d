// ── Port predicates ──
//
// Capability checks read the snapshot. Connection checks always ask the
// service: subscriptions change behind our back and are never cached.

use seqlink_api::{Direction, PortCaps, Sequencer};

use crate::error::CoreError;
use crate::model::Port;

/// Port can be the source of a subscription (READ and SUBS_READ).
pub fn can_send(port: &Port) -> bool {
    port.caps.contains(PortCaps::SENDER)
}

/// Port can be the destination of a subscription (WRITE and SUBS_WRITE).
pub fn can_receive(port: &Port) -> bool {
    port.caps.contains(PortCaps::RECEIVER)
}

/// Port is currently the source of at least one subscription.
pub fn has_outgoing_connection<S: Sequencer>(service: &S, port: &Port) -> Result<bool, CoreError> {
    Ok(service.subscription_count(port.addr(), Direction::Outgoing)? > 0)
}

/// Port is currently the destination of at least one subscription.
pub fn has_incoming_connection<S: Sequencer>(service: &S, port: &Port) -> Result<bool, CoreError> {
    Ok(service.subscription_count(port.addr(), Direction::Incoming)? > 0)
}
