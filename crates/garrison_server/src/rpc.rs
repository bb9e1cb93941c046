//! RPC dispatch table registration.
//!
//! The wire protocol is handled outside the bootstrap; what the bootstrap
//! owes the rest of the process is registering the dispatch table against
//! the host's event system before any controller is constructed, so handles
//! handed to controllers are immediately usable.

use tracing::debug;

use crate::host::Host;

/// Core events the dispatch table routes.
pub const DISPATCH_EVENTS: &[&str] = &[
    "clientHandshake",
    "clientHeartbeat",
    "clientDisconnect",
    "serverCommand",
];

/// Pre-register the RPC dispatch table with the host.
pub fn configure(host: &dyn Host) {
    for event in DISPATCH_EVENTS {
        host.register_rpc(event);
    }
    debug!(handlers = DISPATCH_EVENTS.len(), "rpc dispatch table registered");
}
