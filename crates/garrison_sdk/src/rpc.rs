//! RPC envelope types and the per-controller handle.
//!
//! The wire protocol itself lives outside this crate; controllers only see
//! the message envelope and a [`RpcHandle`] they can build outbound messages
//! with. Every controller receives its own handle so traffic can be
//! attributed per unit.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::current_timestamp;

/// A message arriving from a remote peer.
///
/// `received` is stamped at receipt time so transport latency can be derived
/// from the sender's `sent` timestamp. All timestamps are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub event: String,
    #[serde(default)]
    pub payloads: Vec<String>,
    pub created: u64,
    pub sent: u64,
    #[serde(default = "current_timestamp")]
    pub received: u64,
}

impl InboundMessage {
    /// Build an inbound message, stamping `received` with the current time.
    pub fn receive(event: impl Into<String>, payloads: Vec<String>, created: u64, sent: u64) -> Self {
        Self {
            event: event.into(),
            payloads,
            created,
            sent,
            received: current_timestamp(),
        }
    }

    /// Time the message spent in transit.
    pub fn transport_latency(&self) -> Duration {
        Duration::from_millis(self.received.saturating_sub(self.sent))
    }
}

/// A message on its way to a remote peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub event: String,
    pub payloads: Vec<String>,
    pub created: u64,
    pub sent: u64,
}

impl OutboundMessage {
    pub fn payload(mut self, payload: impl Into<String>) -> Self {
        self.payloads.push(payload.into());
        self
    }

    /// Stamp the message as sent now.
    pub fn into_sent(mut self) -> Self {
        self.sent = current_timestamp();
        self
    }
}

/// Handle for issuing RPC traffic, one per controller.
#[derive(Debug, Clone)]
pub struct RpcHandle {
    id: Uuid,
}

impl RpcHandle {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Start an outbound message for `event`, created now and not yet sent.
    pub fn message(&self, event: &str) -> OutboundMessage {
        OutboundMessage {
            event: event.to_string(),
            payloads: Vec::new(),
            created: current_timestamp(),
            sent: 0,
        }
    }
}

impl Default for RpcHandle {
    fn default() -> Self {
        Self::new()
    }
}
