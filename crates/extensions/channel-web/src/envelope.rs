//! JSON envelopes carried over a frame socket.
//!
//! Frame sockets multiplex three flows: messages the page sends to the
//! coordinator (optionally expecting a reply), requests the coordinator sends
//! into the page, and fire-and-forget notifications. Surface sockets carry bare
//! surface messages and need no envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Envelope {
    /// Page → coordinator. A reply is sent when `id` is set.
    Message {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<u64>,
        payload: Value,
    },
    /// Coordinator → page, answered with a `response` carrying the same id.
    Request { id: u64, payload: Value },
    /// Coordinator → page, never answered.
    Notify { payload: Value },
    /// Answer to a `message` or a `request`. A `null` payload means no value.
    Response {
        id: u64,
        #[serde(default)]
        payload: Option<Value>,
    },
}

impl Envelope {
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
