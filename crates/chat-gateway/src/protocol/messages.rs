//! Gateway message format
//!
//! Every frame in either direction is a JSON text frame of the shape
//! `{"event": <name>, "data": <object>, "ack"?: <u64>}`.

use super::{CloseCode, ErrorCode};
use crate::events::{ErrorEvent, ServerEvent};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Gateway message format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayMessage {
    /// Event name, e.g. `message:send` or `typing:update`
    pub event: String,

    /// Event payload
    #[serde(default)]
    pub data: Value,

    /// Client-chosen acknowledgement id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack: Option<u64>,
}

impl GatewayMessage {
    // === Server Messages ===

    /// Create a server event from a serializable payload
    ///
    /// A payload that fails to serialize is logged and sent as `null`.
    #[must_use]
    pub fn event(event: ServerEvent, data: impl Serialize) -> Self {
        let data = serde_json::to_value(data).unwrap_or_else(|e| {
            tracing::error!(event = %event, error = %e, "Failed to serialize event payload");
            Value::Null
        });

        Self {
            event: event.as_str().to_string(),
            data,
            ack: None,
        }
    }

    /// Create an `error` event
    #[must_use]
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::event(
            ServerEvent::Error,
            ErrorEvent {
                message: message.into(),
                code,
            },
        )
    }

    /// Create an `ack` event for a successful client action
    ///
    /// Object results are merged into the ack body next to `id` and `success`.
    #[must_use]
    pub fn ack(id: u64, result: Value) -> Self {
        let mut body = Map::new();
        body.insert("id".to_string(), Value::from(id));
        body.insert("success".to_string(), Value::Bool(true));
        if let Value::Object(fields) = result {
            for (key, value) in fields {
                body.entry(key).or_insert(value);
            }
        }

        Self {
            event: ServerEvent::Ack.as_str().to_string(),
            data: Value::Object(body),
            ack: None,
        }
    }

    // === Parsing Client Messages ===

    /// Decode the payload into a typed client payload
    pub fn decode_data<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }

    // === Utilities ===

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Create an error close frame
    #[must_use]
    pub fn close_frame(code: CloseCode) -> (u16, String) {
        (code.as_u16(), code.description().to_string())
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GatewayMessage(event={}", self.event)?;
        if let Some(ack) = self.ack {
            write!(f, ", ack={ack}")?;
        }
        write!(f, ")")
    }
}
