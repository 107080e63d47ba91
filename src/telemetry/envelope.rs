//! JSON message envelope.
//!
//! Wire format (one WebSocket text frame per message, no extra framing):
//! ```text
//! { "type": "<discriminator>", <payload fields...> }
//! ```
//!
//! e.g. `{"type": "client-msg", "msg": "hello"}`.  Decoding is structural
//! only: the frame must be a JSON object with a string `type`.  Every other
//! field is kept verbatim as the payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::sensors::Reading;

/// Discriminator of the handshake / free-text client message.
pub const CLIENT_MSG: &str = "client-msg";
/// Discriminator of a published sensor reading.
pub const SENSOR_READING: &str = "sensor-reading";

/// Tagged message envelope, used in both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// A decoded frame received from the remote peer.
pub type InboundMessage = Envelope;
/// A message queued for the remote peer.
pub type OutboundMessage = Envelope;

impl Envelope {
    pub fn new(kind: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// `{"type": "client-msg", "msg": <text>}`
    pub fn client_msg(text: impl Into<String>) -> Self {
        let mut payload = Map::new();
        payload.insert("msg".into(), Value::String(text.into()));
        Self::new(CLIENT_MSG, payload)
    }

    /// `{"type": "sensor-reading", "humidity": .., ...}`
    pub fn reading(reading: &Reading) -> Self {
        let payload = match serde_json::to_value(reading) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self::new(SENSOR_READING, payload)
    }

    /// Decode a text frame.
    pub fn decode(frame: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(frame).map_err(|e| DecodeError::Malformed(e.to_string()))
    }

    /// Decode a binary frame (must hold UTF-8 JSON).
    pub fn decode_bytes(frame: &[u8]) -> Result<Self, DecodeError> {
        let text = core::str::from_utf8(frame).map_err(|_| DecodeError::NotUtf8)?;
        Self::decode(text)
    }

    /// Encode as a compact JSON text frame.
    pub fn encode(&self) -> String {
        // A string key map of `Value`s always serialises.
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"type\":{:?}}}", self.kind))
    }

    /// Convenience accessor for a string payload field.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.payload.get(field).and_then(Value::as_str)
    }
}
