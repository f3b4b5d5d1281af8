//! Best-effort decoding of raw request/response bodies.

use serde_json::{Map, Value};

/// A payload as it appears in a log record.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The body was a JSON object.
    Structured(Map<String, Value>),
    /// Anything else, kept verbatim.
    Raw(String),
}

impl Payload {
    pub fn is_structured(&self) -> bool {
        matches!(self, Payload::Structured(_))
    }
}

impl From<Payload> for Value {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::Structured(map) => Value::Object(map),
            Payload::Raw(raw) => Value::String(raw),
        }
    }
}

/// Decode `raw` as a JSON object, falling back to the raw text.
///
/// Never fails: arrays, scalars, empty input and invalid JSON all become
/// [`Payload::Raw`].
pub fn normalize(raw: &[u8]) -> Payload {
    match serde_json::from_slice::<Map<String, Value>>(raw) {
        Ok(map) => Payload::Structured(map),
        Err(_) => Payload::Raw(String::from_utf8_lossy(raw).into_owned()),
    }
}
