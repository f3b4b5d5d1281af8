//! Records handed to sinks, and the trace context attached to them.

use serde_json::{Map, Value};

use crate::logger::level::Level;

/// Structured fields of a record: a JSON object.
pub type Fields = Map<String, Value>;

/// One log emission.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub level: Level,
    pub message: String,
    pub fields: Fields,
}

impl LogRecord {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            fields: Fields::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Look up a field by dotted path, e.g. `"response.error.code"`.
    pub fn field(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.fields.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }
}

/// Trace correlation identifiers for the current request.
///
/// Populated from a W3C `traceparent` value when the caller has one; the
/// default context carries no identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
}

impl TraceContext {
    pub fn new(trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        Self {
            trace_id: Some(trace_id.into()),
            span_id: Some(span_id.into()),
        }
    }

    /// Parse `version-traceid-spanid-flags`. Malformed or all-zero ids yield `None`.
    pub fn from_traceparent(value: &str) -> Option<Self> {
        let mut parts = value.trim().split('-');
        let version = parts.next()?;
        let trace_id = parts.next()?;
        let span_id = parts.next()?;
        let flags = parts.next()?;

        if version.len() != 2 || flags.len() != 2 || version == "ff" {
            return None;
        }
        if !is_hex_id(trace_id, 32) || !is_hex_id(span_id, 16) {
            return None;
        }

        Some(Self::new(trace_id.to_ascii_lowercase(), span_id.to_ascii_lowercase()))
    }

    pub fn is_empty(&self) -> bool {
        self.trace_id.is_none() && self.span_id.is_none()
    }
}

fn is_hex_id(id: &str, len: usize) -> bool {
    id.len() == len
        && id.chars().all(|c| c.is_ascii_hexdigit())
        && id.chars().any(|c| c != '0')
}
