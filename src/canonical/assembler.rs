//! Canonical log assembly.
//!
//! One call per request: normalize payloads, apply route redaction,
//! classify the error, render the summary and emit a single record.

use serde_json::{json, Value};

use crate::canonical::classify::classify;
use crate::canonical::error::CanonicalError;
use crate::canonical::payload::normalize;
use crate::canonical::record::CanonicalLog;
use crate::canonical::redaction::{RedactionPolicy, REDACTED};
use crate::canonical::template::{render_summary, CanonicalTemplate};
use crate::logger::{Fields, Level, LogRecord, Logger, TraceContext};

/// Value of the `logger_name` field on canonical records.
pub const LOGGER_NAME: &str = "canonical";

/// Everything an adapter knows about a finished request.
#[derive(Debug)]
pub struct CanonicalEvent<'a> {
    /// Level the adapter would pick. Advisory: the outcome decides.
    pub severity_hint: Level,
    pub request: &'a [u8],
    pub response: &'a [u8],
    pub error: Option<&'a CanonicalError>,
    pub log: CanonicalLog,
    /// Adapter-specific fields, nested under `md`.
    pub metadata: Fields,
}

impl<'a> CanonicalEvent<'a> {
    pub fn new(log: CanonicalLog) -> Self {
        Self {
            severity_hint: Level::Info,
            request: &[],
            response: &[],
            error: None,
            log,
            metadata: Fields::new(),
        }
    }

    pub fn severity_hint(mut self, level: Level) -> Self {
        self.severity_hint = level;
        self
    }

    pub fn request(mut self, request: &'a [u8]) -> Self {
        self.request = request;
        self
    }

    pub fn response(mut self, response: &'a [u8]) -> Self {
        self.response = response;
        self
    }

    pub fn error(mut self, error: Option<&'a CanonicalError>) -> Self {
        self.error = error;
        self
    }

    pub fn metadata(mut self, metadata: Fields) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Build the canonical record for `event`.
pub fn assemble(
    event: CanonicalEvent<'_>,
    policy: &RedactionPolicy,
    template: Option<&CanonicalTemplate>,
) -> LogRecord {
    let CanonicalEvent {
        request,
        response,
        error,
        mut log,
        metadata,
        ..
    } = event;

    let mut request_field: Value = normalize(request).into();
    let redact = policy.should_redact(&log.path);
    if redact {
        request_field = json!(REDACTED);
    }

    let classification = classify(error, response);
    if let Some(message) = classification.message_override {
        log.message = message;
    }

    let (response_field, error_group) = if redact {
        (json!(REDACTED), None)
    } else {
        (classification.response, classification.error_group)
    };

    let summary = render_summary(template, &log);

    let mut record = LogRecord::new(classification.level, summary);
    record.fields.insert("request".into(), request_field);
    if let Some(group) = error_group {
        record.fields.insert("error".into(), group);
    }
    record.fields.insert("response".into(), response_field);
    record.fields.insert("logger_name".into(), json!(LOGGER_NAME));
    record.fields.insert("md".into(), Value::Object(metadata));
    record
}

impl Logger {
    /// Assemble and emit the canonical record of one request.
    pub fn canonical(&self, trace: &TraceContext, event: CanonicalEvent<'_>) {
        let record = assemble(event, self.redaction(), self.template());
        self.emit(trace, record);
    }
}
