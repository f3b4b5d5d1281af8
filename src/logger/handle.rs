//! The logger handle.
//!
//! A [`Logger`] bundles everything emission needs: the process identity, the
//! sink, the redaction policy and the compiled canonical template. It is
//! immutable once built and shared as `Arc<Logger>`; adapters receive it
//! explicitly.

use std::sync::Arc;

use serde_json::json;

use crate::canonical::redaction::RedactionPolicy;
use crate::canonical::template::CanonicalTemplate;
use crate::config::loader::{env_or, env_var};
use crate::config::{HttpConfig, LogConfig};
use crate::logger::error::LoggerError;
use crate::logger::level::Level;
use crate::logger::record::{Fields, LogRecord, TraceContext};
use crate::logger::sink::{Sink, TracingSink};
use crate::logger::subscriber::LevelHandle;

/// Who is logging: fixed for the life of the handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub env: String,
    pub service: String,
    pub version: String,
}

impl Identity {
    pub fn new(
        env: impl Into<String>,
        service: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            env: env.into(),
            service: service.into(),
            version: version.into(),
        }
    }

    /// Identity from `config`, overridden by `DD_ENV`, `DD_SERVICE` and
    /// `DD_VERSION`. Version defaults to `unknown`.
    pub fn resolve(config: &LogConfig) -> Self {
        Self {
            env: env_or("DD_ENV", &config.env),
            service: env_or("DD_SERVICE", &config.service_name),
            version: env_var("DD_VERSION").unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new("local", "blogger-service", "unknown")
    }
}

pub struct Logger {
    identity: Identity,
    sink: Arc<dyn Sink>,
    redaction: RedactionPolicy,
    template: Option<CanonicalTemplate>,
    max_body_bytes: usize,
    level: Option<LevelHandle>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("identity", &self.identity)
            .field("redaction", &self.redaction)
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn redaction(&self) -> &RedactionPolicy {
        &self.redaction
    }

    pub fn template(&self) -> Option<&CanonicalTemplate> {
        self.template.as_ref()
    }

    /// Largest body the HTTP adapter buffers.
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Change the minimum level of the installed subscriber, if this handle
    /// controls one.
    pub fn set_level(&self, level: Level) -> Result<(), LoggerError> {
        match &self.level {
            Some(handle) => handle.set_level(level),
            None => Ok(()),
        }
    }

    /// Attach identity and trace fields, then hand the record to the sink.
    pub fn emit(&self, trace: &TraceContext, mut record: LogRecord) {
        if let Some(trace_id) = &trace.trace_id {
            record.fields.insert("trace_id".into(), json!(trace_id));
        }
        if let Some(span_id) = &trace.span_id {
            record.fields.insert("span_id".into(), json!(span_id));
        }
        record.fields.insert(
            "dd".into(),
            json!({
                "env": self.identity.env,
                "service": self.identity.service,
                "trace_id": trace.trace_id.as_deref().unwrap_or_default(),
                "span_id": trace.span_id.as_deref().unwrap_or_default(),
                "version": self.identity.version,
            }),
        );

        self.sink.emit(&record);
    }

    /// Emit a plain message with fields and no trace context.
    pub fn log(&self, level: Level, message: impl Into<String>, fields: Fields) {
        let mut record = LogRecord::new(level, message);
        record.fields = fields;
        self.emit(&TraceContext::default(), record);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message, Fields::new());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message, Fields::new());
    }
}

/// Builder for [`Logger`]. Defaults: [`TracingSink`], default identity,
/// default deny-list, default template.
pub struct LoggerBuilder {
    identity: Identity,
    sink: Arc<dyn Sink>,
    redaction: RedactionPolicy,
    template: Option<CanonicalTemplate>,
    max_body_bytes: usize,
    level: Option<LevelHandle>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            identity: Identity::default(),
            sink: Arc::new(TracingSink),
            redaction: RedactionPolicy::default(),
            template: Some(CanonicalTemplate::default()),
            max_body_bytes: HttpConfig::default().max_body_bytes,
            level: None,
        }
    }
}

impl LoggerBuilder {
    pub fn identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    pub fn sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn redaction(mut self, redaction: RedactionPolicy) -> Self {
        self.redaction = redaction;
        self
    }

    pub fn template(mut self, template: CanonicalTemplate) -> Self {
        self.template = Some(template);
        self
    }

    /// Build without a canonical template; summaries fall back to a fixed message.
    pub fn without_template(mut self) -> Self {
        self.template = None;
        self
    }

    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub(crate) fn level_handle(mut self, level: Option<LevelHandle>) -> Self {
        self.level = level;
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            identity: self.identity,
            sink: self.sink,
            redaction: self.redaction,
            template: self.template,
            max_body_bytes: self.max_body_bytes,
            level: self.level,
        }
    }
}

/// A service-scoped logger: messages are prefixed `[service][<name>] `.
#[derive(Debug, Clone)]
pub struct Pathfinder {
    logger: Arc<Logger>,
    service: String,
}

impl Pathfinder {
    pub fn new(logger: Arc<Logger>, service: impl Into<String>) -> Self {
        Self {
            logger,
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Nested scope: `orders` → `orders.payment`.
    pub fn child(&self, service: &str) -> Self {
        Self {
            logger: self.logger.clone(),
            service: format!("{}.{}", self.service, service),
        }
    }

    pub fn info(&self, trace: &TraceContext, message: &str, fields: Fields) {
        self.emit(trace, Level::Info, message, fields);
    }

    pub fn error(&self, trace: &TraceContext, message: &str, fields: Fields) {
        self.emit(trace, Level::Error, message, fields);
    }

    fn emit(&self, trace: &TraceContext, level: Level, message: &str, fields: Fields) {
        let mut record = LogRecord::new(level, format!("[service][{}] {}", self.service, message));
        record.fields = fields;
        self.logger.emit(trace, record);
    }
}
