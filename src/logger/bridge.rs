//! Bridge for libraries with their own level scheme.
//!
//! Database drivers and similar tools report `(level, message, data)`
//! triples on a six-level scale. [`log_external`] maps them onto the four
//! levels sinks understand; levels without a counterpart log as `Error`.

use serde_json::Value;

use crate::logger::handle::Logger;
use crate::logger::level::Level;
use crate::logger::record::{Fields, LogRecord, TraceContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    None,
}

impl ExternalLevel {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "trace" => ExternalLevel::Trace,
            "debug" => ExternalLevel::Debug,
            "info" => ExternalLevel::Info,
            "warn" | "warning" => ExternalLevel::Warn,
            "error" => ExternalLevel::Error,
            _ => ExternalLevel::None,
        }
    }
}

impl From<ExternalLevel> for Level {
    fn from(level: ExternalLevel) -> Self {
        match level {
            ExternalLevel::Trace | ExternalLevel::Debug => Level::Debug,
            ExternalLevel::Info => Level::Info,
            ExternalLevel::Warn => Level::Warn,
            ExternalLevel::Error | ExternalLevel::None => Level::Error,
        }
    }
}

/// Log an external library's message with its data map as fields.
pub fn log_external<I>(
    logger: &Logger,
    trace: &TraceContext,
    level: ExternalLevel,
    message: &str,
    data: I,
) where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut record = LogRecord::new(level.into(), message);
    record.fields = data.into_iter().collect::<Fields>();
    logger.emit(trace, record);
}
