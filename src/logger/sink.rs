//! Emission sinks.
//!
//! A sink receives finished [`LogRecord`]s and performs the write. The
//! [`TracingSink`] hands records to the `tracing` dispatcher, where the
//! console/JSON/file layers installed by [`crate::logger::subscriber`] pick
//! them up. [`MemorySink`] keeps records in memory for inspection.

use std::sync::{Mutex, MutexGuard};

use crate::logger::level::Level;
use crate::logger::record::LogRecord;

/// Target used for every event emitted through the facade.
pub const TARGET: &str = "blogger";

/// Name of the event field holding a record's JSON-encoded structured fields.
pub const FIELDS_KEY: &str = "fields";

/// Accepts finished records and writes them somewhere.
pub trait Sink: Send + Sync {
    fn emit(&self, record: &LogRecord);
}

/// Forwards records to `tracing` events.
///
/// The structured fields travel as one JSON-encoded `fields` value next to
/// the event message.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl Sink for TracingSink {
    fn emit(&self, record: &LogRecord) {
        let fields = serde_json::to_string(&record.fields).unwrap_or_default();
        let message = record.message.as_str();
        match record.level {
            Level::Debug => tracing::debug!(target: TARGET, fields = %fields, "{}", message),
            Level::Info => tracing::info!(target: TARGET, fields = %fields, "{}", message),
            Level::Warn => tracing::warn!(target: TARGET, fields = %fields, "{}", message),
            Level::Error => tracing::error!(target: TARGET, fields = %fields, "{}", message),
        }
    }
}

/// Keeps every record it receives.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogRecord>> {
        // A panic while holding the lock cannot leave the Vec half-written.
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of all records so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    /// Most recent record.
    pub fn last(&self) -> Option<LogRecord> {
        self.lock().last().cloned()
    }

    /// Drain all records.
    pub fn take(&self) -> Vec<LogRecord> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Sink for MemorySink {
    fn emit(&self, record: &LogRecord) {
        self.lock().push(record.clone());
    }
}
