//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use blogger::logger::{Identity, Logger, MemorySink};

pub const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";
pub const TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
pub const SPAN_ID: &str = "00f067aa0ba902b7";

/// A logger that records into memory instead of the tracing subscriber.
pub fn memory_logger() -> (Arc<Logger>, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let logger = Logger::builder()
        .identity(Identity::new("test", "orders-api", "1.2.3"))
        .sink(sink.clone())
        .build();
    (Arc::new(logger), sink)
}
