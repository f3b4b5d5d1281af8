//! Canonical record assembly through a `Logger` handle.

use std::time::Duration;

use blogger::canonical::{
    CanonicalError, CanonicalEvent, CanonicalLog, DomainError, StackFrame, Traffic, LOGGER_NAME,
    REDACTED,
};
use blogger::logger::{Fields, Level, TraceContext};
use serde_json::json;

mod common;

fn get_order() -> CanonicalLog {
    CanonicalLog::new("http", Traffic::Inbound)
        .method("GET")
        .status(200)
        .path("/api/orders/7")
        .duration(Duration::from_millis(12))
}

#[test]
fn test_success_record_shape() {
    let (logger, sink) = common::memory_logger();
    let trace = TraceContext::from_traceparent(common::TRACEPARENT).unwrap();

    let mut md = Fields::new();
    md.insert("httpserver_md".into(), json!({ "ip": "10.1.1.1" }));
    logger.canonical(
        &trace,
        CanonicalEvent::new(get_order())
            .request(b"{\"id\":7}")
            .response(b"{\"status\":\"shipped\"}")
            .metadata(md),
    );

    let record = sink.last().unwrap();
    assert_eq!(record.level, Level::Info);
    assert_eq!(
        record.message,
        "[http][inbound] GET 200 /api/orders/7 12ms - "
    );
    assert_eq!(record.field("request.id"), Some(&json!(7)));
    assert_eq!(record.field("response.status"), Some(&json!("shipped")));
    assert_eq!(record.field("logger_name"), Some(&json!(LOGGER_NAME)));
    assert_eq!(record.field("md.httpserver_md.ip"), Some(&json!("10.1.1.1")));
    assert_eq!(record.field("trace_id"), Some(&json!(common::TRACE_ID)));
    assert_eq!(record.field("dd.span_id"), Some(&json!(common::SPAN_ID)));
    assert_eq!(record.field("dd.service"), Some(&json!("orders-api")));
    assert_eq!(record.field("dd.version"), Some(&json!("1.2.3")));
    assert!(record.field("error").is_none());
}

#[test]
fn test_raw_payloads_kept_as_strings() {
    let (logger, sink) = common::memory_logger();

    logger.canonical(
        &TraceContext::default(),
        CanonicalEvent::new(get_order())
            .request(b"plain text")
            .response(b"[1,2,3]"),
    );

    let record = sink.last().unwrap();
    assert_eq!(record.field("request"), Some(&json!("plain text")));
    assert_eq!(record.field("response"), Some(&json!("[1,2,3]")));
    assert!(record.field("trace_id").is_none());
    assert_eq!(record.field("dd.trace_id"), Some(&json!("")));
}

#[test]
fn test_domain_error_record() {
    let (logger, sink) = common::memory_logger();
    let error = CanonicalError::from(
        DomainError::not_found(404_007, "order 7 not found")
            .with_detail("order_id", 7)
            .with_frame(StackFrame::new(
                "repository",
                "no rows",
                "a\n\tb\n\tc\n\td\n\te\n\tf\n\tg\n\th",
            )),
    );

    logger.canonical(
        &TraceContext::default(),
        CanonicalEvent::new(get_order().status(404))
            .severity_hint(Level::Warn)
            .response(b"ignored")
            .error(Some(&error)),
    );

    let record = sink.last().unwrap();
    assert_eq!(record.level, Level::Error);
    assert!(record.message.ends_with(" - order 7 not found"));
    assert_eq!(record.field("response.status_code"), Some(&json!(404)));
    assert_eq!(record.field("response.data"), Some(&json!(null)));
    assert_eq!(record.field("response.error.code"), Some(&json!(404_007)));
    assert_eq!(record.field("response.error.details.order_id"), Some(&json!(7)));
    assert_eq!(record.field("error.kind"), Some(&json!("repository")));
    assert_eq!(
        record.field("error.stack"),
        Some(&json!("a\n\tb\n\tc\n\td\n\te\n\tf"))
    );
}

#[test]
fn test_domain_error_always_logged_at_error() {
    let (logger, sink) = common::memory_logger();
    let error = CanonicalError::from(
        DomainError::bad_request(400_001, "missing field").with_level(Level::Debug),
    );

    logger.canonical(
        &TraceContext::default(),
        CanonicalEvent::new(get_order().status(400)).error(Some(&error)),
    );

    assert_eq!(sink.last().unwrap().level, Level::Error);
}

#[test]
fn test_opaque_error_keeps_raw_response() {
    let (logger, sink) = common::memory_logger();
    let error = CanonicalError::opaque("connection reset");

    logger.canonical(
        &TraceContext::default(),
        CanonicalEvent::new(get_order().status(502).message("upstream failed"))
            .response(b"{\"retry\":true}")
            .error(Some(&error)),
    );

    let record = sink.last().unwrap();
    assert_eq!(record.level, Level::Error);
    assert!(record.message.ends_with(" - upstream failed"));
    assert_eq!(record.field("response.retry"), Some(&json!(true)));
    assert!(record.field("error").is_none());
}

#[test]
fn test_success_ignores_severity_hint() {
    let (logger, sink) = common::memory_logger();

    logger.canonical(
        &TraceContext::default(),
        CanonicalEvent::new(get_order()).severity_hint(Level::Error),
    );

    assert_eq!(sink.last().unwrap().level, Level::Info);
}

#[test]
fn test_sensitive_route_redacted() {
    let (logger, sink) = common::memory_logger();
    let error = CanonicalError::from(
        DomainError::unauthorized(401_001, "bad password")
            .with_frame(StackFrame::new("auth", "mismatch", "x")),
    );

    logger.canonical(
        &TraceContext::default(),
        CanonicalEvent::new(
            CanonicalLog::new("http", Traffic::Inbound)
                .method("POST")
                .status(401)
                .path("/api/Auth/Login"),
        )
        .request(b"{\"password\":\"hunter2\"}")
        .error(Some(&error)),
    );

    let record = sink.last().unwrap();
    assert_eq!(record.field("request"), Some(&json!(REDACTED)));
    assert_eq!(record.field("response"), Some(&json!(REDACTED)));
    assert!(record.field("error").is_none());
    assert_eq!(record.level, Level::Error);
}
