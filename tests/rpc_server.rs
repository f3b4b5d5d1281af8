//! Tests for the unary RPC server interceptor.

use blogger::canonical::{CanonicalError, DomainError};
use blogger::logger::Level;
use blogger::middleware::{Metadata, RpcServerLogging, HEALTH_CHECK_METHOD};
use serde::Serialize;
use serde_json::json;

mod common;

#[derive(Debug, Serialize)]
struct GetUser {
    id: u64,
}

#[derive(Debug, Serialize, PartialEq)]
struct User {
    id: u64,
    name: String,
}

async fn get_user(req: GetUser) -> Result<User, CanonicalError> {
    if req.id == 1 {
        Ok(User {
            id: 1,
            name: "Ada".into(),
        })
    } else {
        Err(DomainError::not_found(404_001, format!("user {} not found", req.id)).into())
    }
}

async fn explode(_req: GetUser) -> Result<User, CanonicalError> {
    panic!("index out of range")
}

fn traced_metadata() -> Metadata {
    let mut md = Metadata::new();
    md.insert("traceparent".into(), common::TRACEPARENT.into());
    md
}

#[tokio::test]
async fn test_successful_call() {
    let (logger, sink) = common::memory_logger();
    let logging = RpcServerLogging::new(logger);

    let user = logging
        .intercept("/users.UserService/Get", &traced_metadata(), GetUser { id: 1 }, get_user)
        .await
        .unwrap();
    assert_eq!(user.name, "Ada");

    assert_eq!(sink.len(), 1);
    let record = sink.last().unwrap();
    assert_eq!(record.level, Level::Info);
    assert!(record
        .message
        .starts_with("[grpc][internal] POST 0 /users.UserService/Get "));
    assert_eq!(record.field("request.id"), Some(&json!(1)));
    assert_eq!(record.field("response.name"), Some(&json!("Ada")));
    assert_eq!(record.field("md.rpcserver_md.code"), Some(&json!("OK")));
    assert_eq!(
        record.field("md.rpcserver_md.path"),
        Some(&json!("/users.UserService/Get"))
    );
    assert_eq!(record.field("trace_id"), Some(&json!(common::TRACE_ID)));
}

#[tokio::test]
async fn test_domain_error_call() {
    let (logger, sink) = common::memory_logger();
    let logging = RpcServerLogging::new(logger);

    let err = logging
        .intercept("/users.UserService/Get", &Metadata::new(), GetUser { id: 3 }, get_user)
        .await
        .unwrap_err();
    assert_eq!(err.as_domain().unwrap().code, 404_001);

    let record = sink.last().unwrap();
    assert_eq!(record.level, Level::Error);
    assert!(record.message.contains(" POST 5 "));
    assert!(record.message.ends_with(" - user 3 not found"));
    assert_eq!(record.field("md.rpcserver_md.code"), Some(&json!("NOT_FOUND")));
    assert_eq!(record.field("response.error.code"), Some(&json!(404_001)));
}

#[tokio::test]
async fn test_panicking_handler_reported_internal() {
    let (logger, sink) = common::memory_logger();
    let logging = RpcServerLogging::new(logger);

    let err = logging
        .intercept("/users.UserService/Get", &Metadata::new(), GetUser { id: 1 }, explode)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("index out of range"));

    let record = sink.last().unwrap();
    assert_eq!(record.level, Level::Error);
    assert!(record.message.contains(" POST 13 "));
    assert_eq!(record.field("md.rpcserver_md.code"), Some(&json!("INTERNAL")));
}

#[tokio::test]
async fn test_health_check_not_logged() {
    let (logger, sink) = common::memory_logger();
    let logging = RpcServerLogging::new(logger);

    let user = logging
        .intercept(HEALTH_CHECK_METHOD, &Metadata::new(), GetUser { id: 1 }, get_user)
        .await
        .unwrap();

    assert_eq!(user.id, 1);
    assert!(sink.is_empty());
}
