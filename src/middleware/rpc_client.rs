//! Logging for outbound unary RPC calls.
//!
//! Each call produces two records: the request as sent and the response as
//! received. Message bodies are masked with their [`SensitiveFields`]
//! declaration first.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::{json, Value};

use crate::canonical::{CanonicalError, HumanDuration};
use crate::logger::{Fields, Level, LogRecord, Logger, LoggerError, TraceContext};
use crate::middleware::mask::{mask_sensitive, SensitiveFields};
use crate::middleware::rpc::{message_map, metadata_value, trace_from_metadata, Metadata, RpcCode};

/// Outcome of an invoker: the result plus the headers the server sent back.
#[derive(Debug)]
pub struct RpcReply<Resp> {
    pub result: Result<Resp, CanonicalError>,
    pub headers: Metadata,
}

impl<Resp> From<Result<Resp, CanonicalError>> for RpcReply<Resp> {
    fn from(result: Result<Resp, CanonicalError>) -> Self {
        Self {
            result,
            headers: Metadata::new(),
        }
    }
}

/// Wraps client-side invokers.
#[derive(Debug, Clone)]
pub struct RpcClientLogging {
    logger: Arc<Logger>,
}

impl RpcClientLogging {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }

    /// Build from the global logger.
    ///
    /// # Panics
    /// If `logger::init` has not run.
    pub fn from_global() -> Self {
        match Self::try_from_global() {
            Ok(logging) => logging,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_from_global() -> Result<Self, LoggerError> {
        crate::logger::global()
            .map(Self::new)
            .ok_or(LoggerError::Uninitialized)
    }

    /// Send `request` through `invoker`, logging both directions.
    pub async fn invoke<Req, Resp, F, Fut>(
        &self,
        method: &str,
        metadata: &Metadata,
        request: Req,
        invoker: F,
    ) -> Result<Resp, CanonicalError>
    where
        Req: Serialize + SensitiveFields,
        Resp: Serialize + SensitiveFields,
        F: FnOnce(Req) -> Fut,
        Fut: Future<Output = RpcReply<Resp>>,
    {
        let trace = trace_from_metadata(metadata);
        let start = Instant::now();

        self.log_request(&trace, method, metadata, &request);
        let reply = invoker(request).await;
        self.log_response(&trace, method, &reply, start);

        reply.result
    }

    fn log_request<Req>(&self, trace: &TraceContext, method: &str, metadata: &Metadata, request: &Req)
    where
        Req: Serialize + SensitiveFields,
    {
        let body = self.masked_body(trace, "request", request);

        let record = LogRecord::new(Level::Info, format!("Sent RPC request to {method}"))
            .with_field("type", "rpcclient")
            .with_field("method", method)
            .with_field("metadata", metadata_value(metadata))
            .with_field("body", body);
        self.logger.emit(trace, record);
    }

    fn log_response<Resp>(&self, trace: &TraceContext, method: &str, reply: &RpcReply<Resp>, start: Instant)
    where
        Resp: Serialize + SensitiveFields,
    {
        let body = match &reply.result {
            Ok(response) => self.masked_body(trace, "response", response),
            Err(_) => Value::Null,
        };
        let error = reply.result.as_ref().err();
        let status = RpcCode::for_outcome(error);
        let level = if error.is_some() { Level::Error } else { Level::Info };

        let record = LogRecord::new(level, format!("Received RPC response from {method}"))
            .with_field("type", "rpcclient")
            .with_field("method", method)
            .with_field("metadata", metadata_value(&reply.headers))
            .with_field("body", body)
            .with_field("status_code", status.as_str())
            .with_field("error", error.map(|e| json!(e.to_string())).unwrap_or(Value::Null))
            .with_field("duration", HumanDuration(start.elapsed()).to_string());
        self.logger.emit(trace, record);
    }

    /// Normalized, masked body. Conversion failures are logged and yield null.
    fn masked_body<T>(&self, trace: &TraceContext, what: &str, message: &T) -> Value
    where
        T: Serialize + SensitiveFields,
    {
        match message_map(message) {
            Ok(Some(mut map)) => {
                mask_sensitive(&mut map, T::sensitive_fields());
                Value::Object(map)
            }
            Ok(None) => Value::Null,
            Err(e) => {
                let mut fields = Fields::new();
                fields.insert("error".into(), json!(e.to_string()));
                self.logger.emit(
                    trace,
                    LogRecord {
                        level: Level::Warn,
                        message: format!("failed to convert {what} to map"),
                        fields,
                    },
                );
                Value::Null
            }
        }
    }
}

