//! Canonical logging for unary RPC handlers.
//!
//! # Example
//! ```rust,ignore
//! let logging = RpcServerLogging::new(logger);
//! let reply = logging
//!     .intercept("/users.UserService/Get", &metadata, request, |req| service.get(req))
//!     .await;
//! ```

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use serde::Serialize;
use serde_json::json;

use crate::canonical::{CanonicalError, CanonicalEvent, CanonicalLog, HumanDuration, OpaqueError, Traffic};
use crate::logger::{Fields, Level, Logger, LoggerError};
use crate::middleware::rpc::{message_bytes, trace_from_metadata, Metadata, RpcCode, HEALTH_CHECK_METHOD};

/// Wraps server-side handlers and emits one canonical record per call.
#[derive(Debug, Clone)]
pub struct RpcServerLogging {
    logger: Arc<Logger>,
}

impl RpcServerLogging {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }

    /// Build from the global logger.
    ///
    /// # Panics
    /// If `logger::init` has not run: serving without request logs is not allowed.
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

    /// Run `handler` for `request` and log the call.
    ///
    /// A panicking handler is reported as an `INTERNAL` failure. The handler's
    /// own result is returned unchanged.
    pub async fn intercept<Req, Resp, F, Fut>(
        &self,
        method: &str,
        metadata: &Metadata,
        request: Req,
        handler: F,
    ) -> Result<Resp, CanonicalError>
    where
        Req: Serialize,
        Resp: Serialize,
        F: FnOnce(Req) -> Fut,
        Fut: Future<Output = Result<Resp, CanonicalError>>,
    {
        if method == HEALTH_CHECK_METHOD {
            return handler(request).await;
        }

        let start = Instant::now();
        let request_body = message_bytes(&request);

        let outcome = AssertUnwindSafe(async move { handler(request).await })
            .catch_unwind()
            .await;
        let elapsed = start.elapsed();

        let (result, status) = match outcome {
            Ok(result) => {
                let status = RpcCode::for_outcome(result.as_ref().err());
                (result, status)
            }
            Err(panic) => (
                Err(CanonicalError::from(OpaqueError::from_panic(panic))),
                RpcCode::Internal,
            ),
        };

        let response_body = match &result {
            Ok(response) => message_bytes(response),
            Err(_) => Vec::new(),
        };

        let mut md = Fields::new();
        md.insert(
            "rpcserver_md".into(),
            json!({
                "type": "rpcserver",
                "method": "POST",
                "path": method,
                "code": status.as_str(),
                "duration": HumanDuration(elapsed).to_string(),
            }),
        );

        let hint = if result.is_err() { Level::Error } else { Level::Info };
        let event = CanonicalEvent::new(
            CanonicalLog::new("grpc", Traffic::Internal)
                .method("POST")
                .status(status.as_i32())
                .path(method)
                .duration(elapsed),
        )
        .severity_hint(hint)
        .request(&request_body)
        .response(&response_body)
        .error(result.as_ref().err())
        .metadata(md);

        self.logger.canonical(&trace_from_metadata(metadata), event);
        result
    }
}
