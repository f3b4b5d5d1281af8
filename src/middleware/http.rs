//! Canonical logging middleware for axum.
//!
//! # Example
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/api/users/{id}", get(get_user))
//!     .layer(axum::middleware::from_fn_with_state(
//!         HttpLogging::new(logger),
//!         canonical_logging,
//!     ));
//! ```
//!
//! Handlers report domain failures by returning a [`DomainError`]; its
//! `IntoResponse` impl leaves a copy in the response extensions where the
//! middleware picks it up.

use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes, HttpBody},
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use futures_util::FutureExt;
use serde_json::{json, Map, Value};

use crate::canonical::{
    CanonicalError, CanonicalEvent, CanonicalLog, DomainError, HumanDuration, OpaqueError, Traffic,
};
use crate::logger::{Fields, Level, LogRecord, Logger, LoggerError, TraceContext};

/// Logged in place of a body that was too large or of unknown length.
pub const BODY_NOT_CAPTURED: &str = "<body not captured>";

/// Request headers copied into the metadata group.
const CAPTURED_HEADERS: [&str; 4] = ["accept-language", "x-request-id", "x-username", "x-user-id"];

/// Middleware state.
#[derive(Debug, Clone)]
pub struct HttpLogging {
    logger: Arc<Logger>,
}

impl HttpLogging {
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

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }
}

/// Emit one canonical record per request.
pub async fn canonical_logging(
    State(logging): State<HttpLogging>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let limit = logging.logger.max_body_bytes();
    let trace = trace_from_headers(req.headers());
    let md = request_metadata(&req);
    let log = CanonicalLog::new("http", Traffic::Internal)
        .method(req.method().as_str())
        .path(req.uri().path());

    let (parts, body) = req.into_parts();
    let (request_body, body) = match capture(body, limit).await {
        Ok(captured) => captured,
        Err(e) => {
            let error = CanonicalError::from(OpaqueError::from_error(e));
            let response = (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Bad Request" })),
            )
                .into_response();
            logging.emit(&trace, log, md, RecordParts {
                status: StatusCode::BAD_REQUEST,
                request: &[],
                response: &[],
                error: Some(&error),
                elapsed: start.elapsed(),
            });
            return response;
        }
    };

    let req = Request::from_parts(parts, body);
    let (response, panicked) = match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => (response, None),
        Err(panic) => {
            let error = OpaqueError::from_panic(panic);
            logging.logger.emit(
                &trace,
                LogRecord::new(Level::Error, "Recovered from handler panic")
                    .with_field("type", "httpserver")
                    .with_field("path", log.path.as_str())
                    .with_field("error", error.message()),
            );
            (internal_error(), Some(CanonicalError::from(error)))
        }
    };

    let (mut parts, body) = response.into_parts();
    let (response_body, body, stream_error) = match capture(body, limit).await {
        Ok((bytes, body)) => (bytes, body, None),
        Err(e) => {
            let fallback = internal_error();
            parts.status = fallback.status();
            let (_, body) = fallback.into_parts();
            (
                Bytes::new(),
                body,
                Some(CanonicalError::from(OpaqueError::from_error(e))),
            )
        }
    };

    let domain = parts
        .extensions
        .get::<DomainError>()
        .cloned()
        .map(CanonicalError::from);
    let error = panicked.or(stream_error).or(domain);

    logging.emit(&trace, log, md, RecordParts {
        status: parts.status,
        request: &request_body,
        response: &response_body,
        error: error.as_ref(),
        elapsed: start.elapsed(),
    });

    Response::from_parts(parts, body)
}

struct RecordParts<'a> {
    status: StatusCode,
    request: &'a [u8],
    response: &'a [u8],
    error: Option<&'a CanonicalError>,
    elapsed: Duration,
}

impl HttpLogging {
    fn emit(&self, trace: &TraceContext, log: CanonicalLog, mut md: Map<String, Value>, parts: RecordParts<'_>) {
        md.insert("duration".into(), json!(HumanDuration(parts.elapsed).to_string()));
        let hint = if parts.status.as_u16() >= 400 {
            Level::Error
        } else {
            Level::Info
        };

        let mut metadata = Fields::new();
        metadata.insert("httpserver_md".into(), Value::Object(md));

        let event = CanonicalEvent::new(
            log.status(i32::from(parts.status.as_u16()))
                .duration(parts.elapsed),
        )
        .severity_hint(hint)
        .request(parts.request)
        .response(parts.response)
        .error(parts.error)
        .metadata(metadata);

        self.logger.canonical(trace, event);
    }
}

/// Buffer `body` when its length is known to fit in `limit`.
///
/// Returns the captured bytes and a body to forward in its place.
async fn capture(body: Body, limit: usize) -> Result<(Bytes, Body), axum::Error> {
    let fits = body
        .size_hint()
        .upper()
        .is_some_and(|upper| upper <= limit as u64);
    if !fits {
        return Ok((Bytes::from_static(BODY_NOT_CAPTURED.as_bytes()), body));
    }

    let bytes = axum::body::to_bytes(body, limit).await?;
    Ok((bytes.clone(), Body::from(bytes)))
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal Server Error" })),
    )
        .into_response()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn trace_from_headers(headers: &HeaderMap) -> TraceContext {
    headers
        .get("traceparent")
        .and_then(|v| v.to_str().ok())
        .and_then(TraceContext::from_traceparent)
        .unwrap_or_default()
}

/// Peer address, falling back to the first `x-forwarded-for` hop.
fn client_ip(req: &Request<Body>) -> String {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    header_str(req.headers(), "x-forwarded-for")
        .split(',')
        .next()
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

fn request_metadata(req: &Request<Body>) -> Map<String, Value> {
    let headers = req.headers();
    let mut md = Map::new();
    md.insert("type".into(), json!("httpserver"));
    md.insert("method".into(), json!(req.method().as_str()));
    md.insert("path".into(), json!(req.uri().path()));
    md.insert("ip".into(), json!(client_ip(req)));
    for name in CAPTURED_HEADERS {
        md.insert(name.into(), json!(header_str(headers, name)));
    }

    let permissions: Vec<&str> = header_str(headers, "x-permissions")
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    md.insert("x-permissions".into(), json!(permissions));
    md
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.api_status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = json!({
            "status_code": status.as_u16(),
            "data": null,
            "error": {
                "code": self.code,
                "message": self.global_message,
            },
        });

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(self);
        response
    }
}
