//! Pieces shared by the RPC server and client adapters.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::canonical::CanonicalError;
use crate::logger::TraceContext;

/// Call metadata (headers), lower-case keys.
pub type Metadata = BTreeMap<String, String>;

/// Health checks are passed through without logging.
pub const HEALTH_CHECK_METHOD: &str = "/grpc.health.v1.Health/Check";

/// gRPC status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcCode {
    Ok = 0,
    Cancelled = 1,
    Unknown = 2,
    InvalidArgument = 3,
    DeadlineExceeded = 4,
    NotFound = 5,
    AlreadyExists = 6,
    PermissionDenied = 7,
    ResourceExhausted = 8,
    FailedPrecondition = 9,
    Aborted = 10,
    OutOfRange = 11,
    Unimplemented = 12,
    Internal = 13,
    Unavailable = 14,
    DataLoss = 15,
    Unauthenticated = 16,
}

impl RpcCode {
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Self::FailedPrecondition => "FAILED_PRECONDITION",
            Self::Aborted => "ABORTED",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::Unimplemented => "UNIMPLEMENTED",
            Self::Internal => "INTERNAL",
            Self::Unavailable => "UNAVAILABLE",
            Self::DataLoss => "DATA_LOSS",
            Self::Unauthenticated => "UNAUTHENTICATED",
        }
    }

    /// Closest RPC code for an HTTP status.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            200..=299 => Self::Ok,
            400 => Self::InvalidArgument,
            401 => Self::Unauthenticated,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            409 => Self::AlreadyExists,
            412 => Self::FailedPrecondition,
            429 => Self::ResourceExhausted,
            499 => Self::Cancelled,
            500 => Self::Internal,
            501 => Self::Unimplemented,
            503 => Self::Unavailable,
            504 => Self::DeadlineExceeded,
            _ => Self::Unknown,
        }
    }

    /// Code reported for the outcome of a call.
    pub fn for_outcome(error: Option<&CanonicalError>) -> Self {
        match error {
            None => Self::Ok,
            Some(CanonicalError::Domain(e)) => match Self::from_http_status(e.api_status_code) {
                // A domain error is never a success.
                Self::Ok => Self::Unknown,
                code => code,
            },
            Some(CanonicalError::Opaque(_)) => Self::Unknown,
        }
    }
}

impl fmt::Display for RpcCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trace context from a `traceparent` metadata entry.
pub fn trace_from_metadata(metadata: &Metadata) -> TraceContext {
    metadata
        .get("traceparent")
        .and_then(|v| TraceContext::from_traceparent(v))
        .unwrap_or_default()
}

/// Metadata as a JSON object for log fields.
pub(crate) fn metadata_value(metadata: &Metadata) -> Value {
    Value::Object(
        metadata
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

/// JSON bytes of a message; unserializable messages log as empty.
pub(crate) fn message_bytes<T: Serialize>(message: &T) -> Vec<u8> {
    serde_json::to_vec(message).unwrap_or_default()
}

/// A message as a JSON object. `Ok(None)` for messages that are not objects.
pub(crate) fn message_map<T: Serialize>(message: &T) -> Result<Option<Map<String, Value>>, serde_json::Error> {
    match serde_json::to_value(message)? {
        Value::Object(map) => Ok(Some(map)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::{DomainError, OpaqueError};

    #[test]
    fn test_code_values() {
        assert_eq!(RpcCode::Ok.as_i32(), 0);
        assert_eq!(RpcCode::NotFound.as_i32(), 5);
        assert_eq!(RpcCode::Unauthenticated.as_i32(), 16);
        assert_eq!(RpcCode::Internal.to_string(), "INTERNAL");
    }

    #[test]
    fn test_outcome_codes() {
        assert_eq!(RpcCode::for_outcome(None), RpcCode::Ok);

        let not_found = CanonicalError::from(DomainError::not_found(1, "gone"));
        assert_eq!(RpcCode::for_outcome(Some(&not_found)), RpcCode::NotFound);

        let odd = CanonicalError::from(DomainError::new(1, "m", "d").with_status(200));
        assert_eq!(RpcCode::for_outcome(Some(&odd)), RpcCode::Unknown);

        let opaque = CanonicalError::from(OpaqueError::msg("x"));
        assert_eq!(RpcCode::for_outcome(Some(&opaque)), RpcCode::Unknown);
    }

    #[test]
    fn test_message_map_shapes() {
        let map = message_map(&serde_json::json!({"a": 1})).unwrap();
        assert!(map.is_some());
        assert!(message_map(&()).unwrap().is_none());
        assert!(message_map(&vec![1, 2]).unwrap().is_none());
    }
}
