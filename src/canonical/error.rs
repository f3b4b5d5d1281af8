//! Error model consumed by the canonical logger.
//!
//! Business logic raises a [`DomainError`] when it wants precise control over
//! what the log shows (code, messages, details, stack). Everything else is an
//! [`OpaqueError`]. The two meet in [`CanonicalError`], which the classifier
//! matches on.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::logger::Level;

/// One captured stack entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StackFrame {
    /// Classification, e.g. `"database"`.
    pub kind: String,
    /// Human description.
    pub message: String,
    /// Raw frame text, segments separated by `"\n\t"`.
    pub stack: String,
}

impl StackFrame {
    pub fn new(
        kind: impl Into<String>,
        message: impl Into<String>,
        stack: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            stack: stack.into(),
        }
    }
}

/// An error built by business logic for precise log rendering.
///
/// `Display` yields the debug message.
///
/// # Example
/// ```rust
/// use blogger::canonical::{DomainError, StackFrame};
///
/// let err = DomainError::new(4041, "User not found", "no row for id 999")
///     .with_status(404)
///     .with_detail("user_id", 999)
///     .with_frame(StackFrame::new("repository", "select failed", "users.rs:10"));
/// assert_eq!(err.to_string(), "no row for id 999");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{debug_message}")]
pub struct DomainError {
    /// Application error code.
    pub code: i64,
    /// Message safe to show to users.
    pub global_message: String,
    /// Internal message for operators.
    pub debug_message: String,
    /// Status returned to the API caller.
    pub api_status_code: u16,
    /// Arbitrary named details.
    #[serde(default)]
    pub details: Map<String, Value>,
    /// Captured stack, most relevant first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stack: Vec<StackFrame>,
    /// Severity the raising code suggested. Carried with the error; canonical
    /// records are always emitted at `Error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_level: Option<Level>,
}

impl DomainError {
    /// New error with status 500 and no details.
    pub fn new(
        code: i64,
        global_message: impl Into<String>,
        debug_message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            global_message: global_message.into(),
            debug_message: debug_message.into(),
            api_status_code: 500,
            details: Map::new(),
            stack: Vec::new(),
            override_level: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.api_status_code = status;
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details.extend(details);
        self
    }

    pub fn with_frame(mut self, frame: StackFrame) -> Self {
        self.stack.push(frame);
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.override_level = Some(level);
        self
    }

    // Convenience constructors

    pub fn bad_request(code: i64, debug_message: impl Into<String>) -> Self {
        Self::new(code, "Bad request", debug_message).with_status(400)
    }

    pub fn unauthorized(code: i64, debug_message: impl Into<String>) -> Self {
        Self::new(code, "Unauthorized", debug_message).with_status(401)
    }

    pub fn not_found(code: i64, debug_message: impl Into<String>) -> Self {
        Self::new(code, "Not found", debug_message).with_status(404)
    }

    pub fn internal(code: i64, debug_message: impl Into<String>) -> Self {
        Self::new(code, "Internal server error", debug_message)
    }
}

/// Any error that is not a [`DomainError`].
#[derive(Debug)]
pub struct OpaqueError {
    message: String,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl OpaqueError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn from_error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    /// Describe a caught panic payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let detail = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::msg(format!("panic: {detail}"))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for OpaqueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for OpaqueError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Terminal error of a request, as seen by the canonical logger.
#[derive(Debug, Error)]
pub enum CanonicalError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Opaque(#[from] OpaqueError),
}

impl CanonicalError {
    pub fn opaque(message: impl Into<String>) -> Self {
        CanonicalError::Opaque(OpaqueError::msg(message))
    }

    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            CanonicalError::Domain(e) => Some(e),
            CanonicalError::Opaque(_) => None,
        }
    }
}
