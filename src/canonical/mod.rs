//! Canonical request logging.
//!
//! # Data Flow
//! ```text
//! adapter (HTTP middleware / RPC interceptor)
//!     → CanonicalEvent (bytes, error, CanonicalLog, metadata)
//!     → assembler.rs
//!         → payload.rs (JSON object or raw string)
//!         → redaction.rs (deny-listed routes → REDACTED)
//!         → classify.rs (domain vs opaque error, severity)
//!         → template.rs (one-line summary)
//!     → Logger::emit → sink
//! ```
//!
//! # Design Decisions
//! - Exactly one record per request
//! - Nothing in this pipeline can fail; bad input degrades to fallback values
//! - Redaction replaces whole payloads, field masking lives in the RPC client

pub mod assembler;
pub mod classify;
pub mod error;
pub mod payload;
pub mod record;
pub mod redaction;
pub mod template;

pub use assembler::{assemble, CanonicalEvent, LOGGER_NAME};
pub use classify::{classify, primary_frame, truncate_stack, Classification};
pub use error::{CanonicalError, DomainError, OpaqueError, StackFrame};
pub use payload::{normalize, Payload};
pub use record::{CanonicalLog, Traffic};
pub use redaction::{should_redact, RedactionPolicy, REDACTED};
pub use template::{render_summary, CanonicalTemplate, HumanDuration, TemplateError};
