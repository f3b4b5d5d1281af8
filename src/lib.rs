//! Structured logging facade with canonical request logs.
//!
//! # Architecture Overview
//!
//! ```text
//!   HTTP (axum)    RPC server     RPC client
//!        │              │              │
//!        └──────┬───────┘              │
//!               ▼                      │
//!         canonical (assemble:         │
//!         payload, redaction,          │
//!         classify, template)          │
//!               │                      │
//!               ▼                      ▼
//!         logger (Logger handle: identity + trace enrichment)
//!               │
//!               ▼
//!         tracing subscriber (console | JSON stdout | rolling file)
//! ```
//!
//! Configuration comes from a TOML file or `BLOGGER_*` environment
//! variables, see [`config`].

pub mod canonical;
pub mod config;
pub mod logger;
pub mod middleware;

pub use canonical::{CanonicalError, DomainError, OpaqueError};
pub use config::LogConfig;
pub use logger::{Level, Logger, LoggerError, TraceContext};
