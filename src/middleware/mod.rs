//! Transport adapters.
//!
//! # Data Flow
//! ```text
//! HTTP request  → http.rs (axum middleware)      ─┐
//! RPC call      → rpc_server.rs (interceptor)    ─┼→ Logger::canonical
//! outbound RPC  → rpc_client.rs (invoker wrapper) → Logger::emit (two records)
//! ```
//!
//! Adapters hold an `Arc<Logger>`; `from_global` builds one from the global
//! handle and refuses to start without it.

pub mod http;
pub mod mask;
pub mod rpc;
pub mod rpc_client;
pub mod rpc_server;

pub use http::{canonical_logging, HttpLogging, BODY_NOT_CAPTURED};
pub use mask::{mask_sensitive, mask_value, SensitiveFields, MASK};
pub use rpc::{trace_from_metadata, Metadata, RpcCode, HEALTH_CHECK_METHOD};
pub use rpc_client::{RpcClientLogging, RpcReply};
pub use rpc_server::RpcServerLogging;
