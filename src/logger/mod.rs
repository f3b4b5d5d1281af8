//! Logging facade.
//!
//! # Data Flow
//! ```text
//! adapters / business code
//!     → handle.rs (Logger: identity + trace enrichment)
//!     → sink.rs (Sink trait: TracingSink, MemorySink)
//!     → subscriber.rs (console / JSON / rolling file layers)
//!         → json.rs (JSON lines with the record fields nested)
//!
//! global.rs owns the process-wide handle and the installed subscriber.
//! ```
//!
//! # Design Decisions
//! - Adapters receive an `Arc<Logger>` explicitly; the global is a convenience
//! - Every record carries a `dd` group with env, service, version and trace ids
//! - The level filter is reloadable at runtime

pub mod bridge;
pub mod error;
pub mod global;
pub mod handle;
pub mod json;
pub mod level;
pub mod record;
pub mod sink;
pub mod subscriber;

pub use error::LoggerError;
pub use global::{global, init, set_global, teardown};
pub use handle::{Identity, Logger, LoggerBuilder, Pathfinder};
pub use json::JsonLayer;
pub use level::Level;
pub use record::{Fields, LogRecord, TraceContext};
pub use sink::{MemorySink, Sink, TracingSink};
pub use subscriber::LevelHandle;
