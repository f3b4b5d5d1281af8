//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or BLOGGER_* env vars
//!     → loader.rs (parse, env overrides)
//!     → validation.rs (semantic checks)
//!     → LogConfig (validated, immutable)
//!     → logger::init builds the handle from it
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → new LogConfig sent to the application
//!     → application re-runs logger::init / adjusts the level
//! ```
//!
//! # Design Decisions
//! - Every field has a default; a missing file section is not an error
//! - Defaults depend on the environment (debug console locally, info JSON elsewhere)
//! - Validation reports all problems, not just the first

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_from_env, load_from_file, ConfigError};
pub use schema::{CanonicalConfig, HttpConfig, LogConfig, RedactionConfig};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
