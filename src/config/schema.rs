//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files. Every
//! field has a default so a minimal file (or none at all) is valid.

use serde::{Deserialize, Serialize};

/// Environments that log for humans: debug level, console output.
pub const DEVELOPMENT_ENVS: [&str; 2] = ["local", "development"];

pub(crate) fn is_development(env: &str) -> bool {
    DEVELOPMENT_ENVS.contains(&env)
}

/// Root configuration for the logger.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Deployment environment (local, development, staging, production, ...).
    pub env: String,

    /// Service name reported in every record.
    pub service_name: String,

    /// Minimum level written by the sinks (debug, info, warn, error).
    pub level: String,

    /// Write JSON lines to stdout instead of the console format.
    pub use_json: bool,

    /// Also write JSON lines to a rolling file.
    pub file_enabled: bool,

    /// Log file path; the parent directory holds the rotated files.
    pub file_path: String,

    /// Rotation period for the log file (minutely, hourly, daily, never).
    pub rotation: String,

    /// Number of rotated files to keep.
    pub max_backups: usize,

    /// Route redaction settings.
    pub redaction: RedactionConfig,

    /// Canonical log line settings.
    pub canonical: CanonicalConfig,

    /// HTTP middleware settings.
    pub http: HttpConfig,
}

impl LogConfig {
    /// Defaults for the given environment.
    pub fn for_env(env: &str) -> Self {
        let development = is_development(env);
        Self {
            env: env.to_string(),
            service_name: "blogger-service".to_string(),
            level: if development { "debug" } else { "info" }.to_string(),
            use_json: !development,
            file_enabled: false,
            file_path: "logs/app.log".to_string(),
            rotation: "daily".to_string(),
            max_backups: 3,
            redaction: RedactionConfig::default(),
            canonical: CanonicalConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::for_env("local")
    }
}

/// Route redaction settings.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RedactionConfig {
    /// Patterns added to the built-in deny-list.
    pub extra_patterns: Vec<String>,
}

/// Canonical log line settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CanonicalConfig {
    /// Summary template. Placeholders: transport, traffic, method, status,
    /// path, duration, message.
    pub template: String,
}

impl Default for CanonicalConfig {
    fn default() -> Self {
        Self {
            template: crate::canonical::template::DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// HTTP middleware settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Largest request or response body buffered for logging.
    pub max_body_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 4 * 1024 * 1024,
        }
    }
}
