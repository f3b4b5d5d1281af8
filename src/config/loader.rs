//! Configuration loading from disk and from the environment.

use std::env;
use std::fs;
use std::path::Path;

use crate::config::schema::{is_development, LogConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a TOML file, apply `BLOGGER_*` overrides, then validate.
pub fn load_from_file(path: &Path) -> Result<LogConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: LogConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build a configuration purely from `BLOGGER_*` variables.
///
/// Starts from the defaults of `BLOGGER_ENV` (default `local`). Development
/// environments always log at debug level to the console.
pub fn load_from_env() -> LogConfig {
    let env_name = env_or("BLOGGER_ENV", "local");
    let defaults = LogConfig::for_env(&env_name);

    let mut config = LogConfig {
        env: env_name,
        service_name: env_or("BLOGGER_SERVICE_NAME", &defaults.service_name),
        level: env_or("BLOGGER_LOG_LEVEL", &defaults.level),
        use_json: env_bool_or("BLOGGER_USE_JSON", defaults.use_json),
        file_enabled: env_bool_or("BLOGGER_FILE_ENABLED", defaults.file_enabled),
        file_path: env_or("BLOGGER_FILE_PATH", &defaults.file_path),
        rotation: env_or("BLOGGER_ROTATION", &defaults.rotation),
        max_backups: env_usize_or("BLOGGER_MAX_BACKUPS", defaults.max_backups),
        ..defaults
    };

    if is_development(&config.env) {
        config.use_json = false;
        config.level = "debug".to_string();
    }

    config
}

/// Overwrite file values with any `BLOGGER_*` variable that is set.
pub fn apply_env_overrides(config: &mut LogConfig) {
    if let Some(v) = env_var("BLOGGER_ENV") {
        config.env = v;
    }
    if let Some(v) = env_var("BLOGGER_SERVICE_NAME") {
        config.service_name = v;
    }
    if let Some(v) = env_var("BLOGGER_LOG_LEVEL") {
        config.level = v;
    }
    if let Some(v) = env_var("BLOGGER_USE_JSON") {
        config.use_json = parse_bool(&v);
    }
    if let Some(v) = env_var("BLOGGER_FILE_ENABLED") {
        config.file_enabled = parse_bool(&v);
    }
    if let Some(v) = env_var("BLOGGER_FILE_PATH") {
        config.file_path = v;
    }
    if let Some(v) = env_var("BLOGGER_ROTATION") {
        config.rotation = v;
    }
    config.max_backups = env_usize_or("BLOGGER_MAX_BACKUPS", config.max_backups);
}

/// Non-empty value of an environment variable.
pub(crate) fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

pub(crate) fn env_or(key: &str, default: &str) -> String {
    env_var(key).unwrap_or_else(|| default.to_string())
}

fn env_bool_or(key: &str, default: bool) -> bool {
    env_var(key).map(|v| parse_bool(&v)).unwrap_or(default)
}

/// Positive integers only; anything else keeps the default.
fn env_usize_or(key: &str, default: usize) -> usize {
    env_var(key)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

fn parse_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_is_strict() {
        assert!(parse_bool("true"));
        assert!(parse_bool("TRUE"));
        assert!(!parse_bool("yes"));
        assert!(!parse_bool("1"));
    }

    #[test]
    fn test_validation_error_message_lists_fields() {
        let err = ConfigError::Validation(vec![
            ValidationError {
                field: "level",
                reason: "bad".into(),
            },
            ValidationError {
                field: "rotation",
                reason: "worse".into(),
            },
        ]);
        assert_eq!(err.to_string(), "validation failed: level: bad, rotation: worse");
    }
}
