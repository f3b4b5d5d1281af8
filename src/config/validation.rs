//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All problems are
//! collected so a bad file is reported in one pass.

use std::fmt;

use crate::canonical::template::CanonicalTemplate;
use crate::config::schema::LogConfig;
use crate::logger::Level;

/// Rotation periods understood by the file sink.
pub const ROTATIONS: [&str; 4] = ["minutely", "hourly", "daily", "never"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Check a configuration, returning every problem found.
pub fn validate_config(config: &LogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.service_name.trim().is_empty() {
        errors.push(ValidationError::new("service_name", "must not be empty"));
    }

    if let Err(e) = config.level.parse::<Level>() {
        errors.push(ValidationError::new("level", e.to_string()));
    }

    if !ROTATIONS.contains(&config.rotation.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "rotation",
            format!("expected one of {}, got '{}'", ROTATIONS.join(", "), config.rotation),
        ));
    }

    if config.file_enabled && config.file_path.trim().is_empty() {
        errors.push(ValidationError::new(
            "file_path",
            "must be set when file_enabled is true",
        ));
    }

    if config.file_enabled && config.max_backups == 0 {
        errors.push(ValidationError::new("max_backups", "must be at least 1"));
    }

    if let Err(e) = CanonicalTemplate::compile(&config.canonical.template) {
        errors.push(ValidationError::new("canonical.template", e.to_string()));
    }

    if config.redaction.extra_patterns.iter().any(|p| p.trim().is_empty()) {
        errors.push(ValidationError::new(
            "redaction.extra_patterns",
            "patterns must not be empty",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&LogConfig::default()).is_ok());
        assert!(validate_config(&LogConfig::for_env("production")).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = LogConfig::default();
        config.level = "loud".into();
        config.rotation = "weekly".into();
        config.file_enabled = true;
        config.file_path = "".into();
        config.canonical.template = "{transport} {nope}".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["level", "rotation", "file_path", "canonical.template"]
        );
    }
}
