//! Logger lifecycle errors.

use crate::canonical::template::TemplateError;
use crate::config::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("Logger not initialized. Call logger::init() first.")]
    Uninitialized,

    #[error("invalid logger configuration: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    InvalidConfig(Vec<ValidationError>),

    #[error("invalid canonical template: {0}")]
    Template(#[from] TemplateError),

    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),

    #[error("failed to initialize rolling file appender: {0}")]
    FileAppender(#[from] tracing_appender::rolling::InitError),

    #[error("failed to change log level: {0}")]
    Reload(String),
}
