//! The canonical record of one request.

use std::fmt;
use std::time::Duration;

/// Direction of a call, used only as a log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Traffic {
    Inbound,
    Internal,
    External,
}

impl Traffic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Traffic::Inbound => "inbound",
            Traffic::Internal => "internal",
            Traffic::External => "external",
        }
    }
}

impl fmt::Display for Traffic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Traffic> for String {
    fn from(traffic: Traffic) -> Self {
        traffic.as_str().to_string()
    }
}

/// Summary of one request/call.
///
/// `message` starts out as whatever the adapter sets (usually empty) and is
/// replaced by the debug message of a domain error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalLog {
    pub transport: String,
    pub traffic: String,
    pub method: String,
    pub status: i32,
    pub path: String,
    pub duration: Duration,
    pub message: String,
}

impl CanonicalLog {
    pub fn new(transport: impl Into<String>, traffic: impl Into<String>) -> Self {
        Self {
            transport: transport.into(),
            traffic: traffic.into(),
            ..Default::default()
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn status(mut self, status: i32) -> Self {
        self.status = status;
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}
