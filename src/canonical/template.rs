//! Canonical summary line.
//!
//! The template is compiled once, when the logger handle is built, into a
//! list of literal and placeholder segments. Rendering cannot fail from the
//! caller's point of view: problems turn into fixed fallback messages.

use std::fmt::{self, Write as _};
use std::time::Duration;

use crate::canonical::record::CanonicalLog;

/// `[{transport}][{traffic}] {method} {status} {path} {duration} - {message}`
pub const DEFAULT_TEMPLATE: &str =
    "[{transport}][{traffic}] {method} {status} {path} {duration} - {message}";

/// Message used when no compiled template is available.
pub const MISSING_TEMPLATE_MESSAGE: &str = "failed to get canonical log template";

/// Message used when rendering the template fails.
pub const RENDER_FAILED_MESSAGE: &str = "failed to execute canonical log template";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unknown placeholder '{{{0}}}'")]
    UnknownPlaceholder(String),

    #[error("unclosed placeholder starting at byte {0}")]
    Unclosed(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    Transport,
    Traffic,
    Method,
    Status,
    Path,
    Duration,
    Message,
}

impl Placeholder {
    fn parse(name: &str) -> Result<Self, TemplateError> {
        Ok(match name.trim() {
            "transport" => Placeholder::Transport,
            "traffic" => Placeholder::Traffic,
            "method" => Placeholder::Method,
            "status" => Placeholder::Status,
            "path" => Placeholder::Path,
            "duration" => Placeholder::Duration,
            "message" => Placeholder::Message,
            other => return Err(TemplateError::UnknownPlaceholder(other.to_string())),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Placeholder),
}

/// A compiled summary template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalTemplate {
    segments: Vec<Segment>,
}

impl CanonicalTemplate {
    pub fn compile(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(open) = rest.find('{') {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or(TemplateError::Unclosed(offset + open))?;
            segments.push(Segment::Field(Placeholder::parse(&after[..close])?));

            let consumed = open + 1 + close + 1;
            offset += consumed;
            rest = &rest[consumed..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { segments })
    }

    pub fn render(&self, log: &CanonicalLog) -> Result<String, fmt::Error> {
        let mut out = String::with_capacity(96);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(Placeholder::Transport) => out.push_str(&log.transport),
                Segment::Field(Placeholder::Traffic) => out.push_str(&log.traffic),
                Segment::Field(Placeholder::Method) => out.push_str(&log.method),
                Segment::Field(Placeholder::Status) => write!(out, "{}", log.status)?,
                Segment::Field(Placeholder::Path) => out.push_str(&log.path),
                Segment::Field(Placeholder::Duration) => {
                    write!(out, "{}", HumanDuration(log.duration))?
                }
                Segment::Field(Placeholder::Message) => out.push_str(&log.message),
            }
        }
        Ok(out)
    }
}

impl Default for CanonicalTemplate {
    fn default() -> Self {
        Self::compile(DEFAULT_TEMPLATE).unwrap_or(Self {
            segments: Vec::new(),
        })
    }
}

/// Render `log` with `template`, substituting a fallback message on failure.
pub fn render_summary(template: Option<&CanonicalTemplate>, log: &CanonicalLog) -> String {
    match template {
        None => MISSING_TEMPLATE_MESSAGE.to_string(),
        Some(t) => t
            .render(log)
            .unwrap_or_else(|_| RENDER_FAILED_MESSAGE.to_string()),
    }
}

/// Compact duration display: `150ms`, `1.5s`, `2m3s`, `1h0m0s`, `750µs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MICRO: u128 = 1_000;
        const MILLI: u128 = 1_000_000;
        const SECOND: u128 = 1_000_000_000;

        let nanos = self.0.as_nanos();
        if nanos == 0 {
            return f.write_str("0s");
        }
        if nanos < MICRO {
            return write!(f, "{nanos}ns");
        }
        if nanos < MILLI {
            return write!(f, "{}µs", decimal(nanos, MICRO));
        }
        if nanos < SECOND {
            return write!(f, "{}ms", decimal(nanos, MILLI));
        }

        let total_secs = nanos / SECOND;
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = decimal((total_secs % 60) * SECOND + nanos % SECOND, SECOND);

        if hours > 0 {
            write!(f, "{hours}h{minutes}m{seconds}s")
        } else if minutes > 0 {
            write!(f, "{minutes}m{seconds}s")
        } else {
            write!(f, "{seconds}s")
        }
    }
}

/// `value / unit` with the fraction written out and trailing zeros trimmed.
fn decimal(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let frac = value % unit;
    if frac == 0 {
        return whole.to_string();
    }
    let width = unit.to_string().len() - 1;
    let digits = format!("{frac:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CanonicalLog {
        CanonicalLog::new("HTTP", "incoming")
            .method("GET")
            .status(200)
            .path("/api/users")
            .duration(Duration::from_millis(150))
            .message("Success")
    }

    #[test]
    fn test_render_default_template() {
        let template = CanonicalTemplate::compile(DEFAULT_TEMPLATE).unwrap();
        assert_eq!(
            template.render(&sample()).unwrap(),
            "[HTTP][incoming] GET 200 /api/users 150ms - Success"
        );
    }

    #[test]
    fn test_missing_template_falls_back() {
        assert_eq!(render_summary(None, &sample()), MISSING_TEMPLATE_MESSAGE);
    }

    #[test]
    fn test_custom_template() {
        let template = CanonicalTemplate::compile("{method} {path} -> {status}").unwrap();
        assert_eq!(template.render(&sample()).unwrap(), "GET /api/users -> 200");
    }

    #[test]
    fn test_compile_errors() {
        assert_eq!(
            CanonicalTemplate::compile("{method} {verb}"),
            Err(TemplateError::UnknownPlaceholder("verb".into()))
        );
        assert_eq!(
            CanonicalTemplate::compile("[x] {method"),
            Err(TemplateError::Unclosed(4))
        );
    }

    #[test]
    fn test_duration_formatting() {
        let cases = [
            (Duration::ZERO, "0s"),
            (Duration::from_nanos(42), "42ns"),
            (Duration::from_micros(750), "750µs"),
            (Duration::from_nanos(1_500), "1.5µs"),
            (Duration::from_millis(150), "150ms"),
            (Duration::from_micros(2_250), "2.25ms"),
            (Duration::from_millis(1_500), "1.5s"),
            (Duration::from_secs(123), "2m3s"),
            (Duration::from_secs(120), "2m0s"),
            (Duration::from_secs(3600), "1h0m0s"),
        ];
        for (duration, expected) in cases {
            assert_eq!(HumanDuration(duration).to_string(), expected);
        }
    }
}
