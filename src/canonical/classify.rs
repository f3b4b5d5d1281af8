//! Error classification.
//!
//! Turns the terminal error of a request into the `error` and `response`
//! fields of the canonical record, and decides the severity.

use serde_json::{json, Value};

use crate::canonical::error::{CanonicalError, DomainError, StackFrame};
use crate::canonical::payload::normalize;
use crate::logger::Level;

/// Separator between segments of a raw stack.
pub const STACK_DELIMITER: &str = "\n\t";

/// Segments of the primary frame kept in the log.
pub const MAX_STACK_SEGMENTS: usize = 6;

/// Outcome of classifying one request's error.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// The error was a [`DomainError`].
    pub domain: bool,
    /// Severity the record is emitted at.
    pub level: Level,
    /// `error` group built from the primary stack frame.
    pub error_group: Option<Value>,
    /// `response` field.
    pub response: Value,
    /// Replacement for the canonical message.
    pub message_override: Option<String>,
}

/// First frame, or a placeholder when there is none.
pub fn primary_frame(frames: &[StackFrame]) -> StackFrame {
    frames.first().cloned().unwrap_or_else(|| StackFrame {
        kind: "unknown".to_string(),
        message: "no stack information available".to_string(),
        stack: String::new(),
    })
}

/// Keep at most [`MAX_STACK_SEGMENTS`] segments of `stack`.
pub fn truncate_stack(stack: &str) -> String {
    stack
        .split(STACK_DELIMITER)
        .take(MAX_STACK_SEGMENTS)
        .collect::<Vec<_>>()
        .join(STACK_DELIMITER)
}

/// Classify `err`, using `response` as the fallback response payload.
pub fn classify(err: Option<&CanonicalError>, response: &[u8]) -> Classification {
    match err {
        None => Classification {
            domain: false,
            level: Level::Info,
            error_group: None,
            response: normalize(response).into(),
            message_override: None,
        },
        Some(CanonicalError::Domain(domain)) => classify_domain(domain),
        Some(CanonicalError::Opaque(_)) => Classification {
            domain: false,
            level: Level::Error,
            error_group: None,
            response: normalize(response).into(),
            message_override: None,
        },
    }
}

fn classify_domain(err: &DomainError) -> Classification {
    let error_group = if err.stack.is_empty() {
        None
    } else {
        let frame = primary_frame(&err.stack);
        Some(json!({
            "kind": frame.kind,
            "message": frame.message,
            "stack": truncate_stack(&frame.stack),
        }))
    };

    let response = json!({
        "status_code": err.api_status_code,
        "data": Value::Null,
        "error": {
            "code": err.code,
            "message": err.global_message,
            "debug_message": err.debug_message,
            "details": err.details,
        },
    });

    Classification {
        domain: true,
        level: Level::Error,
        error_group,
        response,
        message_override: Some(err.debug_message.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::error::OpaqueError;

    fn ten_segment_stack() -> String {
        (1..=10)
            .map(|i| format!("frame{i}"))
            .collect::<Vec<_>>()
            .join(STACK_DELIMITER)
    }

    #[test]
    fn test_primary_frame_default() {
        let frame = primary_frame(&[]);
        assert_eq!(frame.kind, "unknown");
        assert_eq!(frame.message, "no stack information available");
        assert_eq!(frame.stack, "");
    }

    #[test]
    fn test_primary_frame_takes_first() {
        let frames = vec![
            StackFrame::new("db", "first", "a"),
            StackFrame::new("http", "second", "b"),
        ];
        assert_eq!(primary_frame(&frames).message, "first");
    }

    #[test]
    fn test_truncate_keeps_six_segments() {
        let truncated = truncate_stack(&ten_segment_stack());
        let parts: Vec<_> = truncated.split(STACK_DELIMITER).collect();
        assert_eq!(parts, vec!["frame1", "frame2", "frame3", "frame4", "frame5", "frame6"]);
    }

    #[test]
    fn test_truncate_short_stack_untouched() {
        assert_eq!(truncate_stack("a\n\tb"), "a\n\tb");
        assert_eq!(truncate_stack(""), "");
    }

    #[test]
    fn test_no_error_is_info_with_payload() {
        let c = classify(None, br#"{"ok":true}"#);
        assert_eq!(c.level, Level::Info);
        assert!(!c.domain);
        assert_eq!(c.response, json!({"ok": true}));
        assert!(c.error_group.is_none());
        assert!(c.message_override.is_none());
    }

    #[test]
    fn test_domain_error_with_stack() {
        let err = CanonicalError::from(
            DomainError::new(4041, "User not found", "no row for id 999")
                .with_status(404)
                .with_detail("user_id", 999)
                .with_frame(StackFrame::new("repository", "select failed", ten_segment_stack())),
        );
        let c = classify(Some(&err), b"ignored");

        assert!(c.domain);
        assert_eq!(c.level, Level::Error);
        assert_eq!(c.message_override.as_deref(), Some("no row for id 999"));

        let group = c.error_group.unwrap();
        assert_eq!(group["kind"], "repository");
        assert_eq!(group["stack"].as_str().unwrap().split(STACK_DELIMITER).count(), 6);

        assert_eq!(c.response["status_code"], 404);
        assert_eq!(c.response["data"], Value::Null);
        assert_eq!(c.response["error"]["code"], 4041);
        assert_eq!(c.response["error"]["message"], "User not found");
        assert_eq!(c.response["error"]["debug_message"], "no row for id 999");
        assert_eq!(c.response["error"]["details"]["user_id"], 999);
    }

    #[test]
    fn test_domain_error_without_stack_skips_group() {
        let err = CanonicalError::from(DomainError::internal(1, "boom"));
        let c = classify(Some(&err), b"");
        assert!(c.domain);
        assert!(c.error_group.is_none());
        assert_eq!(c.response["status_code"], 500);
    }

    #[test]
    fn test_domain_error_level_hint_ignored() {
        let err = CanonicalError::from(DomainError::not_found(1, "gone").with_level(Level::Debug));
        assert_eq!(classify(Some(&err), b"").level, Level::Error);
    }

    #[test]
    fn test_opaque_error_uses_response_payload() {
        let err = CanonicalError::from(OpaqueError::msg("io failure"));
        let c = classify(Some(&err), b"upstream said no");
        assert!(!c.domain);
        assert_eq!(c.level, Level::Error);
        assert_eq!(c.response, json!("upstream said no"));
        assert!(c.error_group.is_none());
        assert!(c.message_override.is_none());
    }
}
