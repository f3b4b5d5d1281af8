//! Route-based redaction.
//!
//! A route key (HTTP path or RPC method) that contains a deny-listed
//! fragment has both its request and response payloads replaced by
//! [`REDACTED`] in the canonical log.

/// Placeholder written instead of a redacted payload.
pub const REDACTED: &str = "REDACTED";

/// Fragments that mark a route as sensitive.
pub const DEFAULT_DENY_PATTERNS: [&str; 7] = [
    "login",
    "refresh-token",
    "verify-otp",
    "password",
    "token",
    "secret",
    "key",
];

/// Case-insensitive substring deny-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionPolicy {
    patterns: Vec<String>,
}

impl RedactionPolicy {
    /// Default deny-list plus `extra` patterns.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut policy = Self::default();
        for pattern in extra {
            let pattern = pattern.as_ref().trim().to_lowercase();
            if !pattern.is_empty() && !policy.patterns.contains(&pattern) {
                policy.patterns.push(pattern);
            }
        }
        policy
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn should_redact(&self, route_key: &str) -> bool {
        let key = route_key.to_lowercase();
        self.patterns.iter().any(|p| key.contains(p.as_str()))
    }
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_DENY_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Check a route key against the default deny-list.
pub fn should_redact(route_key: &str) -> bool {
    let key = route_key.to_lowercase();
    DEFAULT_DENY_PATTERNS.iter().any(|p| key.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deny_list_matches() {
        let cases = [
            ("/api/auth/login", true),
            ("/api/auth/LOGIN", true),
            ("/api/auth/refresh-token", true),
            ("/api/auth/verify-otp", true),
            ("/api/users/password/reset", true),
            ("/api/apikey", true),
            ("/svc.Vault/GetSecret", true),
            ("/health", false),
            ("/api/users", false),
            ("", false),
        ];
        for (key, expected) in cases {
            assert_eq!(should_redact(key), expected, "route key {key}");
            assert_eq!(RedactionPolicy::default().should_redact(key), expected);
        }
    }

    #[test]
    fn test_extra_patterns_extend_defaults() {
        let policy = RedactionPolicy::with_extra(["PIN", " ", "login"]);
        assert!(policy.should_redact("/api/cards/pin"));
        assert!(policy.should_redact("/api/login"));
        assert!(!policy.should_redact("/api/cards"));
        assert_eq!(policy.patterns().len(), DEFAULT_DENY_PATTERNS.len() + 1);
    }
}
