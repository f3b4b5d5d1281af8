//! Masking of sensitive message fields.
//!
//! Message types declare which of their serialized keys hold sensitive
//! strings by implementing [`SensitiveFields`]. After a message is normalized
//! to a JSON object, [`mask_sensitive`] rewrites those keys in place.

use serde_json::{Map, Value};

/// Inserted between the kept characters of a masked value.
pub const MASK: &str = "*****";

/// Declares the serialized keys of `Self` that must be masked before logging.
///
/// ```rust
/// use blogger::middleware::mask::SensitiveFields;
///
/// #[derive(serde::Serialize)]
/// struct LoginRequest {
///     username: String,
///     #[serde(rename = "pwd")]
///     password: String,
/// }
///
/// impl SensitiveFields for LoginRequest {
///     fn sensitive_fields() -> &'static [&'static str] {
///         &["pwd"]
///     }
/// }
/// ```
pub trait SensitiveFields {
    fn sensitive_fields() -> &'static [&'static str] {
        &[]
    }
}

impl SensitiveFields for () {}
impl SensitiveFields for Value {}

/// Mask one string: `secret123` → `s*****3`, `x` → `x*****`, `""` → `None`.
pub fn mask_value(value: &str) -> Option<String> {
    let mut chars = value.chars();
    let first = chars.next()?;
    Some(match chars.next_back() {
        Some(last) => format!("{first}{MASK}{last}"),
        None => format!("{first}{MASK}"),
    })
}

/// Mask the string values of `keys` in `data`. Other values are left alone.
pub fn mask_sensitive(data: &mut Map<String, Value>, keys: &[&str]) {
    for key in keys {
        if let Some(Value::String(s)) = data.get_mut(*key) {
            if let Some(masked) = mask_value(s) {
                *s = masked;
            }
        }
    }
}
