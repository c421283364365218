//! Local checks for call parameters.
//!
//! uCaller validates everything server-side; these helpers let callers catch
//! obvious mistakes before spending a request. `UCaller` applies them only
//! when `ClientConfig::validate_input` is set.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ApiError;

/// Upper bound for the `client` and `unique` parameters of `initCall`.
pub const MAX_IDENTIFIER_LEN: usize = 64;

pub const CODE_LEN: usize = 4;

// Russian numbers: optional +7/7/8 prefix, area code starting with 4, 8 or 9,
// separators allowed between groups.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\+7|7|8)?[\s\-]?\(?([489][0-9]{2})\)?[\s\-]?([0-9]{3})[\s\-]?([0-9]{2})[\s\-]?([0-9]{2})$",
    )
    .expect("phone pattern is valid")
});

/// Normalize a Russian phone number to the `7XXXXXXXXXX` form uCaller expects.
///
/// # Errors
///
/// Returns `ApiError::InvalidParameter` if `phone` is not a recognizable
/// number.
pub fn normalize_phone(phone: &str) -> Result<String, ApiError> {
    let caps = PHONE_RE.captures(phone.trim()).ok_or_else(|| {
        ApiError::invalid_parameter(
            "phone",
            format!("`{phone}` is not in +79999999999, 79999999999, 89999999999 or 9999999999 form"),
        )
    })?;

    let mut normalized = String::with_capacity(11);
    normalized.push('7');
    for group in caps.iter().skip(1).flatten() {
        normalized.push_str(group.as_str());
    }
    Ok(normalized)
}

/// Strip separators from a verification code and check it is 4 digits.
///
/// # Errors
///
/// Returns `ApiError::InvalidParameter` if the cleaned code is not exactly
/// four ASCII digits.
pub fn normalize_code(code: &str) -> Result<String, ApiError> {
    let cleaned: String = code
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect();
    if cleaned.len() != CODE_LEN || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::invalid_parameter(
            "code",
            format!("expected {CODE_LEN} digits, got `{code}`"),
        ));
    }
    Ok(cleaned)
}

/// Reject identifiers longer than `MAX_IDENTIFIER_LEN` characters.
///
/// # Errors
///
/// Returns `ApiError::InvalidParameter` naming the offending field.
pub fn check_identifier(name: &'static str, value: &str) -> Result<(), ApiError> {
    let len = value.chars().count();
    if len > MAX_IDENTIFIER_LEN {
        return Err(ApiError::invalid_parameter(
            name,
            format!("at most {MAX_IDENTIFIER_LEN} characters allowed, got {len}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_common_formats() {
        let cases = [
            ("89091234567", "79091234567"),
            ("79091234567", "79091234567"),
            ("+79091234567", "79091234567"),
            ("8(909)123-45-67", "79091234567"),
            ("7 909 123 45 67", "79091234567"),
            ("9999999999", "79999999999"),
            (" 4951234567 ", "74951234567"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_phone(input).unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn rejects_malformed_phones() {
        for input in ["12345", "890912345", "790912345678", "abc", "", "+19091234567"] {
            let err = normalize_phone(input).unwrap_err();
            assert!(
                matches!(err, ApiError::InvalidParameter { name: "phone", .. }),
                "{input}"
            );
        }
    }

    #[test]
    fn code_separators_are_removed() {
        assert_eq!(normalize_code("1234").unwrap(), "1234");
        assert_eq!(normalize_code("12-34").unwrap(), "1234");
        assert_eq!(normalize_code("12 34").unwrap(), "1234");
    }

    #[test]
    fn code_must_be_four_digits() {
        for input in ["123", "12345", "12a4", ""] {
            assert!(normalize_code(input).is_err(), "{input}");
        }
    }

    #[test]
    fn identifier_length_is_counted_in_chars() {
        let at_limit = "я".repeat(MAX_IDENTIFIER_LEN);
        assert!(check_identifier("client", &at_limit).is_ok());

        let over = "x".repeat(MAX_IDENTIFIER_LEN + 1);
        let err = check_identifier("unique", &over).unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameter { name: "unique", .. }));
    }
}
