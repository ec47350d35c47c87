//! Field canonicalization applied before duplicate comparison.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Normalizes a person or company name: lowercase, trim, single spaces.
pub fn normalize_name(value: &str) -> String {
    WHITESPACE_RE
        .replace_all(value.trim(), " ")
        .to_lowercase()
}

/// Normalizes an email address: lowercase, trim.
///
/// Internal whitespace is kept as-is.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Normalizes a phone number to its digits only.
pub fn normalize_phone(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_email, normalize_name, normalize_phone};

    #[test]
    fn name_collapses_whitespace_runs() {
        assert_eq!(normalize_name("  Jane \t  DOE\n"), "jane doe");
        assert_eq!(normalize_name("Acme   Corp"), "acme corp");
    }

    #[test]
    fn email_only_trims_and_lowercases() {
        assert_eq!(normalize_email("  JANE@Acme.com "), "jane@acme.com");
        assert_eq!(normalize_email("a  b@x.io"), "a  b@x.io");
    }

    #[test]
    fn phone_keeps_digits_only() {
        assert_eq!(normalize_phone("+1 (555) 010-0199"), "15550100199");
        assert_eq!(normalize_phone("ext. --"), "");
    }
}
