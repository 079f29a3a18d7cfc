//! Field format checks.
//!
//! These are shared by the JSON routes, the server-rendered forms and the request wizard, so a
//! value accepted in one place is accepted everywhere.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email pattern"));

/// Chamber of Commerce (KvK) numbers are exactly eight ASCII digits.
static REGISTRATION_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{8}$").expect("Invalid registration number pattern"));

/// Dutch numbers in national (`06...`) or international (`+316...`, `00316...`) notation.
static DUTCH_PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\+31|0031|0)[1-9][0-9]{8}$").expect("Invalid phone pattern"));

static DUTCH_POSTAL_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[1-9][0-9]{3}\s?[A-Za-z]{2}$").expect("Invalid postal code pattern"));

/// True when the value is empty or only whitespace.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Strip all whitespace from a registration number, so `"1234 5678"` becomes `"12345678"`.
pub fn normalize_registration_number(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn is_valid_registration_number(value: &str) -> bool {
    REGISTRATION_NUMBER.is_match(&normalize_registration_number(value))
}

/// Phone numbers are checked after removing whitespace, dashes and parentheses.
pub fn is_valid_dutch_phone(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();
    DUTCH_PHONE.is_match(&compact)
}

pub fn is_valid_postal_code(value: &str) -> bool {
    DUTCH_POSTAL_CODE.is_match(value.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("jan@example.nl"));
        assert!(is_valid_email("a.b+c@sub.domain.com"));

        assert!(!is_valid_email("jan@example"));
        assert!(!is_valid_email("jan example@test.nl"));
        assert!(!is_valid_email("@example.nl"));
        assert!(!is_valid_email("jan@@example.nl"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_registration_number_strips_whitespace() {
        assert!(is_valid_registration_number("12345678"));
        assert!(is_valid_registration_number("1234 5678"));
        assert!(is_valid_registration_number(" 12 34 56 78 "));
        assert_eq!(normalize_registration_number("1234 5678"), "12345678");
    }

    #[test]
    fn test_registration_number_requires_eight_digits() {
        assert!(!is_valid_registration_number("1234567"));
        assert!(!is_valid_registration_number("123456789"));
        assert!(!is_valid_registration_number("1234567a"));
        assert!(!is_valid_registration_number(""));
    }

    #[test]
    fn test_postal_code() {
        assert!(is_valid_postal_code("1234AB"));
        assert!(is_valid_postal_code("1234 ab"));
        assert!(is_valid_postal_code(" 9999 zz "));

        assert!(!is_valid_postal_code("0123AB"));
        assert!(!is_valid_postal_code("12345"));
        assert!(!is_valid_postal_code("1234  AB"));
        assert!(!is_valid_postal_code("1234A"));
    }

    #[test]
    fn test_dutch_phone() {
        assert!(is_valid_dutch_phone("0612345678"));
        assert!(is_valid_dutch_phone("+31612345678"));
        assert!(is_valid_dutch_phone("0031612345678"));
        assert!(is_valid_dutch_phone("06-12345678"));
        assert!(is_valid_dutch_phone("+31 (6) 1234 5678"));
        assert!(is_valid_dutch_phone("020-1234567"));

        assert!(!is_valid_dutch_phone("12345"));
        assert!(!is_valid_dutch_phone("0012345678"));
        assert!(!is_valid_dutch_phone("061234567"));
        assert!(!is_valid_dutch_phone("+32612345678"));
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("   \n\t"));
        assert!(!is_blank(" x "));
    }
}
