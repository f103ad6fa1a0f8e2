//! XML name checks and utilities
//!
//! Character-class checks shared by the parser and by the attribute
//! content validators.

use once_cell::sync::Lazy;
use regex::Regex;

static NCNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}][A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\-\.0-9]*$")
        .unwrap()
});

/// Check if a character may appear in a name token of the storage grammar
pub fn is_name_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ':' | '-')
}

/// Check if a string consists of name token characters only
///
/// The empty string passes: it contains no illegal character.
pub fn is_name_token(value: &str) -> bool {
    value.chars().all(is_name_token_char)
}

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_valid_ncname(name: &str) -> bool {
    NCNAME.is_match(name)
}

/// Check if a string is a valid QName (qualified name)
pub fn is_valid_qname(name: &str) -> bool {
    if let Some((prefix, local)) = name.split_once(':') {
        is_valid_ncname(prefix) && is_valid_ncname(local)
    } else {
        is_valid_ncname(name)
    }
}

/// Split a QName into prefix and local name
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = qname.split_once(':') {
        (Some(prefix), local)
    } else {
        (None, qname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_name_token() {
        assert!(is_name_token("en-US"));
        assert!(is_name_token("a.b_c:d"));
        assert!(is_name_token(""));

        assert!(!is_name_token("in valid"));
        assert!(!is_name_token("é"));
        assert!(!is_name_token("a/b"));
    }

    #[test]
    fn test_is_valid_ncname() {
        assert!(is_valid_ncname("element"));
        assert!(is_valid_ncname("my-element"));

        assert!(!is_valid_ncname(""));
        assert!(!is_valid_ncname("prefix:element"));
        assert!(!is_valid_ncname("1st"));
    }

    #[test]
    fn test_is_valid_qname() {
        assert!(is_valid_qname("element"));
        assert!(is_valid_qname("xlink:href"));

        assert!(!is_valid_qname(""));
        assert!(!is_valid_qname(":element"));
        assert!(!is_valid_qname("element:"));
    }

    #[test]
    fn test_split_qname() {
        assert_eq!(split_qname("href"), (None, "href"));
        assert_eq!(split_qname("xlink:href"), (Some("xlink"), "href"));
    }
}
