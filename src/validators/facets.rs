//! Attribute content validators
//!
//! Each validator is a pure predicate over an attribute value and the
//! current [`Strictness`]. For every validator the set of accepted values
//! grows monotonically from `Strict` over `Loose` to `Legacy`.

use super::base::Strictness;
use crate::names::is_name_token;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static LENGTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+%?$").unwrap());

/// Content type of an attribute value
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentValidator {
    /// Free character data
    Any,
    /// Human readable text
    Text,
    /// URI reference; no grammar is enforced at this layer
    Uri,
    /// Name token: `[A-Za-z0-9._:-]*`
    #[serde(alias = "nmtoken")]
    NameToken,
    /// Integer number
    Number,
    /// Pixel (`<digits>`) or percentage (`<digits>%`) length
    Length,
    /// One of a fixed set of values
    #[serde(alias = "enum")]
    Enumeration(Vec<String>),
}

impl ContentValidator {
    /// Create an enumeration validator
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ContentValidator::Enumeration(values.into_iter().map(Into::into).collect())
    }

    /// Validate a value under the given strictness
    pub fn is_valid(&self, value: &str, strictness: Strictness) -> bool {
        match self {
            ContentValidator::Any | ContentValidator::Text | ContentValidator::Uri => true,
            ContentValidator::NameToken => match strictness {
                Strictness::Strict | Strictness::Loose => is_name_token(value),
                Strictness::Legacy | Strictness::None => true,
            },
            ContentValidator::Number => strictness != Strictness::Strict || is_number(value),
            ContentValidator::Length => strictness != Strictness::Strict || LENGTH.is_match(value),
            ContentValidator::Enumeration(values) => match strictness {
                Strictness::Strict => value.is_empty() || values.iter().any(|v| v == value),
                // Legacy keeps whatever it finds
                Strictness::Loose | Strictness::Legacy | Strictness::None => true,
            },
        }
    }
}

fn is_number(value: &str) -> bool {
    value.parse::<i64>().is_ok()
}
