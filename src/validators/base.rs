//! Strictness levels and invalid-value handling
//!
//! Strictness only affects how attribute *values* are judged. Presence rules
//! (unknown elements and attributes, misplaced children, forbidden emptiness,
//! required attributes) are enforced identically at every level except
//! [`Strictness::None`], which disables sanitation altogether.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Leniency of attribute value validation
///
/// Levels are ordered from most to least strict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Syntactic and semantic validity (a number must parse as a number)
    #[default]
    Strict,
    /// Name tokens are still checked; numbers, lengths and enumerations are not
    Loose,
    /// Value validation disabled, structure still repaired
    Legacy,
    /// Sanitation disabled; input is passed through untouched
    None,
}

impl Strictness {
    /// All levels, most strict first
    pub const ALL: [Strictness; 4] = [
        Strictness::Strict,
        Strictness::Loose,
        Strictness::Legacy,
        Strictness::None,
    ];

    /// Get the level as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Strictness::Strict => "strict",
            Strictness::Loose => "loose",
            Strictness::Legacy => "legacy",
            Strictness::None => "none",
        }
    }

    /// Whether the sanitizer runs at all
    pub fn is_enabled(&self) -> bool {
        *self != Strictness::None
    }
}

impl FromStr for Strictness {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Strictness::Strict),
            "loose" => Ok(Strictness::Loose),
            "legacy" => Ok(Strictness::Legacy),
            "none" => Ok(Strictness::None),
            _ => Err(Error::Value(format!(
                "Invalid strictness: '{}'. Must be 'strict', 'loose', 'legacy', or 'none'",
                s
            ))),
        }
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What to do with an attribute whose value failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidValueAction {
    /// Leave the attribute as it is
    Keep,
    /// Remove the attribute
    Remove,
    /// Overwrite the value
    Replace(String),
}
