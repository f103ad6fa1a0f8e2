//! Processor configuration
//!
//! A [`ProcessorConfig`] is built in code or read from JSON:
//!
//! ```json
//! {
//!   "strictness": "loose",
//!   "limits": { "max_depth": 200 },
//!   "standard_rules": true
//! }
//! ```
//!
//! An optional `grammar` object replaces the built-in RichText grammar with
//! a declarative one (see [`GrammarConfig`]).

use crate::error::Result;
use crate::limits::Limits;
use crate::validators::{GrammarConfig, Strictness};
use serde::Deserialize;
use std::path::Path;

/// Configuration of a [`RichTextDataProcessor`](crate::RichTextDataProcessor)
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessorConfig {
    /// Strictness of attribute value validation
    strictness: Strictness,
    /// Limits for sanitation and conversion
    limits: Limits,
    /// Whether the standard HTML rules are installed
    standard_rules: bool,
    /// Grammar replacing the built-in one
    grammar: Option<GrammarConfig>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            strictness: Strictness::default(),
            limits: Limits::default(),
            standard_rules: true,
            grammar: None,
        }
    }
}

impl ProcessorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Get the strictness
    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Get the limits
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Check if the standard rules are installed
    pub fn standard_rules(&self) -> bool {
        self.standard_rules
    }

    /// Get the custom grammar
    pub fn grammar(&self) -> Option<&GrammarConfig> {
        self.grammar.as_ref()
    }

    /// Set the strictness
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Install or leave out the standard rules
    pub fn with_standard_rules(mut self, enabled: bool) -> Self {
        self.standard_rules = enabled;
        self
    }

    /// Set a grammar replacing the built-in one
    pub fn with_grammar(mut self, grammar: GrammarConfig) -> Self {
        self.grammar = Some(grammar);
        self
    }
}
