//! Error types for richtext
//!
//! This module defines all error types used throughout the library.
//! Recoverable repairs made by the sanitizer are never errors; they are
//! reported through a [`SanitationListener`](crate::validators::SanitationListener).
//! Everything in here is either a programming error (an invalid grammar,
//! an illegal tree mutation) or a fatal condition that makes a document
//! unfit for storage.

use std::fmt;
use thiserror::Error;

/// Result type alias using richtext Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for richtext operations
#[derive(Error, Debug)]
pub enum Error {
    /// Grammar construction error
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Fatal sanitation failure; the document must not be persisted
    #[error("sanitation failed: {0}")]
    Sanitation(String),

    /// Illegal tree mutation (cycles, detached parents, removing the root, ...)
    #[error("tree error: {0}")]
    Tree(String),

    /// Value error (invalid value for a setting)
    #[error("value error: {0}")]
    Value(String),

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// Configuration could not be read
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),
}

/// Grammar construction error with context
#[derive(Debug, Clone)]
pub struct SchemaError {
    /// Error message
    pub message: String,
    /// Element definition that caused the error
    pub element: Option<String>,
    /// Attribute definition that caused the error
    pub attribute: Option<String>,
}

impl SchemaError {
    /// Create a new schema error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            element: None,
            attribute: None,
        }
    }

    /// Set the element definition
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// Set the attribute definition
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref element) = self.element {
            write!(f, " (element '{}'", element)?;
            if let Some(ref attribute) = self.attribute {
                write!(f, ", attribute '{}'", attribute)?;
            }
            write!(f, ")")?;
        } else if let Some(ref attribute) = self.attribute {
            write!(f, " (attribute '{}')", attribute)?;
        }

        Ok(())
    }
}

impl std::error::Error for SchemaError {}
