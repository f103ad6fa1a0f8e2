//! # richtext
//!
//! Schema-driven sanitation and rule-based conversion between HTML editing
//! data and CoreMedia RichText 1.0.
//!
//! RichText is a constrained XML dialect resembling a DTD-validated subset of
//! XHTML. Editors work on an HTML-like representation ("view"), storage
//! requires valid RichText ("data"). This crate provides:
//!
//! - A schema registry describing the RichText grammar (content models and
//!   attribute definitions)
//! - A sanitizer repairing arbitrary trees until they satisfy the grammar,
//!   reporting every repair to a listener
//! - A rule-based tree converter importing nodes between documents while
//!   reconciling default namespaces
//! - A standard rule set mapping HTML to RichText and back
//!
//! ## Example
//!
//! ```rust,ignore
//! use richtext::{ProcessorConfig, RichTextDataProcessor};
//!
//! let processor = RichTextDataProcessor::new(ProcessorConfig::default())?;
//!
//! // Editing markup to storage
//! let data = processor.to_data_string("<p><b>Lorem</b></p>")?;
//!
//! // Storage back to editing markup
//! let view = processor.to_view_string(&data)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod error;
pub mod limits;
pub mod config;

// Utilities
pub mod namespaces;
pub mod names;

// Trees
pub mod documents;

// Grammar and sanitation
pub mod validators;

// Rule-based conversion
pub mod converters;

// Storage dialect contract and processing pipeline
pub mod richtext;
pub mod processor;

// Re-exports for convenience
pub use config::ProcessorConfig;
pub use documents::{Document, NodeId};
pub use error::{Error, Result};
pub use processor::RichTextDataProcessor;
pub use validators::{SchemaRegistry, Sanitizer, Strictness};

/// Version of the richtext library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CoreMedia RichText 1.0 namespace
pub const RICHTEXT_NAMESPACE: &str = "http://www.coremedia.com/2003/richtext-1.0";

/// XLink namespace, used by RichText for hyperlink attributes
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// XHTML namespace, the default namespace of editing data
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XMLNS namespace
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";
