//! RichText grammar and sanitation
//!
//! This module contains the grammar description and the sanitizer that
//! enforces it:
//! - [`Strictness`] levels and attribute [`ContentValidator`]s
//! - attribute and element definitions, collected in a [`SchemaRegistry`]
//! - the [`Sanitizer`] and the [`SanitationListener`] it reports to

// Value validation
pub mod base;
pub mod facets;

// Grammar
pub mod attributes;
pub mod models;
pub mod schemas;

// Repair
pub mod listener;
pub mod sanitizer;

// Re-exports
pub use attributes::{AttributeDefinition, AttributeSpec, InvalidValuePolicy};
pub use base::{InvalidValueAction, Strictness};
pub use facets::ContentValidator;
pub use listener::{
    AttributeCause, ElementCause, SanitationEvent, SanitationListener, SilentListener,
    TracingListener, TrackingListener,
};
pub use models::{ContentModel, ElementDefinition, ElementName};
pub use sanitizer::Sanitizer;
pub use schemas::{ElementConfig, GrammarConfig, SchemaRegistry};
