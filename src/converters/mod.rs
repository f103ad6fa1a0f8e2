//! Rule-based tree conversion
//!
//! Converts trees between the editing representation and RichText:
//! - [`ConversionRule`]s bundle per-direction [`RuleSection`]s of stage functions
//! - a [`RuleEngine`] orders the sections of one direction by priority
//! - the [`TreeConverter`] imports nodes into a target document, reconciling
//!   default namespaces, and dispatches every node to the engine
//! - [`standard::rules`] maps HTML editing markup to RichText and back

mod base;
mod context;
mod converter;
mod engine;
pub mod standard;

pub use base::{
    priority, AppendedFn, ConversionRule, Direction, ImportedFn, Outcome, PrepareFn, RuleSection,
};
pub use context::ConversionContext;
pub use converter::TreeConverter;
pub use engine::RuleEngine;
