//! Sanitation listeners
//!
//! The sanitizer reports every repair to a [`SanitationListener`]. Node
//! handles stay valid after removal, so a listener may inspect a removed
//! node through the document it receives.

use crate::documents::{Document, NodeId, NodeKind};
use std::fmt;
use tracing::{debug, error, trace, warn};

/// Why an element or character data node was removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementCause {
    /// Unknown element, or element outside the grammar's namespace
    Invalid,
    /// Known node that is not allowed below its parent
    InvalidAtParent,
    /// Element without content whose model forbids emptiness
    MustNotBeEmpty,
}

impl ElementCause {
    /// Severe causes indicate data the conversion rules should have normalized
    pub fn is_severe(&self) -> bool {
        matches!(self, ElementCause::Invalid | ElementCause::InvalidAtParent)
    }

    /// Get the cause as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementCause::Invalid => "invalid",
            ElementCause::InvalidAtParent => "invalidAtParent",
            ElementCause::MustNotBeEmpty => "mustNotBeEmpty",
        }
    }
}

impl fmt::Display for ElementCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an attribute was removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeCause {
    /// The element defines no such attribute
    InvalidAtElement,
    /// The value failed validation
    InvalidValue,
}

impl AttributeCause {
    /// Get the cause as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeCause::InvalidAtElement => "invalidAtElement",
            AttributeCause::InvalidValue => "invalidValue",
        }
    }
}

impl fmt::Display for AttributeCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver of sanitation progress and repairs
///
/// `remove_node` and `remove_invalid_attr` are called right before the
/// repair is applied. All methods default to doing nothing.
#[allow(unused_variables)]
pub trait SanitationListener {
    /// Sanitation of a document begins
    fn started(&mut self) {}

    /// Sanitation of a document ended, successfully or not
    fn stopped(&mut self) {}

    /// An element is about to be processed
    fn entering_element(&mut self, document: &Document, element: NodeId, depth: usize) {}

    /// Processing of an element finished
    fn leaving_element(&mut self, document: &Document, element: NodeId, depth: usize) {}

    /// A node is removed or replaced by its children
    fn remove_node(&mut self, document: &Document, node: NodeId, cause: ElementCause) {}

    /// An attribute is removed
    fn remove_invalid_attr(
        &mut self,
        document: &Document,
        owner: NodeId,
        attribute: NodeId,
        cause: AttributeCause,
    ) {
    }

    /// Sanitation failed; the document must not be stored
    fn fatal(&mut self, message: &str) {}
}

/// Listener ignoring everything
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentListener;

impl SanitationListener for SilentListener {}

/// A recorded repair or failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanitationEvent {
    /// A node was removed or replaced by its children
    RemoveNode {
        /// The removed node
        node: NodeId,
        /// Qualified name, or `#text` for character data
        name: String,
        /// Reason
        cause: ElementCause,
    },
    /// An attribute was removed
    RemoveInvalidAttr {
        /// Owner element
        owner: NodeId,
        /// The removed attribute
        attribute: NodeId,
        /// Qualified attribute name
        name: String,
        /// Attribute value
        value: String,
        /// Reason
        cause: AttributeCause,
    },
    /// Sanitation failed
    Fatal {
        /// Failure description
        message: String,
    },
}

impl SanitationEvent {
    /// Check if the event indicates data that should never reach storage
    pub fn is_severe(&self) -> bool {
        match self {
            SanitationEvent::RemoveNode { cause, .. } => cause.is_severe(),
            SanitationEvent::RemoveInvalidAttr { .. } => false,
            SanitationEvent::Fatal { .. } => true,
        }
    }
}

impl fmt::Display for SanitationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanitationEvent::RemoveNode { name, cause, .. } => {
                write!(f, "removed <{}> ({})", name, cause)
            }
            SanitationEvent::RemoveInvalidAttr {
                name, value, cause, ..
            } => write!(f, "removed attribute {}=\"{}\" ({})", name, value, cause),
            SanitationEvent::Fatal { message } => write!(f, "fatal: {}", message),
        }
    }
}

/// Display name of a node in reports
pub fn describe(document: &Document, node: NodeId) -> String {
    match document.kind(node) {
        Some(NodeKind::Element(e)) => e.name.qualified_name(),
        Some(NodeKind::Attribute(a)) => a.name.qualified_name(),
        Some(NodeKind::Text(_)) | Some(NodeKind::CData(_)) => "#text".to_string(),
        Some(NodeKind::Comment(_)) => "#comment".to_string(),
        Some(NodeKind::Fragment) => "#fragment".to_string(),
        None => node.to_string(),
    }
}

/// Listener recording all repairs
#[derive(Debug, Clone, Default)]
pub struct TrackingListener {
    events: Vec<SanitationEvent>,
    runs: usize,
    elements: usize,
}

impl TrackingListener {
    /// Create an empty tracking listener
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events in order
    pub fn events(&self) -> &[SanitationEvent] {
        &self.events
    }

    /// Take the recorded events, leaving the listener empty
    pub fn take_events(&mut self) -> Vec<SanitationEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of completed sanitation runs
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Number of elements visited
    pub fn elements_visited(&self) -> usize {
        self.elements
    }

    /// Check if nothing was repaired
    pub fn is_clean(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of severe events, fatal failures included
    pub fn severe_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_severe()).count()
    }

    /// Number of fatal failures
    pub fn fatal_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SanitationEvent::Fatal { .. }))
            .count()
    }
}

impl SanitationListener for TrackingListener {
    fn stopped(&mut self) {
        self.runs += 1;
    }

    fn entering_element(&mut self, _document: &Document, _element: NodeId, _depth: usize) {
        self.elements += 1;
    }

    fn remove_node(&mut self, document: &Document, node: NodeId, cause: ElementCause) {
        self.events.push(SanitationEvent::RemoveNode {
            node,
            name: describe(document, node),
            cause,
        });
    }

    fn remove_invalid_attr(
        &mut self,
        document: &Document,
        owner: NodeId,
        attribute: NodeId,
        cause: AttributeCause,
    ) {
        let value = document
            .attribute(attribute)
            .map(|a| a.value.clone())
            .unwrap_or_default();
        self.events.push(SanitationEvent::RemoveInvalidAttr {
            owner,
            attribute,
            name: describe(document, attribute),
            value,
            cause,
        });
    }

    fn fatal(&mut self, message: &str) {
        self.events.push(SanitationEvent::Fatal {
            message: message.to_string(),
        });
    }
}

/// Listener writing repairs to `tracing`
///
/// Benign repairs are logged at debug level, severe ones as warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingListener;

impl SanitationListener for TracingListener {
    fn started(&mut self) {
        debug!("sanitation started");
    }

    fn stopped(&mut self) {
        debug!("sanitation stopped");
    }

    fn entering_element(&mut self, document: &Document, element: NodeId, depth: usize) {
        trace!(element = %describe(document, element), depth, "entering element");
    }

    fn leaving_element(&mut self, document: &Document, element: NodeId, depth: usize) {
        trace!(element = %describe(document, element), depth, "leaving element");
    }

    fn remove_node(&mut self, document: &Document, node: NodeId, cause: ElementCause) {
        let name = describe(document, node);
        let parent = document
            .parent(node)
            .map(|p| describe(document, p))
            .unwrap_or_default();
        if cause.is_severe() {
            warn!(node = %name, parent = %parent, %cause, "removing node");
        } else {
            debug!(node = %name, parent = %parent, %cause, "removing node");
        }
    }

    fn remove_invalid_attr(
        &mut self,
        document: &Document,
        owner: NodeId,
        attribute: NodeId,
        cause: AttributeCause,
    ) {
        let value = document.attribute(attribute).map_or("", |a| a.value.as_str());
        debug!(
            element = %describe(document, owner),
            attribute = %describe(document, attribute),
            value,
            %cause,
            "removing attribute"
        );
    }

    fn fatal(&mut self, message: &str) {
        error!(reason = message, "sanitation failed");
    }
}
