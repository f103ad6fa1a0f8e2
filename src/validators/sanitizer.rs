//! Element sanitizer
//!
//! Repairs a document in place until it satisfies a [`SchemaRegistry`].
//! The traversal is depth first, children before their parent, so every
//! element sees the repaired state of its subtree:
//!
//! 1. child elements are sanitized
//! 2. invalid children are removed, or replaced by their own children,
//!    until a pass over the children changes nothing
//! 3. an element without content whose model forbids emptiness is removed
//! 4. attributes are checked against the element's attribute table and
//!    missing required attributes are added with their defaults
//!
//! A repair that fails is fatal for the element it happens at. It is
//! reported once, siblings and ancestors are still processed, and the whole
//! call returns [`Error::Sanitation`]. The walk keeps pending elements on an
//! explicit stack; only [`Limits::max_depth`] bounds the nesting it accepts.

use super::base::{InvalidValueAction, Strictness};
use super::listener::{AttributeCause, ElementCause, SanitationListener};
use super::models::{ContentModel, ElementDefinition, ElementName};
use super::schemas::SchemaRegistry;
use crate::documents::{Document, NodeId, NodeKind};
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::QName;
use tracing::debug;

/// Schema-driven tree repair
#[derive(Debug, Clone)]
pub struct Sanitizer<'s> {
    schema: &'s SchemaRegistry,
    strictness: Strictness,
    limits: Limits,
}

impl<'s> Sanitizer<'s> {
    /// Create a sanitizer with strict value validation and default limits
    pub fn new(schema: &'s SchemaRegistry) -> Self {
        Self {
            schema,
            strictness: Strictness::default(),
            limits: Limits::default(),
        }
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

    /// The grammar
    pub fn schema(&self) -> &'s SchemaRegistry {
        self.schema
    }

    /// The strictness
    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Sanitize a document in place
    ///
    /// Under [`Strictness::None`] the document is left untouched and the
    /// listener is not called at all.
    pub fn sanitize(
        &self,
        document: &mut Document,
        listener: &mut dyn SanitationListener,
    ) -> Result<()> {
        if !self.strictness.is_enabled() {
            return Ok(());
        }
        debug!(strictness = %self.strictness, "sanitizing document");
        listener.started();
        let result = self.sanitize_root(document, listener);
        listener.stopped();
        result
    }

    fn sanitize_root(
        &self,
        document: &mut Document,
        listener: &mut dyn SanitationListener,
    ) -> Result<()> {
        let root = match self.check_root(document) {
            Ok(root) => root,
            Err(message) => {
                listener.fatal(&message);
                return Err(Error::Sanitation(message));
            }
        };
        if let Err(e) = self.limits.check_nodes(document.tree_size()) {
            let message = e.to_string();
            listener.fatal(&message);
            return Err(Error::Sanitation(message));
        }

        let mut run = Run {
            listener,
            failures: 0,
        };
        self.sanitize_tree(document, root, &mut run);
        match run.failures {
            0 => Ok(()),
            1 => Err(Error::Sanitation("1 fatal error during sanitation".to_string())),
            n => Err(Error::Sanitation(format!("{} fatal errors during sanitation", n))),
        }
    }

    /// The document element must be the grammar's unprefixed root element
    fn check_root(&self, document: &Document) -> std::result::Result<NodeId, String> {
        let root = document
            .root()
            .ok_or_else(|| "document has no root element".to_string())?;
        let expected = self.schema.root_name();
        let is_root = document.element(root).map_or(false, |e| {
            e.name.prefix.is_none()
                && e.name.matches(self.schema.default_namespace(), expected.as_str())
        });
        if !is_root {
            let found = document
                .name(root)
                .map(ToString::to_string)
                .unwrap_or_default();
            return Err(format!(
                "document element must be <{}> in namespace {}, found {}",
                expected,
                self.schema.default_namespace().unwrap_or("(none)"),
                found
            ));
        }
        Ok(root)
    }

    /// Definition of an element that belongs to the grammar
    fn definition(&self, name: &QName) -> Option<&'s ElementDefinition> {
        if name.prefix.is_some() || name.namespace.as_deref() != self.schema.default_namespace() {
            return None;
        }
        self.schema.definition_for(&name.local_name)
    }

    /// Post-order walk over the elements below `root`
    ///
    /// A failure is charged to the element it happens at; its ancestors and
    /// siblings are still repaired.
    fn sanitize_tree(&self, document: &mut Document, root: NodeId, run: &mut Run<'_>) {
        let mut pending = Vec::new();
        self.enter(document, root, 0, run, &mut pending);
        while let Some(top) = pending.last_mut() {
            if let Some(child) = top.children.next() {
                let depth = top.depth + 1;
                self.enter(document, child, depth, run, &mut pending);
                continue;
            }
            let Some(done) = pending.pop() else {
                break;
            };
            if let Err(e) = self.sanitize_element(document, done.element, done.depth, run) {
                run.fail(&e);
            }
        }
    }

    fn enter(
        &self,
        document: &Document,
        element: NodeId,
        depth: usize,
        run: &mut Run<'_>,
        pending: &mut Vec<Pending>,
    ) {
        if let Err(e) = self.limits.check_depth(depth) {
            run.fail(&e);
            return;
        }
        run.listener.entering_element(document, element, depth);
        pending.push(Pending {
            element,
            depth,
            children: document.child_elements(element).into_iter(),
        });
    }

    /// Repair one element whose child elements are already sanitized
    fn sanitize_element(
        &self,
        document: &mut Document,
        element: NodeId,
        depth: usize,
        run: &mut Run<'_>,
    ) -> Result<()> {
        let name = document
            .name(element)
            .cloned()
            .ok_or_else(|| Error::Tree(format!("{} is not an element", element)))?;
        // Foreign elements are left to their parent, which will drop them
        let Some(definition) = self.definition(&name) else {
            run.listener.leaving_element(document, element, depth);
            return Ok(());
        };

        self.repair_children(document, element, &name, definition.content_model(), run)?;

        let is_root = document.root() == Some(element);
        if !is_root && !definition.content_model().allow_empty && !document.has_content(element) {
            run.listener
                .remove_node(document, element, ElementCause::MustNotBeEmpty);
            run.listener.leaving_element(document, element, depth);
            document.remove(element)?;
            return Ok(());
        }

        self.repair_attributes(document, element, definition, run)?;
        run.listener.leaving_element(document, element, depth);
        Ok(())
    }

    /// Why a child is not allowed, or `None` when it is
    fn invalid_child(
        &self,
        document: &Document,
        parent: &QName,
        model: &ContentModel,
        child: NodeId,
    ) -> Option<ElementCause> {
        match document.kind(child)? {
            NodeKind::Text(_) | NodeKind::CData(_) => {
                (!model.pcdata).then_some(ElementCause::InvalidAtParent)
            }
            NodeKind::Element(e) => {
                if e.name.namespace != parent.namespace || e.name.prefix != parent.prefix {
                    return Some(ElementCause::Invalid);
                }
                match ElementName::from_local_name(&e.name.local_name)
                    .filter(|n| self.schema.definition(*n).is_some())
                {
                    None => Some(ElementCause::Invalid),
                    Some(n) if model.allows(n) => None,
                    Some(_) => Some(ElementCause::InvalidAtParent),
                }
            }
            NodeKind::Comment(_) | NodeKind::Attribute(_) | NodeKind::Fragment => None,
        }
    }

    fn repair_children(
        &self,
        document: &mut Document,
        element: NodeId,
        name: &QName,
        model: &ContentModel,
        run: &mut Run<'_>,
    ) -> Result<()> {
        let mut passes = 0;
        loop {
            passes += 1;
            self.limits.check_repair_passes(passes)?;

            let snapshot = document.children(element).to_vec();
            let mut changed = false;
            for child in snapshot {
                let Some(cause) = self.invalid_child(document, name, model, child) else {
                    continue;
                };
                run.listener.remove_node(document, child, cause);
                if document.children(child).is_empty() {
                    document.remove(child)?;
                } else {
                    document.replace_with_children(child)?;
                }
                changed = true;
            }
            if !changed {
                return Ok(());
            }
        }
    }

    fn repair_attributes(
        &self,
        document: &mut Document,
        element: NodeId,
        definition: &ElementDefinition,
        run: &mut Run<'_>,
    ) -> Result<()> {
        let default_namespace = self.schema.default_namespace();
        for attribute in document.attributes(element).to_vec() {
            let Some(attr) = document.attribute(attribute) else {
                continue;
            };
            if attr.name.is_namespace_declaration() {
                continue;
            }
            // Unqualified attributes belong to the grammar's namespace
            let namespace = match (&attr.name.prefix, &attr.name.namespace) {
                (None, None) => default_namespace,
                (_, namespace) => namespace.as_deref(),
            };
            let Some(attribute_definition) = definition.attribute(namespace, &attr.name.local_name)
            else {
                run.listener.remove_invalid_attr(
                    document,
                    element,
                    attribute,
                    AttributeCause::InvalidAtElement,
                );
                document.remove(attribute)?;
                continue;
            };

            let value = attr.value.clone();
            if attribute_definition.is_fixed_value(&value) {
                document.remove(attribute)?;
                continue;
            }
            if attribute_definition.is_valid(&value, self.strictness) {
                continue;
            }
            match attribute_definition.on_invalid.action(self.strictness) {
                InvalidValueAction::Keep => {}
                InvalidValueAction::Remove => {
                    run.listener.remove_invalid_attr(
                        document,
                        element,
                        attribute,
                        AttributeCause::InvalidValue,
                    );
                    document.remove(attribute)?;
                }
                InvalidValueAction::Replace(replacement) => {
                    debug!(
                        attribute = %attribute_definition.name.qualified_name(),
                        value = %value,
                        replacement = %replacement,
                        "replacing invalid attribute value"
                    );
                    document.set_value(attribute, replacement)?;
                }
            }
        }

        for ((namespace, local_name), default) in definition.required_attributes() {
            if self.find_attribute(document, element, namespace.as_deref(), local_name) {
                continue;
            }
            if let Some(attribute_definition) = definition.attribute(namespace.as_deref(), local_name)
            {
                document.set_attribute(element, attribute_definition.instance_name(), default)?;
            }
        }
        Ok(())
    }

    fn find_attribute(
        &self,
        document: &Document,
        element: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> bool {
        document.attribute_node(element, namespace, local_name).is_some()
            || (namespace.is_some()
                && namespace == self.schema.default_namespace()
                && document.attribute_node(element, None, local_name).is_some())
    }
}

/// An element whose child elements are still being sanitized
struct Pending {
    element: NodeId,
    depth: usize,
    children: std::vec::IntoIter<NodeId>,
}

/// State of one sanitation call
struct Run<'l> {
    listener: &'l mut dyn SanitationListener,
    failures: usize,
}

impl Run<'_> {
    fn fail(&mut self, error: &Error) {
        self.failures += 1;
        self.listener.fatal(&error.to_string());
    }
}
