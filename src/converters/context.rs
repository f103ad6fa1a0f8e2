//! Conversion context handed to rule stages

use super::base::Direction;
use crate::documents::{Document, NodeId};
use crate::error::{Error, Result};
use crate::namespaces::QName;
use std::collections::HashMap;

/// Access to the source of a conversion and to the document being built
///
/// The source document is read-only here. New nodes are created in the
/// target document; [`import_node`](Self::import_node) copies source nodes
/// with the same namespace reconciliation the converter applies.
pub struct ConversionContext<'a> {
    direction: Direction,
    source: &'a Document,
    source_node: NodeId,
    target: &'a mut Document,
    imported: &'a HashMap<NodeId, NodeId>,
}

impl<'a> ConversionContext<'a> {
    pub(crate) fn new(
        direction: Direction,
        source: &'a Document,
        source_node: NodeId,
        target: &'a mut Document,
        imported: &'a HashMap<NodeId, NodeId>,
    ) -> Self {
        Self {
            direction,
            source,
            source_node,
            target,
            imported,
        }
    }

    /// Direction of the running conversion
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The document being converted
    pub fn source(&self) -> &Document {
        self.source
    }

    /// The source node the current stage was triggered by
    pub fn source_node(&self) -> NodeId {
        self.source_node
    }

    /// The document being built
    pub fn document(&self) -> &Document {
        self.target
    }

    /// The document being built, for mutation
    pub fn document_mut(&mut self) -> &mut Document {
        self.target
    }

    /// Counterpart of a source node whose conversion is in progress
    pub fn imported_counterpart(&self, source_node: NodeId) -> Option<NodeId> {
        self.imported.get(&source_node).copied()
    }

    /// Import a source node, without its children, into the target document
    ///
    /// Nodes whose conversion is in progress are not imported twice; their
    /// existing counterpart is returned.
    pub fn import_node(&mut self, source_node: NodeId) -> Result<NodeId> {
        if let Some(existing) = self.imported_counterpart(source_node) {
            return Ok(existing);
        }
        self.target.import_node(self.source, source_node)
    }

    /// Create an element in the target's default namespace
    pub fn create_element(&mut self, local_name: &str) -> NodeId {
        self.target.create_default_element(local_name)
    }

    /// Create an element with an explicit name
    pub fn create_element_ns(&mut self, name: QName) -> NodeId {
        self.target.create_element(name)
    }

    /// Create a text node
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.target.create_text(text)
    }

    /// Create an attribute node
    pub fn create_attribute(&mut self, name: QName, value: impl Into<String>) -> NodeId {
        self.target.create_attribute(name, value)
    }

    /// Create an empty fragment
    pub fn create_fragment(&mut self) -> NodeId {
        self.target.create_fragment()
    }

    /// Check if a target node is an element in the target's default namespace
    pub fn is_element(&self, node: NodeId, local_name: &str) -> bool {
        self.target.is_default_element(node, local_name)
    }

    /// Move the children of `node` into a new fragment
    ///
    /// Returning the fragment from `imported_with_children` replaces the
    /// node by its children.
    pub fn children_fragment(&mut self, node: NodeId) -> Result<NodeId> {
        if !self.target.can_have_children(node) {
            return Err(Error::Tree(format!("{} cannot have children", node)));
        }
        let fragment = self.target.create_fragment();
        self.target.move_children(node, fragment)?;
        Ok(fragment)
    }

    /// Create a new element named `local_name` in place of `node`
    ///
    /// Attributes and children are moved to the new element.
    pub fn replace_element(&mut self, node: NodeId, local_name: &str) -> Result<NodeId> {
        let replacement = self.target.create_default_element(local_name);
        for attribute in self.target.attributes(node).to_vec() {
            self.target.set_attribute_node(replacement, attribute)?;
        }
        self.target.move_children(node, replacement)?;
        if self.target.parent(node).is_some() {
            self.target.replace_node(node, replacement)?;
        }
        Ok(replacement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RICHTEXT_NAMESPACE, XHTML_NAMESPACE};

    #[test]
    fn test_import_is_reconciled() {
        let source = Document::parse_fragment("<b>x</b>", XHTML_NAMESPACE).unwrap();
        let b = source.child_elements(source.root().unwrap())[0];
        let mut target = Document::new(Some(RICHTEXT_NAMESPACE));
        let cache = HashMap::new();

        let mut ctx = ConversionContext::new(Direction::ToData, &source, b, &mut target, &cache);
        let imported = ctx.import_node(b).unwrap();
        assert!(ctx.is_element(imported, "b"));
        assert_eq!(ctx.source_node(), b);
        assert_eq!(ctx.direction(), Direction::ToData);
    }

    #[test]
    fn test_in_progress_node_is_not_imported_twice() {
        let source = Document::parse_fragment("<p/>", XHTML_NAMESPACE).unwrap();
        let p = source.child_elements(source.root().unwrap())[0];
        let mut target = Document::new(Some(RICHTEXT_NAMESPACE));
        let existing = target.create_default_element("p");
        let cache = HashMap::from([(p, existing)]);

        let mut ctx = ConversionContext::new(Direction::ToData, &source, p, &mut target, &cache);
        assert_eq!(ctx.import_node(p).unwrap(), existing);
    }

    #[test]
    fn test_replace_element_moves_content() {
        let source = Document::new(None::<String>);
        let mut target = Document::new(Some(RICHTEXT_NAMESPACE));
        let root = target.create_default_element("div");
        target.set_root(root).unwrap();
        let b = target.create_default_element("b");
        target.append_child(root, b).unwrap();
        target.set_attribute(b, QName::local("class"), "x").unwrap();
        let text = target.create_text("bold");
        target.append_child(b, text).unwrap();
        let cache = HashMap::new();

        let mut ctx = ConversionContext::new(Direction::ToData, &source, b, &mut target, &cache);
        let strong = ctx.replace_element(b, "strong").unwrap();

        assert!(target.is_default_element(strong, "strong"));
        assert_eq!(target.children(root), &[strong]);
        assert_eq!(target.children(strong), &[text]);
        assert_eq!(target.get_attribute(strong, None, "class"), Some("x"));
    }

    #[test]
    fn test_children_fragment() {
        let source = Document::new(None::<String>);
        let mut target = Document::new(Some(RICHTEXT_NAMESPACE));
        let span = target.create_default_element("span");
        let text = target.create_text("x");
        target.append_child(span, text).unwrap();
        let cache = HashMap::new();

        let mut ctx = ConversionContext::new(Direction::ToData, &source, span, &mut target, &cache);
        let fragment = ctx.children_fragment(span).unwrap();
        assert_eq!(target.children(fragment), &[text]);
        assert!(target.children(span).is_empty());
    }
}
