//! XML document trees
//!
//! A [`Document`] is an arena of nodes addressed by [`NodeId`] handles.
//! Nodes are never freed while the document lives: removing a node only
//! detaches it, so handles held by listeners or rules stay readable after a
//! repair. Attributes are nodes too; they are owned by an element but never
//! appear among its children.
//!
//! All mutation primitives validate their input and return
//! [`Error::Tree`] instead of corrupting the tree.

mod import;
mod parse;
mod serialize;

use crate::error::{Error, Result};
use crate::namespaces::QName;
use std::fmt;

/// Handle of a node inside one [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in its document's arena
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element payload
#[derive(Debug, Clone)]
pub struct Element {
    /// Element qualified name
    pub name: QName,
    /// Attribute nodes in document order
    attributes: Vec<NodeId>,
}

impl Element {
    /// Attribute nodes in document order
    pub fn attributes(&self) -> &[NodeId] {
        &self.attributes
    }
}

/// Attribute payload
#[derive(Debug, Clone)]
pub struct Attribute {
    /// Attribute qualified name
    pub name: QName,
    /// Attribute value
    pub value: String,
}

/// Kind and payload of a node
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Element with attributes
    Element(Element),
    /// Attribute owned by an element
    Attribute(Attribute),
    /// Character data
    Text(String),
    /// CDATA section
    CData(String),
    /// Comment
    Comment(String),
    /// Container whose children are moved when it is appended
    Fragment,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// XML document tree
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: Option<NodeId>,
    default_namespace: Option<String>,
}

impl Document {
    /// Create an empty document with the given default namespace
    pub fn new(default_namespace: Option<impl Into<String>>) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            default_namespace: default_namespace.map(Into::into),
        }
    }

    /// Create a document with an empty document element in the default namespace
    pub fn with_root(default_namespace: Option<impl Into<String>>, local_name: &str) -> Self {
        let mut doc = Self::new(default_namespace);
        let root = doc.create_default_element(local_name);
        doc.root = Some(root);
        doc
    }

    /// Create a document whose document element carries namespace declarations
    ///
    /// A `None` prefix declares the default namespace.
    pub fn with_declared_root(
        default_namespace: Option<impl Into<String>>,
        local_name: &str,
        declarations: &[(Option<&str>, &str)],
    ) -> Self {
        let mut doc = Self::new(default_namespace);
        let root = doc.create_default_element(local_name);
        doc.root = Some(root);
        for (prefix, uri) in declarations {
            let declaration = doc.create_attribute(QName::namespace_declaration(*prefix), *uri);
            doc.nodes[declaration.index()].parent = Some(root);
            if let NodeKind::Element(e) = &mut doc.nodes[root.index()].kind {
                e.attributes.push(declaration);
            }
        }
        doc
    }

    /// Default namespace of this document
    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Set the default namespace of this document
    pub fn set_default_namespace(&mut self, namespace: Option<impl Into<String>>) {
        self.default_namespace = namespace.map(Into::into);
    }

    /// The document element
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Make a detached element the document element
    pub fn set_root(&mut self, element: NodeId) -> Result<()> {
        if self.element(element).is_none() {
            return Err(Error::Tree(format!("{} is not an element", element)));
        }
        self.detach(element)?;
        self.root = Some(element);
        Ok(())
    }

    /// Number of nodes ever created in this document, detached ones included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes in the tree below the document element, attributes excluded
    pub fn tree_size(&self) -> usize {
        self.root.map_or(0, |root| self.descendants(root).len())
    }

    // ------------------------------------------------------------------
    // Node construction
    // ------------------------------------------------------------------

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: QName) -> NodeId {
        self.push(NodeKind::Element(Element {
            name,
            attributes: Vec::new(),
        }))
    }

    /// Create a detached element in the document's default namespace
    pub fn create_default_element(&mut self, local_name: &str) -> NodeId {
        let name = QName::new(self.default_namespace.clone(), local_name);
        self.create_element(name)
    }

    /// Create a detached attribute
    pub fn create_attribute(&mut self, name: QName, value: impl Into<String>) -> NodeId {
        self.push(NodeKind::Attribute(Attribute {
            name,
            value: value.into(),
        }))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    /// Create a detached CDATA section
    pub fn create_cdata(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::CData(text.into()))
    }

    /// Create a detached comment
    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Comment(text.into()))
    }

    /// Create an empty fragment
    pub fn create_fragment(&mut self) -> NodeId {
        self.push(NodeKind::Fragment)
    }

    // ------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------

    fn data(&self, id: NodeId) -> Result<&NodeData> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| Error::Tree(format!("unknown node {}", id)))
    }

    fn data_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        self.nodes
            .get_mut(id.0)
            .ok_or_else(|| Error::Tree(format!("unknown node {}", id)))
    }

    /// Kind and payload of a node
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|n| &n.kind)
    }

    /// Element payload, if the node is an element
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            Some(NodeKind::Element(e)) => Some(e),
            _ => None,
        }
    }

    /// Attribute payload, if the node is an attribute
    pub fn attribute(&self, id: NodeId) -> Option<&Attribute> {
        match self.kind(id) {
            Some(NodeKind::Attribute(a)) => Some(a),
            _ => None,
        }
    }

    /// Name of an element or attribute
    pub fn name(&self, id: NodeId) -> Option<&QName> {
        match self.kind(id) {
            Some(NodeKind::Element(e)) => Some(&e.name),
            Some(NodeKind::Attribute(a)) => Some(&a.name),
            _ => None,
        }
    }

    /// Local name of an element or attribute
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.name(id).map(|n| n.local_name.as_str())
    }

    /// Content of a text or CDATA node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            Some(NodeKind::Text(t)) | Some(NodeKind::CData(t)) => Some(t),
            _ => None,
        }
    }

    /// Check if the node is an element
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Element(_)))
    }

    /// Check if the node is a text or CDATA node
    pub fn is_character_data(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Text(_)) | Some(NodeKind::CData(_)))
    }

    /// Check if the node is a fragment
    pub fn is_fragment(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Fragment))
    }

    /// Check if the node may have children
    pub fn can_have_children(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Element(_)) | Some(NodeKind::Fragment))
    }

    /// Check if the element is named `local_name` in the document's default namespace
    pub fn is_default_element(&self, id: NodeId, local_name: &str) -> bool {
        self.element(id).map_or(false, |e| {
            e.name.prefix.is_none() && e.name.matches(self.default_namespace(), local_name)
        })
    }

    /// Parent of a node; the owner element for attributes
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// Children of a node (never attributes)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.0).map_or(&[], |n| n.children.as_slice())
    }

    /// Element children of a node
    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    /// Whether the node has element or non-empty character data children
    pub fn has_content(&self, id: NodeId) -> bool {
        self.children(id).iter().any(|c| match self.kind(*c) {
            Some(NodeKind::Element(_)) => true,
            Some(NodeKind::Text(t)) | Some(NodeKind::CData(t)) => !t.is_empty(),
            _ => false,
        })
    }

    /// Attribute nodes of an element
    pub fn attributes(&self, element: NodeId) -> &[NodeId] {
        self.element(element).map_or(&[], |e| e.attributes())
    }

    /// Find an attribute node by namespace and local name
    pub fn attribute_node(
        &self,
        element: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Option<NodeId> {
        self.attributes(element).iter().copied().find(|a| {
            self.attribute(*a)
                .map_or(false, |attr| attr.name.matches(namespace, local_name))
        })
    }

    /// Get an attribute value by namespace and local name
    pub fn get_attribute(
        &self,
        element: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Option<&str> {
        self.attribute_node(element, namespace, local_name)
            .and_then(|a| self.attribute(a))
            .map(|a| a.value.as_str())
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Depth-first list of a node and its descendants (no attributes)
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    /// Concatenated character data of a node and its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Detach a node from its parent (or owner element); no-op when detached
    fn detach(&mut self, id: NodeId) -> Result<()> {
        let Some(parent) = self.data(id)?.parent else {
            return Ok(());
        };
        let is_attribute = matches!(self.data(id)?.kind, NodeKind::Attribute(_));
        let parent_data = self.data_mut(parent)?;
        if is_attribute {
            if let NodeKind::Element(e) = &mut parent_data.kind {
                e.attributes.retain(|a| *a != id);
            }
        } else {
            parent_data.children.retain(|c| *c != id);
        }
        self.data_mut(id)?.parent = None;
        Ok(())
    }

    /// Remove a node from the tree
    ///
    /// Removing a detached node does nothing. The document element cannot
    /// be removed.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        if self.root == Some(id) {
            return Err(Error::Tree("cannot remove the document element".to_string()));
        }
        self.detach(id)
    }

    fn check_insertion(&self, parent: NodeId, child: NodeId) -> Result<()> {
        if !self.can_have_children(parent) {
            return Err(Error::Tree(format!("{} cannot have children", parent)));
        }
        if matches!(self.data(child)?.kind, NodeKind::Attribute(_)) {
            return Err(Error::Tree(format!(
                "attribute {} cannot be inserted as a child",
                child
            )));
        }
        if self.root == Some(child) {
            return Err(Error::Tree("the document element cannot be moved".to_string()));
        }
        // A childless node can only be an ancestor of itself
        let cycle = if self.children(child).is_empty() {
            child == parent
        } else {
            self.is_ancestor_or_self(child, parent)
        };
        if cycle {
            return Err(Error::Tree(format!(
                "inserting {} into {} would create a cycle",
                child, parent
            )));
        }
        Ok(())
    }

    /// Nodes actually inserted when `child` is inserted (fragments contribute their children)
    fn take_insertion(&mut self, child: NodeId) -> Result<Vec<NodeId>> {
        if self.is_fragment(child) {
            let moved = std::mem::take(&mut self.data_mut(child)?.children);
            for m in &moved {
                self.data_mut(*m)?.parent = None;
            }
            Ok(moved)
        } else {
            self.detach(child)?;
            Ok(vec![child])
        }
    }

    /// Insert `child` before `reference`, or append when `reference` is None
    ///
    /// Inserting a fragment moves its children and leaves it empty.
    /// Returns the nodes that were inserted.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<Vec<NodeId>> {
        self.check_insertion(parent, child)?;
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) || reference == child {
                return Err(Error::Tree(format!(
                    "{} is not a child of {}",
                    reference, parent
                )));
            }
        }
        let moved = self.take_insertion(child)?;
        for m in &moved {
            self.data_mut(*m)?.parent = Some(parent);
        }
        let parent_data = self.data_mut(parent)?;
        let position = match reference {
            Some(reference) => parent_data
                .children
                .iter()
                .position(|c| *c == reference)
                .ok_or_else(|| Error::Tree(format!("{} is not a child of {}", reference, parent)))?,
            None => parent_data.children.len(),
        };
        parent_data
            .children
            .splice(position..position, moved.iter().copied());
        Ok(moved)
    }

    /// Append `child` to `parent`; returns the nodes that were inserted
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<Vec<NodeId>> {
        self.insert_before(parent, child, None)
    }

    /// Replace a node by its own children, keeping their position
    pub fn replace_with_children(&mut self, id: NodeId) -> Result<()> {
        let parent = self
            .parent(id)
            .ok_or_else(|| Error::Tree(format!("{} has no parent", id)))?;
        if self.root == Some(id) {
            return Err(Error::Tree("cannot replace the document element".to_string()));
        }
        if self.attribute(id).is_some() {
            return Err(Error::Tree(format!("attribute {} has no children", id)));
        }
        let children = std::mem::take(&mut self.data_mut(id)?.children);
        for c in &children {
            self.data_mut(*c)?.parent = Some(parent);
        }
        let parent_data = self.data_mut(parent)?;
        let position = parent_data
            .children
            .iter()
            .position(|c| *c == id)
            .ok_or_else(|| Error::Tree(format!("{} is not a child of {}", id, parent)))?;
        parent_data.children.splice(position..=position, children);
        self.data_mut(id)?.parent = None;
        Ok(())
    }

    /// Replace `old` by `new` at the same position
    pub fn replace_node(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        if old == new {
            return Ok(());
        }
        let parent = self
            .parent(old)
            .ok_or_else(|| Error::Tree(format!("{} has no parent", old)))?;
        self.insert_before(parent, new, Some(old))?;
        self.detach(old)
    }

    /// Move all children of `from` to the end of `to`
    pub fn move_children(&mut self, from: NodeId, to: NodeId) -> Result<()> {
        for child in self.children(from).to_vec() {
            self.append_child(to, child)?;
        }
        Ok(())
    }

    /// Rename an element or attribute in place
    pub fn rename(&mut self, id: NodeId, name: QName) -> Result<()> {
        match &mut self.data_mut(id)?.kind {
            NodeKind::Element(e) => e.name = name,
            NodeKind::Attribute(a) => a.name = name,
            _ => return Err(Error::Tree(format!("{} has no name", id))),
        }
        Ok(())
    }

    /// Change the local name of an element or attribute, keeping its namespace
    pub fn rename_local(&mut self, id: NodeId, local_name: &str) -> Result<()> {
        let mut name = self
            .name(id)
            .cloned()
            .ok_or_else(|| Error::Tree(format!("{} has no name", id)))?;
        name.local_name = local_name.to_string();
        self.rename(id, name)
    }

    /// Replace the content of a text, CDATA or comment node
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<()> {
        match &mut self.data_mut(id)?.kind {
            NodeKind::Text(t) | NodeKind::CData(t) | NodeKind::Comment(t) => *t = text.into(),
            _ => return Err(Error::Tree(format!("{} has no text content", id))),
        }
        Ok(())
    }

    /// Replace the value of an attribute node
    pub fn set_value(&mut self, attribute: NodeId, value: impl Into<String>) -> Result<()> {
        match &mut self.data_mut(attribute)?.kind {
            NodeKind::Attribute(a) => a.value = value.into(),
            _ => return Err(Error::Tree(format!("{} is not an attribute", attribute))),
        }
        Ok(())
    }

    /// Attach an attribute node to an element
    ///
    /// An existing attribute with the same namespace and local name is
    /// detached and returned.
    pub fn set_attribute_node(
        &mut self,
        element: NodeId,
        attribute: NodeId,
    ) -> Result<Option<NodeId>> {
        let name = self
            .attribute(attribute)
            .map(|a| a.name.clone())
            .ok_or_else(|| Error::Tree(format!("{} is not an attribute", attribute)))?;
        if self.element(element).is_none() {
            return Err(Error::Tree(format!("{} is not an element", element)));
        }
        let previous = self
            .attribute_node(element, name.namespace.as_deref(), &name.local_name)
            .filter(|p| *p != attribute);
        if let Some(previous) = previous {
            self.detach(previous)?;
        }
        self.detach(attribute)?;
        if let NodeKind::Element(e) = &mut self.data_mut(element)?.kind {
            e.attributes.push(attribute);
        }
        self.data_mut(attribute)?.parent = Some(element);
        Ok(previous)
    }

    /// Set an attribute value, creating the attribute if necessary
    pub fn set_attribute(
        &mut self,
        element: NodeId,
        name: QName,
        value: impl Into<String>,
    ) -> Result<NodeId> {
        if let Some(existing) =
            self.attribute_node(element, name.namespace.as_deref(), &name.local_name)
        {
            self.set_value(existing, value)?;
            return Ok(existing);
        }
        let attribute = self.create_attribute(name, value);
        self.set_attribute_node(element, attribute)?;
        Ok(attribute)
    }

    /// Remove an attribute by namespace and local name; returns its value
    pub fn remove_attribute(
        &mut self,
        element: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Result<Option<String>> {
        let Some(attribute) = self.attribute_node(element, namespace, local_name) else {
            return Ok(None);
        };
        let value = self.attribute(attribute).map(|a| a.value.clone());
        self.detach(attribute)?;
        Ok(value)
    }
}
