//! Serialization of a [`Document`] to XML text
//!
//! Namespace declaration attributes are written as they are found. Any
//! binding an element or attribute needs that is not in scope is declared
//! on the fly, so trees assembled by conversion rules always serialize to
//! well-formed, namespace-correct XML.

use super::{Document, NodeId, NodeKind};
use crate::namespaces::QName;
use crate::XML_NAMESPACE;
use quick_xml::escape::{escape, partial_escape};
use std::collections::HashMap;
use std::rc::Rc;

/// In-scope bindings, keyed by prefix ("" for the default namespace)
type Scope = HashMap<String, String>;

impl Document {
    /// Serialize the whole document
    pub fn to_xml(&self) -> String {
        match self.root() {
            Some(root) => self.node_to_xml(root),
            None => String::new(),
        }
    }

    /// Serialize a node and its subtree
    pub fn node_to_xml(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &Scope::new(), &mut out);
        out
    }

    /// Serialize the children of a node
    ///
    /// Bindings declared on `node` itself are assumed to be in scope, so
    /// children in the container's namespace are written without
    /// redundant declarations.
    pub fn inner_xml(&self, node: NodeId) -> String {
        let mut scope = Scope::new();
        if let Some(element) = self.element(node) {
            self.bind_declarations(node, &mut scope);
            let key = element.name.prefix.clone().unwrap_or_default();
            scope
                .entry(key)
                .or_insert_with(|| element.name.namespace.clone().unwrap_or_default());
        }
        let mut out = String::new();
        for child in self.children(node) {
            self.write_node(*child, &scope, &mut out);
        }
        out
    }

    fn bind_declarations(&self, element: NodeId, scope: &mut Scope) {
        for attr in self.attributes(element) {
            if let Some(attribute) = self.attribute(*attr) {
                if attribute.name.is_namespace_declaration() {
                    let prefix = attribute.name.declared_prefix().unwrap_or_default();
                    scope.insert(prefix.to_string(), attribute.value.clone());
                }
            }
        }
    }

    /// Write a subtree without recursing, so nesting depth is only bounded by memory
    fn write_node(&self, node: NodeId, scope: &Scope, out: &mut String) {
        let mut steps = vec![Step::Open(node, Rc::new(scope.clone()))];
        while let Some(step) = steps.pop() {
            let (node, scope) = match step {
                Step::Open(node, scope) => (node, scope),
                Step::Close(name) => {
                    out.push_str("</");
                    out.push_str(&name);
                    out.push('>');
                    continue;
                }
            };
            match self.kind(node) {
                Some(NodeKind::Element(element)) => {
                    if let Some(scope) = self.open_element(node, &scope, out) {
                        steps.push(Step::Close(element.name.qualified_name()));
                        self.push_children(node, &Rc::new(scope), &mut steps);
                    }
                }
                Some(NodeKind::Text(text)) => out.push_str(&partial_escape(text.as_str())),
                Some(NodeKind::CData(text)) => {
                    out.push_str("<![CDATA[");
                    out.push_str(text);
                    out.push_str("]]>");
                }
                Some(NodeKind::Comment(text)) => {
                    out.push_str("<!--");
                    out.push_str(text);
                    out.push_str("-->");
                }
                Some(NodeKind::Fragment) => self.push_children(node, &scope, &mut steps),
                Some(NodeKind::Attribute(attribute)) => out.push_str(&attribute.value),
                None => {}
            }
        }
    }

    /// Queue the children of a node in document order
    fn push_children(&self, node: NodeId, scope: &Rc<Scope>, steps: &mut Vec<Step>) {
        for child in self.children(node).iter().rev() {
            steps.push(Step::Open(*child, Rc::clone(scope)));
        }
    }

    /// Write a start tag, or an empty element tag for childless elements
    ///
    /// Returns the scope of the element's children when a closing tag was
    /// queued by the caller.
    fn open_element(&self, node: NodeId, parent_scope: &Scope, out: &mut String) -> Option<Scope> {
        let element = self.element(node)?;
        let mut scope = parent_scope.clone();
        self.bind_declarations(node, &mut scope);

        let mut declarations: Vec<(String, String)> = Vec::new();
        let mut require = |name: &QName, is_attribute: bool, scope: &mut Scope| {
            if is_attribute && name.prefix.is_none() && name.namespace.is_none() {
                return;
            }
            if name.namespace.as_deref() == Some(XML_NAMESPACE) || name.is_namespace_declaration()
            {
                return;
            }
            let prefix = name.prefix.clone().unwrap_or_default();
            let uri = name.namespace.clone().unwrap_or_default();
            let bound = scope.get(&prefix).cloned().unwrap_or_default();
            if bound != uri {
                scope.insert(prefix.clone(), uri.clone());
                declarations.push((prefix, uri));
            }
        };

        require(&element.name, false, &mut scope);
        let mut attributes = Vec::new();
        let mut synthesized = 0;
        for attr in element.attributes() {
            if let Some(attribute) = self.attribute(*attr) {
                let mut name = attribute.name.clone();
                // Attributes in a namespace need a prefix to say so
                if name.prefix.is_none() && name.namespace.is_some() && !name.is_namespace_declaration() {
                    name.prefix = Some(free_prefix(&scope, &mut synthesized));
                }
                require(&name, true, &mut scope);
                attributes.push((name, attribute.value.as_str()));
            }
        }

        out.push('<');
        out.push_str(&element.name.qualified_name());
        for (name, value) in &attributes {
            out.push(' ');
            out.push_str(&name.qualified_name());
            out.push_str("=\"");
            out.push_str(&escape(*value));
            out.push('"');
        }
        for (prefix, uri) in &declarations {
            if prefix.is_empty() {
                out.push_str(" xmlns=\"");
            } else {
                out.push_str(" xmlns:");
                out.push_str(prefix);
                out.push_str("=\"");
            }
            out.push_str(&escape(uri.as_str()));
            out.push('"');
        }

        if self.children(node).is_empty() {
            out.push_str("/>");
            return None;
        }
        out.push('>');
        Some(scope)
    }
}

/// Pending serialization work
enum Step {
    /// Write a node with the bindings in scope at its position
    Open(NodeId, Rc<Scope>),
    /// Write the closing tag of an element
    Close(String),
}

/// First `ns{N}` prefix not bound in `scope`
fn free_prefix(scope: &Scope, next: &mut usize) -> String {
    loop {
        let prefix = format!("ns{}", next);
        *next += 1;
        if !scope.contains_key(&prefix) {
            return prefix;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RICHTEXT_NAMESPACE, XLINK_NAMESPACE};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip_keeps_markup() {
        let xml = r##"<div xmlns="urn:a" xmlns:xlink="http://www.w3.org/1999/xlink"><p class="x">a &amp; b<a xlink:href="#1"/></p></div>"##;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(doc.to_xml(), xml);
    }

    #[test]
    fn test_missing_declarations_are_added() {
        let mut doc = Document::new(Some(RICHTEXT_NAMESPACE));
        let root = doc.create_default_element("div");
        doc.set_root(root).unwrap();
        let a = doc.create_default_element("a");
        doc.append_child(root, a).unwrap();
        doc.set_attribute(a, QName::prefixed(XLINK_NAMESPACE, "xlink", "href"), "x")
            .unwrap();

        assert_eq!(
            doc.to_xml(),
            format!(
                r#"<div xmlns="{}"><a xlink:href="x" xmlns:xlink="{}"/></div>"#,
                RICHTEXT_NAMESPACE, XLINK_NAMESPACE
            )
        );
    }

    #[test]
    fn test_inner_xml_omits_container_namespace() {
        let doc = Document::parse_fragment("<p>one</p><p>t&lt;wo</p>", "urn:view").unwrap();
        assert_eq!(doc.inner_xml(doc.root().unwrap()), "<p>one</p><p>t&lt;wo</p>");
    }

    #[test]
    fn test_undeclared_default_namespace() {
        let xml = r#"<div xmlns="urn:a"><p xmlns=""/></div>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(doc.to_xml(), xml);
    }

    #[test]
    fn test_xml_prefix_is_never_declared() {
        let xml = r#"<pre xml:space="preserve"> x </pre>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(doc.to_xml(), xml);
    }

    #[test]
    fn test_synthesized_prefix_skips_bound_prefixes() {
        let mut doc = Document::parse(r#"<div xmlns="urn:a" xmlns:ns0="urn:taken"><p/></div>"#).unwrap();
        let p = doc.child_elements(doc.root().unwrap())[0];
        doc.set_attribute(p, QName::namespaced("urn:other", "key"), "v").unwrap();

        assert_eq!(
            doc.to_xml(),
            r#"<div xmlns="urn:a" xmlns:ns0="urn:taken"><p ns1:key="v" xmlns:ns1="urn:other"/></div>"#
        );
    }

    #[test]
    fn test_deep_tree_is_serialized() {
        let depth = 100_000;
        let xml = format!("{}x{}", "<p>".repeat(depth), "</p>".repeat(depth));
        let doc = Document::parse(&xml).unwrap();
        assert_eq!(doc.to_xml(), xml);
    }
}
