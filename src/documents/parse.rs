//! XML parsing into a [`Document`]

use super::{Document, NodeId};
use crate::error::{Error, Result};
use crate::namespaces::NamespaceContext;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

impl Document {
    /// Parse an XML document from a string
    ///
    /// Namespace prefixes are resolved while parsing. The default namespace
    /// in scope at the document element becomes the document's default
    /// namespace.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.expand_empty_elements(true);

        let mut doc = Document::new(None::<String>);
        let mut stack: Vec<(NodeId, NamespaceContext)> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let scope = stack
                        .last()
                        .map(|(_, scope)| scope.clone())
                        .unwrap_or_else(NamespaceContext::with_xml);
                    let (element, scope) = Self::parse_element(&mut doc, &e, scope)?;
                    match stack.last() {
                        Some((parent, _)) => {
                            doc.append_child(*parent, element)?;
                        }
                        None if doc.root().is_some() => {
                            return Err(Error::Xml(format!(
                                "Unexpected second document element at position {}",
                                reader.buffer_position()
                            )));
                        }
                        None => {
                            doc.set_root(element)?;
                            doc.set_default_namespace(scope.get_default_namespace());
                        }
                    }
                    stack.push((element, scope));
                }
                Ok(Event::End(_)) => {
                    stack.pop();
                }
                Ok(Event::Text(e)) => {
                    // Character data outside the document element is insignificant
                    if let Some((parent, _)) = stack.last() {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?;
                        if !text.is_empty() {
                            let node = doc.create_text(text.into_owned());
                            doc.append_child(*parent, node)?;
                        }
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some((parent, _)) = stack.last() {
                        let text = std::str::from_utf8(&e)
                            .map_err(|e| Error::Xml(format!("Invalid CDATA section: {}", e)))?;
                        let node = doc.create_cdata(text);
                        doc.append_child(*parent, node)?;
                    }
                }
                Ok(Event::Comment(e)) => {
                    if let Some((parent, _)) = stack.last() {
                        let text = std::str::from_utf8(&e)
                            .map_err(|e| Error::Xml(format!("Invalid comment: {}", e)))?;
                        let node = doc.create_comment(text);
                        doc.append_child(*parent, node)?;
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "Error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {} // Ignore declarations, processing instructions and doctypes
            }
        }

        if !stack.is_empty() {
            return Err(Error::Xml("Unexpected end of input: unclosed elements".to_string()));
        }
        if doc.root().is_none() {
            return Err(Error::Xml("Document has no document element".to_string()));
        }

        Ok(doc)
    }

    /// Parse a markup fragment
    ///
    /// The fragment is wrapped into a `div` element in `namespace`, which
    /// becomes the document element; the fragment's nodes are its children.
    pub fn parse_fragment(markup: &str, namespace: &str) -> Result<Self> {
        let escaped = quick_xml::escape::escape(namespace);
        Self::parse(&format!("<div xmlns=\"{}\">{}</div>", escaped, markup))
    }

    /// Create an element from a start tag, returning it with its namespace scope
    fn parse_element(
        doc: &mut Document,
        start: &BytesStart,
        mut scope: NamespaceContext,
    ) -> Result<(NodeId, NamespaceContext)> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?
            .to_string();

        let mut attributes = Vec::new();
        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;

            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?
                .to_string();

            let attr_value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
                .to_string();

            // Declarations apply to the element carrying them, so bind them first
            if attr_name == "xmlns" {
                scope.set_default_namespace(attr_value.as_str());
            } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
                scope.add_prefix(prefix, attr_value.as_str());
            }
            attributes.push((attr_name, attr_value));
        }

        let element = doc.create_element(scope.resolve(&name)?);
        for (attr_name, attr_value) in attributes {
            let qname = scope.resolve_attribute(&attr_name)?;
            doc.set_attribute(element, qname, attr_value)?;
        }

        Ok((element, scope))
    }
}
