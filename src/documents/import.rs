//! Cross-document import with namespace reconciliation

use super::{Document, NodeId, NodeKind};
use crate::error::{Error, Result};
use crate::namespaces::QName;

impl Document {
    /// Import a node from another document, without its children
    ///
    /// Elements bring their attributes along. An unprefixed element or
    /// attribute in the source document's default namespace is created in
    /// this document's default namespace; every other name is kept as is.
    /// Declarations of the source default namespace are dropped, since this
    /// document declares its own.
    pub fn import_node(&mut self, source: &Document, node: NodeId) -> Result<NodeId> {
        let kind = source
            .kind(node)
            .ok_or_else(|| Error::Tree(format!("unknown source node {}", node)))?;
        let imported = match kind {
            NodeKind::Element(element) => {
                let name = self.reconcile_name(source, &element.name);
                let imported = self.create_element(name);
                for attr in element.attributes() {
                    let is_default_declaration = source.attribute(*attr).map_or(false, |a| {
                        a.name.is_namespace_declaration() && a.name.declared_prefix().is_none()
                    });
                    if is_default_declaration {
                        continue;
                    }
                    let attribute = self.import_node(source, *attr)?;
                    self.set_attribute_node(imported, attribute)?;
                }
                imported
            }
            NodeKind::Attribute(attribute) => {
                let name = self.reconcile_name(source, &attribute.name);
                self.create_attribute(name, attribute.value.clone())
            }
            NodeKind::Text(text) => self.create_text(text.clone()),
            NodeKind::CData(text) => self.create_cdata(text.clone()),
            NodeKind::Comment(text) => self.create_comment(text.clone()),
            NodeKind::Fragment => self.create_fragment(),
        };
        Ok(imported)
    }

    /// Map a name from `source` into this document
    pub fn reconcile_name(&self, source: &Document, name: &QName) -> QName {
        let in_source_default = name.prefix.is_none()
            && name.namespace.is_some()
            && name.namespace.as_deref() == source.default_namespace();
        if in_source_default {
            QName {
                namespace: self.default_namespace.clone(),
                prefix: None,
                local_name: name.local_name.clone(),
            }
        } else {
            name.clone()
        }
    }
}
