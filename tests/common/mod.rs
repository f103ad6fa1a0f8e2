//! Shared helpers for integration tests

#![allow(dead_code)]

use richtext::documents::{Document, NodeId, NodeKind};
use richtext::validators::{ElementName, SchemaRegistry, TrackingListener};
use richtext::{Result, Sanitizer, Strictness, RICHTEXT_NAMESPACE, XLINK_NAMESPACE};

/// Wrap content into a RichText document element
pub fn richtext_xml(content: &str) -> String {
    format!(
        r#"<div xmlns="{}" xmlns:xlink="{}">{}</div>"#,
        RICHTEXT_NAMESPACE, XLINK_NAMESPACE, content
    )
}

/// Parse content wrapped into a RichText document element
pub fn richtext(content: &str) -> Document {
    Document::parse(&richtext_xml(content)).expect("test markup is well-formed")
}

/// Sanitize a document, recording all events
pub fn sanitize(
    schema: &SchemaRegistry,
    doc: &mut Document,
    strictness: Strictness,
) -> (Result<()>, TrackingListener) {
    let mut listener = TrackingListener::new();
    let result = Sanitizer::new(schema)
        .with_strictness(strictness)
        .sanitize(doc, &mut listener);
    (result, listener)
}

/// Collect every grammar violation in a document
pub fn violations(schema: &SchemaRegistry, doc: &Document) -> Vec<String> {
    let mut found = Vec::new();
    if let Some(root) = doc.root() {
        check_element(schema, doc, root, true, &mut found);
    }
    found
}

fn check_element(
    schema: &SchemaRegistry,
    doc: &Document,
    element: NodeId,
    is_root: bool,
    found: &mut Vec<String>,
) {
    let Some(name) = doc.name(element).cloned() else {
        return;
    };
    let defined = name.prefix.is_none()
        && name.namespace.as_deref() == schema.default_namespace();
    let Some(definition) = schema
        .definition_for(&name.local_name)
        .filter(|_| defined)
    else {
        found.push(format!("undefined element {}", name));
        return;
    };
    let model = definition.content_model();

    for child in doc.children(element) {
        match doc.kind(*child) {
            Some(NodeKind::Element(e)) => {
                let allowed = e.name.prefix.is_none()
                    && e.name.namespace == name.namespace
                    && ElementName::from_local_name(&e.name.local_name)
                        .map_or(false, |n| model.allows(n));
                if !allowed {
                    found.push(format!("<{}> not allowed in <{}>", e.name, name.local_name));
                }
                check_element(schema, doc, *child, false, found);
            }
            Some(NodeKind::Text(_)) | Some(NodeKind::CData(_)) if !model.pcdata => {
                found.push(format!("text not allowed in <{}>", name.local_name));
            }
            _ => {}
        }
    }

    if !is_root && !model.allow_empty && !doc.has_content(element) {
        found.push(format!("<{}> must not be empty", name.local_name));
    }

    for attribute in doc.attributes(element) {
        let Some(attr_name) = doc.name(*attribute) else {
            continue;
        };
        if attr_name.is_namespace_declaration() {
            continue;
        }
        let namespace = match (&attr_name.prefix, &attr_name.namespace) {
            (None, None) => schema.default_namespace(),
            (_, namespace) => namespace.as_deref(),
        };
        if definition.attribute(namespace, &attr_name.local_name).is_none() {
            found.push(format!(
                "attribute {} not allowed on <{}>",
                attr_name.qualified_name(),
                name.local_name
            ));
        }
    }
}
