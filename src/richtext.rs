//! The RichText storage dialect
//!
//! Stored RichText is a `div` document element in the RichText namespace
//! which declares the XLink prefix used by hyperlink attributes.

use crate::documents::Document;
use crate::namespaces::QName;
use crate::{RICHTEXT_NAMESPACE, XLINK_NAMESPACE};

/// Local name of the document element
pub const ROOT_ELEMENT: &str = "div";

/// Prefix bound to [`XLINK_NAMESPACE`]
pub const XLINK_PREFIX: &str = "xlink";

/// Create an empty RichText document
///
/// The document element declares both the RichText and the XLink namespace.
pub fn new_document() -> Document {
    Document::with_declared_root(
        Some(RICHTEXT_NAMESPACE),
        ROOT_ELEMENT,
        &[(None, RICHTEXT_NAMESPACE), (Some(XLINK_PREFIX), XLINK_NAMESPACE)],
    )
}

/// Name of an XLink attribute
pub fn xlink(local_name: &str) -> QName {
    QName::prefixed(XLINK_NAMESPACE, XLINK_PREFIX, local_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_document() {
        let doc = new_document();
        let root = doc.root().unwrap();
        assert!(doc.is_default_element(root, ROOT_ELEMENT));
        assert_eq!(doc.default_namespace(), Some(RICHTEXT_NAMESPACE));
        assert_eq!(
            doc.to_xml(),
            format!(
                r#"<div xmlns="{}" xmlns:xlink="{}"/>"#,
                RICHTEXT_NAMESPACE, XLINK_NAMESPACE
            )
        );
    }

    #[test]
    fn test_xlink_name() {
        let name = xlink("href");
        assert_eq!(name.qualified_name(), "xlink:href");
        assert!(name.matches(Some(XLINK_NAMESPACE), "href"));
    }
}
