//! Element vocabulary and content models
//!
//! The RichText vocabulary is closed: every element the grammar knows is a
//! variant of [`ElementName`]. Content models refer to children by variant,
//! so a reference to an element without a definition can only come from a
//! declarative grammar and is rejected when the registry is built.

use super::attributes::AttributeDefinition;
use indexmap::{IndexMap, IndexSet};
use std::fmt;

/// Element of the RichText vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementName {
    /// Structural container, the document element
    Div,
    /// Paragraph
    P,
    /// Unordered list
    Ul,
    /// Ordered list
    Ol,
    /// List item
    Li,
    /// Preformatted text
    Pre,
    /// Quotation
    Blockquote,
    /// Hyperlink
    A,
    /// Generic inline container
    Span,
    /// Emphasis
    Em,
    /// Strong emphasis
    Strong,
    /// Subscript
    Sub,
    /// Superscript
    Sup,
    /// Line break
    Br,
    /// Image
    Img,
    /// Table
    Table,
    /// Table body
    Tbody,
    /// Table row
    Tr,
    /// Table cell
    Td,
}

impl ElementName {
    /// All elements, in declaration order
    pub const ALL: [ElementName; 19] = [
        ElementName::Div,
        ElementName::P,
        ElementName::Ul,
        ElementName::Ol,
        ElementName::Li,
        ElementName::Pre,
        ElementName::Blockquote,
        ElementName::A,
        ElementName::Span,
        ElementName::Em,
        ElementName::Strong,
        ElementName::Sub,
        ElementName::Sup,
        ElementName::Br,
        ElementName::Img,
        ElementName::Table,
        ElementName::Tbody,
        ElementName::Tr,
        ElementName::Td,
    ];

    /// Local name of the element
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementName::Div => "div",
            ElementName::P => "p",
            ElementName::Ul => "ul",
            ElementName::Ol => "ol",
            ElementName::Li => "li",
            ElementName::Pre => "pre",
            ElementName::Blockquote => "blockquote",
            ElementName::A => "a",
            ElementName::Span => "span",
            ElementName::Em => "em",
            ElementName::Strong => "strong",
            ElementName::Sub => "sub",
            ElementName::Sup => "sup",
            ElementName::Br => "br",
            ElementName::Img => "img",
            ElementName::Table => "table",
            ElementName::Tbody => "tbody",
            ElementName::Tr => "tr",
            ElementName::Td => "td",
        }
    }

    /// Look up an element by local name
    pub fn from_local_name(name: &str) -> Option<Self> {
        let element = match name {
            "div" => ElementName::Div,
            "p" => ElementName::P,
            "ul" => ElementName::Ul,
            "ol" => ElementName::Ol,
            "li" => ElementName::Li,
            "pre" => ElementName::Pre,
            "blockquote" => ElementName::Blockquote,
            "a" => ElementName::A,
            "span" => ElementName::Span,
            "em" => ElementName::Em,
            "strong" => ElementName::Strong,
            "sub" => ElementName::Sub,
            "sup" => ElementName::Sup,
            "br" => ElementName::Br,
            "img" => ElementName::Img,
            "table" => ElementName::Table,
            "tbody" => ElementName::Tbody,
            "tr" => ElementName::Tr,
            "td" => ElementName::Td,
            _ => return None,
        };
        Some(element)
    }
}

impl fmt::Display for ElementName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Legal content of an element
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentModel {
    /// Character data is allowed
    pub pcdata: bool,
    /// The element may have no content at all
    pub allow_empty: bool,
    /// Allowed child elements
    pub children: IndexSet<ElementName>,
}

impl ContentModel {
    /// Content model with the given children, no text, never empty
    pub fn new(children: impl IntoIterator<Item = ElementName>) -> Self {
        Self {
            pcdata: false,
            allow_empty: false,
            children: children.into_iter().collect(),
        }
    }

    /// Content model of an element that must stay empty
    pub fn empty() -> Self {
        Self {
            pcdata: false,
            allow_empty: true,
            children: IndexSet::new(),
        }
    }

    /// Allow character data
    pub fn with_pcdata(mut self) -> Self {
        self.pcdata = true;
        self
    }

    /// Allow the element to be empty
    pub fn allowing_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    /// Check if a child element is allowed
    pub fn allows(&self, child: ElementName) -> bool {
        self.children.contains(&child)
    }
}

/// Key of the attribute index: (namespace, local name)
pub type AttributeKey = (Option<String>, String);

/// Content model and attribute table of one element
#[derive(Debug, Clone)]
pub struct ElementDefinition {
    name: ElementName,
    content_model: ContentModel,
    attributes: IndexMap<AttributeKey, AttributeDefinition>,
    required: IndexMap<AttributeKey, String>,
}

impl ElementDefinition {
    /// Create a definition and derive its lookup indexes
    ///
    /// Later attribute definitions with the same name replace earlier ones.
    pub fn new(
        name: ElementName,
        content_model: ContentModel,
        attributes: impl IntoIterator<Item = AttributeDefinition>,
    ) -> Self {
        let mut by_name = IndexMap::new();
        for attribute in attributes {
            let key = (
                attribute.namespace().map(str::to_string),
                attribute.local_name().to_string(),
            );
            by_name.insert(key, attribute);
        }
        // A fixed value is implied, injecting it would only get it stripped again
        let required = by_name
            .iter()
            .filter(|(_, def)| def.fixed.is_none())
            .filter_map(|(key, def)| def.required.clone().map(|default| (key.clone(), default)))
            .collect();
        Self {
            name,
            content_model,
            attributes: by_name,
            required,
        }
    }

    /// Element name
    pub fn name(&self) -> ElementName {
        self.name
    }

    /// Content model
    pub fn content_model(&self) -> &ContentModel {
        &self.content_model
    }

    /// Attribute definitions in declaration order
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.attributes.values()
    }

    /// Find an attribute definition by namespace and local name
    pub fn attribute(&self, namespace: Option<&str>, local_name: &str) -> Option<&AttributeDefinition> {
        self.attributes
            .get(&(namespace.map(str::to_string), local_name.to_string()))
    }

    /// Required attributes and their default values
    pub fn required_attributes(&self) -> impl Iterator<Item = (&AttributeKey, &str)> {
        self.required.iter().map(|(key, value)| (key, value.as_str()))
    }
}
