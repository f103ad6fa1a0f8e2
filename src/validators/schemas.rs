//! Schema registry
//!
//! A [`SchemaRegistry`] holds the element definitions of one grammar. It is
//! either the built-in RichText 1.0 grammar ([`SchemaRegistry::richtext`]),
//! derived from the RichText DTD, or a declarative [`GrammarConfig`]
//! resolved by [`SchemaRegistry::from_config`]. Registries are immutable and
//! can be shared between threads.

use super::attributes::AttributeSpec;
use super::facets::ContentValidator;
use super::models::{ContentModel, ElementDefinition, ElementName};
use crate::error::{Result, SchemaError};
use crate::names::split_qname;
use crate::namespaces::QName;
use crate::{RICHTEXT_NAMESPACE, XLINK_NAMESPACE, XML_NAMESPACE};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// Block level elements
const BLOCK: [ElementName; 6] = [
    ElementName::P,
    ElementName::Ul,
    ElementName::Ol,
    ElementName::Pre,
    ElementName::Blockquote,
    ElementName::Table,
];

/// Inline elements
const INLINE: [ElementName; 8] = [
    ElementName::A,
    ElementName::Br,
    ElementName::Span,
    ElementName::Img,
    ElementName::Em,
    ElementName::Strong,
    ElementName::Sub,
    ElementName::Sup,
];

/// Inline elements allowed in preformatted text (no images)
const PRE_CONTENT: [ElementName; 7] = [
    ElementName::A,
    ElementName::Br,
    ElementName::Span,
    ElementName::Em,
    ElementName::Strong,
    ElementName::Sub,
    ElementName::Sup,
];

/// Inline elements allowed in links (no nested links)
const A_CONTENT: [ElementName; 7] = [
    ElementName::Br,
    ElementName::Span,
    ElementName::Img,
    ElementName::Em,
    ElementName::Strong,
    ElementName::Sub,
    ElementName::Sup,
];

/// Declarative description of an element
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ElementConfig {
    /// Allowed child element names
    pub children: Vec<String>,
    /// Character data is allowed
    pub pcdata: bool,
    /// The element may be empty
    pub allow_empty: bool,
    /// Attribute specifications
    pub attributes: Vec<AttributeSpec>,
}

/// Declarative grammar
#[derive(Debug, Clone, Deserialize)]
pub struct GrammarConfig {
    /// Name of the document element
    #[serde(default = "default_root")]
    pub root: String,
    /// Namespace of the grammar's elements
    #[serde(default)]
    pub default_namespace: Option<String>,
    /// Prefixes attribute names may use; `xml` is always known
    #[serde(default)]
    pub prefixes: IndexMap<String, String>,
    /// Element definitions keyed by local name
    pub elements: IndexMap<String, ElementConfig>,
}

fn default_root() -> String {
    ElementName::Div.as_str().to_string()
}

/// Registry of element definitions for one grammar
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    root: ElementName,
    default_namespace: Option<String>,
    definitions: IndexMap<ElementName, ElementDefinition>,
}

impl SchemaRegistry {
    /// The RichText 1.0 grammar
    pub fn richtext() -> Self {
        let prefixes = known_prefixes([("xlink", XLINK_NAMESPACE)]);
        let mut definitions = IndexMap::new();
        for name in ElementName::ALL {
            let (content_model, specs) = richtext_element(name);
            let attributes = specs
                .iter()
                .map(|spec| spec.definition(builtin_name(&spec.name, &prefixes)));
            definitions.insert(name, ElementDefinition::new(name, content_model, attributes));
        }
        Self {
            root: ElementName::Div,
            default_namespace: Some(RICHTEXT_NAMESPACE.to_string()),
            definitions,
        }
    }

    /// Build a registry from a declarative grammar
    ///
    /// Fails on element names outside the vocabulary, children without a
    /// definition, a root without a definition and unknown attribute
    /// prefixes.
    pub fn from_config(config: GrammarConfig) -> Result<Self> {
        let mut prefixes = config.prefixes.clone();
        prefixes.insert("xml".to_string(), XML_NAMESPACE.to_string());

        let mut names = IndexMap::new();
        for local_name in config.elements.keys() {
            let name = ElementName::from_local_name(local_name).ok_or_else(|| {
                SchemaError::new("element is not part of the vocabulary").with_element(local_name)
            })?;
            names.insert(local_name.as_str(), name);
        }

        let mut definitions = IndexMap::new();
        for (local_name, element) in &config.elements {
            let mut content_model = ContentModel {
                pcdata: element.pcdata,
                allow_empty: element.allow_empty,
                ..ContentModel::default()
            };
            for child in &element.children {
                let child_name = names.get(child.as_str()).copied().ok_or_else(|| {
                    SchemaError::new(format!("child element '{}' has no definition", child))
                        .with_element(local_name)
                })?;
                content_model.children.insert(child_name);
            }

            let mut attributes = Vec::with_capacity(element.attributes.len());
            for spec in &element.attributes {
                let definition = spec
                    .resolve(config.default_namespace.as_deref(), &prefixes)
                    .map_err(|e| e.with_element(local_name))?;
                attributes.push(definition);
            }

            let name = names[local_name.as_str()];
            definitions.insert(name, ElementDefinition::new(name, content_model, attributes));
        }

        let root = names.get(config.root.as_str()).copied().ok_or_else(|| {
            SchemaError::new("root element has no definition").with_element(&config.root)
        })?;

        Ok(Self {
            root,
            default_namespace: config.default_namespace,
            definitions,
        })
    }

    /// Build a registry from a JSON grammar
    pub fn from_json(json: &str) -> Result<Self> {
        let config: GrammarConfig = serde_json::from_str(json)?;
        Self::from_config(config)
    }

    /// Build a registry from a JSON grammar file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Definition of an element by local name
    pub fn definition_for(&self, local_name: &str) -> Option<&ElementDefinition> {
        ElementName::from_local_name(local_name).and_then(|name| self.definitions.get(&name))
    }

    /// Definition of a vocabulary element
    pub fn definition(&self, name: ElementName) -> Option<&ElementDefinition> {
        self.definitions.get(&name)
    }

    /// Name of the document element
    pub fn root_name(&self) -> ElementName {
        self.root
    }

    /// Namespace of the grammar's elements
    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Number of element definitions
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the registry has no definitions
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::richtext()
    }
}

fn known_prefixes<const N: usize>(extra: [(&str, &str); N]) -> IndexMap<String, String> {
    let mut prefixes = IndexMap::new();
    prefixes.insert("xml".to_string(), XML_NAMESPACE.to_string());
    for (prefix, uri) in extra {
        prefixes.insert(prefix.to_string(), uri.to_string());
    }
    prefixes
}

/// Name of a built-in attribute; unprefixed names are in the RichText namespace
fn builtin_name(qname: &str, prefixes: &IndexMap<String, String>) -> QName {
    match split_qname(qname) {
        (Some(prefix), local_name) => QName {
            namespace: prefixes.get(prefix).cloned(),
            prefix: Some(prefix.to_string()),
            local_name: local_name.to_string(),
        },
        (None, local_name) => QName::namespaced(RICHTEXT_NAMESPACE, local_name),
    }
}

/// `class`
fn core_attrs() -> Vec<AttributeSpec> {
    vec![AttributeSpec::new("class", ContentValidator::Text)]
}

/// `class`, `lang`, `xml:lang`, `dir`
fn attrs() -> Vec<AttributeSpec> {
    let mut specs = core_attrs();
    specs.push(AttributeSpec::new("lang", ContentValidator::NameToken));
    specs.push(AttributeSpec::new("xml:lang", ContentValidator::NameToken));
    specs.push(AttributeSpec::new(
        "dir",
        ContentValidator::enumeration(["ltr", "rtl"]),
    ));
    specs
}

fn cell_alignment() -> [AttributeSpec; 2] {
    [
        AttributeSpec::new("align", ContentValidator::enumeration(["left", "center", "right"])),
        AttributeSpec::new(
            "valign",
            ContentValidator::enumeration(["top", "middle", "bottom", "baseline"]),
        ),
    ]
}

fn with(mut base: Vec<AttributeSpec>, extra: impl IntoIterator<Item = AttributeSpec>) -> Vec<AttributeSpec> {
    base.extend(extra);
    base
}

/// Content model and attributes of a RichText element, following the DTD
fn richtext_element(name: ElementName) -> (ContentModel, Vec<AttributeSpec>) {
    let inline_container = || ContentModel::new(INLINE).with_pcdata().allowing_empty();
    let flow = || {
        ContentModel::new(BLOCK.into_iter().chain(INLINE))
            .with_pcdata()
            .allowing_empty()
    };
    match name {
        ElementName::Div => (ContentModel::new(BLOCK).allowing_empty(), Vec::new()),
        ElementName::P => (inline_container(), attrs()),
        ElementName::Ul | ElementName::Ol => (ContentModel::new([ElementName::Li]), attrs()),
        ElementName::Li => (flow(), attrs()),
        ElementName::Pre => (
            ContentModel::new(PRE_CONTENT).with_pcdata().allowing_empty(),
            with(
                attrs(),
                [AttributeSpec::new("xml:space", ContentValidator::Any).fixed("preserve")],
            ),
        ),
        ElementName::Blockquote => (
            ContentModel::new(BLOCK),
            with(attrs(), [AttributeSpec::new("cite", ContentValidator::Uri)]),
        ),
        ElementName::A => (
            ContentModel::new(A_CONTENT).with_pcdata().allowing_empty(),
            with(
                attrs(),
                [
                    AttributeSpec::new("xlink:type", ContentValidator::Any).fixed("simple"),
                    AttributeSpec::new("xlink:href", ContentValidator::Uri).required(""),
                    AttributeSpec::new("xlink:role", ContentValidator::Text),
                    AttributeSpec::new("xlink:title", ContentValidator::Text),
                    AttributeSpec::new(
                        "xlink:show",
                        ContentValidator::enumeration(["new", "replace", "embed", "other", "none"]),
                    ),
                    AttributeSpec::new(
                        "xlink:actuate",
                        ContentValidator::enumeration(["onRequest", "onLoad"]),
                    ),
                ],
            ),
        ),
        ElementName::Span
        | ElementName::Em
        | ElementName::Strong
        | ElementName::Sub
        | ElementName::Sup => (inline_container(), attrs()),
        ElementName::Br => (ContentModel::empty(), core_attrs()),
        ElementName::Img => (
            ContentModel::empty(),
            with(
                attrs(),
                [
                    AttributeSpec::new("alt", ContentValidator::Text).required(""),
                    AttributeSpec::new("height", ContentValidator::Length),
                    AttributeSpec::new("width", ContentValidator::Length),
                    AttributeSpec::new("xlink:type", ContentValidator::Any).fixed("simple"),
                    AttributeSpec::new("xlink:href", ContentValidator::Uri).required(""),
                    AttributeSpec::new("xlink:role", ContentValidator::Text),
                    AttributeSpec::new("xlink:title", ContentValidator::Text),
                    AttributeSpec::new("xlink:show", ContentValidator::Any).fixed("embed"),
                    AttributeSpec::new("xlink:actuate", ContentValidator::Any).fixed("onLoad"),
                ],
            ),
        ),
        ElementName::Table => (
            ContentModel::new([ElementName::Tbody, ElementName::Tr]),
            with(attrs(), [AttributeSpec::new("summary", ContentValidator::Text)]),
        ),
        ElementName::Tbody | ElementName::Tr => {
            let child = if name == ElementName::Tbody {
                ElementName::Tr
            } else {
                ElementName::Td
            };
            (ContentModel::new([child]), with(attrs(), cell_alignment()))
        }
        ElementName::Td => (
            flow(),
            with(
                with(attrs(), cell_alignment()),
                [
                    AttributeSpec::new("abbr", ContentValidator::Text),
                    AttributeSpec::new("rowspan", ContentValidator::Number),
                    AttributeSpec::new("colspan", ContentValidator::Number),
                ],
            ),
        ),
    }
}
