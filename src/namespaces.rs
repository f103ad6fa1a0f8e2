//! XML namespace handling
//!
//! This module provides utilities for working with XML namespaces,
//! qualified names (QNames), and namespace prefix mappings.

use crate::error::{Error, Result};
use crate::{XMLNS_NAMESPACE, XML_NAMESPACE};
use std::collections::HashMap;
use std::fmt;

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// Qualified name of an element or attribute node
///
/// Besides namespace and local name the prefix is kept as written, because
/// the grammar distinguishes `a` from `x:a` even when both resolve to the
/// same namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<NamespaceUri>,
    /// Prefix as written (None for unprefixed names)
    pub prefix: Option<Prefix>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new unprefixed QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            prefix: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            prefix: None,
            local_name: local_name.into(),
        }
    }

    /// Create an unprefixed QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            prefix: None,
            local_name: local_name.into(),
        }
    }

    /// Create a prefixed QName
    pub fn prefixed(
        namespace: impl Into<String>,
        prefix: impl Into<String>,
        local_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: Some(namespace.into()),
            prefix: Some(prefix.into()),
            local_name: local_name.into(),
        }
    }

    /// Name of a namespace declaration attribute (`xmlns` or `xmlns:prefix`)
    pub fn namespace_declaration(prefix: Option<&str>) -> Self {
        match prefix {
            Some(prefix) => Self::prefixed(XMLNS_NAMESPACE, "xmlns", prefix),
            None => Self::namespaced(XMLNS_NAMESPACE, "xmlns"),
        }
    }

    /// The name as written in markup (`prefix:local` or `local`)
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local_name),
            None => self.local_name.clone(),
        }
    }

    /// Check namespace and local name, ignoring the prefix
    pub fn matches(&self, namespace: Option<&str>, local_name: &str) -> bool {
        self.namespace.as_deref() == namespace && self.local_name == local_name
    }

    /// Whether this names an `xmlns` or `xmlns:*` declaration
    pub fn is_namespace_declaration(&self) -> bool {
        self.namespace.as_deref() == Some(XMLNS_NAMESPACE)
    }

    /// For a namespace declaration, the prefix it declares (None for `xmlns`)
    pub fn declared_prefix(&self) -> Option<&str> {
        if self.is_namespace_declaration() && self.prefix.is_some() {
            Some(&self.local_name)
        } else {
            None
        }
    }
}

/// Clark notation: `{namespace}local`
impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// Namespace context for resolving prefixes
#[derive(Debug, Clone)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI
    prefixes: HashMap<Prefix, NamespaceUri>,
    /// Default namespace (no prefix)
    default_namespace: Option<NamespaceUri>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self {
            prefixes: HashMap::new(),
            default_namespace: None,
        }
    }

    /// Create a context with the implicit `xml` prefix bound
    pub fn with_xml() -> Self {
        let mut ctx = Self::new();
        ctx.add_prefix("xml", XML_NAMESPACE);
        ctx
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Set the default namespace; an empty URI undeclares it
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        self.default_namespace = if namespace.is_empty() {
            None
        } else {
            Some(namespace)
        };
    }

    /// Get the namespace for a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default namespace
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Resolve a prefixed element name to a QName
    pub fn resolve(&self, prefixed_name: &str) -> Result<QName> {
        if let Some((prefix, local)) = prefixed_name.split_once(':') {
            let namespace = self
                .get_namespace(prefix)
                .ok_or_else(|| Error::Namespace(format!("Unknown prefix: {}", prefix)))?;
            Ok(QName::prefixed(namespace, prefix, local))
        } else {
            Ok(QName::new(self.default_namespace.clone(), prefixed_name))
        }
    }

    /// Resolve an attribute name; unprefixed attributes are in no namespace
    pub fn resolve_attribute(&self, prefixed_name: &str) -> Result<QName> {
        if prefixed_name == "xmlns" {
            return Ok(QName::namespace_declaration(None));
        }
        match prefixed_name.split_once(':') {
            Some(("xmlns", prefix)) => Ok(QName::namespace_declaration(Some(prefix))),
            Some(_) => self.resolve(prefixed_name),
            None => Ok(QName::local(prefixed_name)),
        }
    }
}

impl Default for NamespaceContext {
    fn default() -> Self {
        Self::new()
    }
}
