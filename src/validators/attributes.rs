//! Attribute definitions
//!
//! An [`AttributeDefinition`] is the fully resolved form of an
//! [`AttributeSpec`]: the qualified name from the declarative grammar is
//! split into prefix and local name, and the prefix is resolved against the
//! grammar's known prefixes. Unprefixed attributes belong to the grammar's
//! default namespace; in instances they appear unqualified.

use super::base::{InvalidValueAction, Strictness};
use super::facets::ContentValidator;
use crate::error::SchemaError;
use crate::names::{is_valid_qname, split_qname};
use crate::namespaces::QName;
use indexmap::IndexMap;
use serde::Deserialize;

/// How an attribute with an invalid value is repaired
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidValuePolicy {
    /// Remove the attribute, keep it under [`Strictness::Legacy`]
    #[default]
    Default,
    /// Replace the value, keep it under [`Strictness::Legacy`]
    ReplaceWith(String),
}

impl InvalidValuePolicy {
    /// Decide the repair for the given strictness
    pub fn action(&self, strictness: Strictness) -> InvalidValueAction {
        if strictness >= Strictness::Legacy {
            return InvalidValueAction::Keep;
        }
        match self {
            InvalidValuePolicy::Default => InvalidValueAction::Remove,
            InvalidValuePolicy::ReplaceWith(value) => InvalidValueAction::Replace(value.clone()),
        }
    }
}

/// Declarative attribute description, as found in a grammar configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttributeSpec {
    /// Qualified attribute name, e.g. `class` or `xlink:href`
    pub name: String,
    /// Content type of the value
    #[serde(default = "default_validator")]
    pub validator: ContentValidator,
    /// Default value injected when the attribute is missing
    #[serde(default)]
    pub required: Option<String>,
    /// Single legal value
    #[serde(default)]
    pub fixed: Option<String>,
    /// Repair of invalid values
    #[serde(default)]
    pub on_invalid: InvalidValuePolicy,
}

fn default_validator() -> ContentValidator {
    ContentValidator::Any
}

impl AttributeSpec {
    /// Create a spec with the given name and validator
    pub fn new(name: impl Into<String>, validator: ContentValidator) -> Self {
        Self {
            name: name.into(),
            validator,
            required: None,
            fixed: None,
            on_invalid: InvalidValuePolicy::Default,
        }
    }

    /// Mark the attribute as required with a default value
    pub fn required(mut self, default: impl Into<String>) -> Self {
        self.required = Some(default.into());
        self
    }

    /// Give the attribute a fixed value
    pub fn fixed(mut self, value: impl Into<String>) -> Self {
        self.fixed = Some(value.into());
        self
    }

    /// Replace invalid values instead of removing the attribute
    pub fn replace_invalid_with(mut self, value: impl Into<String>) -> Self {
        self.on_invalid = InvalidValuePolicy::ReplaceWith(value.into());
        self
    }

    /// Resolve the spec against the grammar's known prefixes
    pub fn resolve(
        &self,
        default_namespace: Option<&str>,
        prefixes: &IndexMap<String, String>,
    ) -> Result<AttributeDefinition, SchemaError> {
        if !is_valid_qname(&self.name) {
            return Err(SchemaError::new("invalid attribute name").with_attribute(&self.name));
        }
        let (prefix, local_name) = split_qname(&self.name);
        let namespace = match prefix {
            Some(prefix) => Some(prefixes.get(prefix).cloned().ok_or_else(|| {
                SchemaError::new(format!("unknown namespace prefix '{}'", prefix))
                    .with_attribute(&self.name)
            })?),
            None => default_namespace.map(str::to_string),
        };
        if let (Some(fixed), Some(required)) = (&self.fixed, &self.required) {
            if fixed != required {
                return Err(SchemaError::new(format!(
                    "required default '{}' differs from fixed value '{}'",
                    required, fixed
                ))
                .with_attribute(&self.name));
            }
        }
        Ok(self.definition(QName {
            namespace,
            prefix: prefix.map(str::to_string),
            local_name: local_name.to_string(),
        }))
    }

    /// Definition under an already resolved name
    pub(crate) fn definition(&self, name: QName) -> AttributeDefinition {
        AttributeDefinition {
            name,
            required: self.required.clone(),
            fixed: self.fixed.clone(),
            validator: self.validator.clone(),
            on_invalid: self.on_invalid.clone(),
        }
    }
}

/// Resolved attribute definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDefinition {
    /// Namespace, prefix and local name
    pub name: QName,
    /// Default injected when missing
    pub required: Option<String>,
    /// Single legal value, stripped when present
    pub fixed: Option<String>,
    /// Content type
    pub validator: ContentValidator,
    /// Repair of invalid values
    pub on_invalid: InvalidValuePolicy,
}

impl AttributeDefinition {
    /// Local name
    pub fn local_name(&self) -> &str {
        &self.name.local_name
    }

    /// Namespace URI
    pub fn namespace(&self) -> Option<&str> {
        self.name.namespace.as_deref()
    }

    /// Name to give the attribute when it is injected into an instance
    ///
    /// Unprefixed attributes are written unqualified.
    pub fn instance_name(&self) -> QName {
        match self.name.prefix {
            Some(_) => self.name.clone(),
            None => QName::local(self.name.local_name.clone()),
        }
    }

    /// Whether `value` is exactly the fixed value
    pub fn is_fixed_value(&self, value: &str) -> bool {
        self.fixed.as_deref() == Some(value)
    }

    /// Validate a value
    ///
    /// A fixed attribute only accepts its fixed value.
    pub fn is_valid(&self, value: &str, strictness: Strictness) -> bool {
        match &self.fixed {
            Some(fixed) => fixed == value,
            None => self.validator.is_valid(value, strictness),
        }
    }
}
