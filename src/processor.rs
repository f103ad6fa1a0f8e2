//! Data processor
//!
//! [`RichTextDataProcessor`] ties the pieces together: editing markup is
//! converted to RichText by the `toData` rules and then sanitized, stored
//! RichText is converted back by the `toView` rules.

use crate::config::ProcessorConfig;
use crate::converters::{standard, ConversionRule, Direction, RuleEngine, TreeConverter};
use crate::documents::Document;
use crate::error::{Error, Result};
use crate::richtext;
use crate::validators::{SanitationListener, Sanitizer, SchemaRegistry, TracingListener};
use crate::{RICHTEXT_NAMESPACE, XHTML_NAMESPACE};
use tracing::debug;

/// Converts between editing markup and sanitized RichText
#[derive(Debug, Clone)]
pub struct RichTextDataProcessor {
    schema: SchemaRegistry,
    config: ProcessorConfig,
    to_data: RuleEngine,
    to_view: RuleEngine,
}

impl RichTextDataProcessor {
    /// Create a processor
    ///
    /// Uses the grammar of the configuration if it has one, the built-in
    /// RichText grammar otherwise.
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        let schema = match config.grammar() {
            Some(grammar) => SchemaRegistry::from_config(grammar.clone())?,
            None => SchemaRegistry::richtext(),
        };
        Ok(Self::with_schema(schema, config))
    }

    /// Create a processor for an explicit grammar
    pub fn with_schema(schema: SchemaRegistry, config: ProcessorConfig) -> Self {
        let mut processor = Self {
            schema,
            config,
            to_data: RuleEngine::new(Direction::ToData),
            to_view: RuleEngine::new(Direction::ToView),
        };
        if processor.config.standard_rules() {
            processor.add_rules(standard::rules());
        }
        processor
    }

    /// Add rules to both directions
    pub fn add_rules(&mut self, rules: impl IntoIterator<Item = ConversionRule>) {
        let rules: Vec<ConversionRule> = rules.into_iter().collect();
        self.to_data.add_rules(rules.iter().cloned());
        self.to_view.add_rules(rules);
        debug!(
            to_data = self.to_data.len(),
            to_view = self.to_view.len(),
            "conversion rules installed"
        );
    }

    /// The grammar
    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    /// The configuration
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Rules converting to RichText
    pub fn to_data_rules(&self) -> &RuleEngine {
        &self.to_data
    }

    /// Rules converting to editing markup
    pub fn to_view_rules(&self) -> &RuleEngine {
        &self.to_view
    }

    /// A sanitizer configured for this processor
    pub fn sanitizer(&self) -> Sanitizer<'_> {
        Sanitizer::new(&self.schema)
            .with_strictness(self.config.strictness())
            .with_limits(self.config.limits().clone())
    }

    /// Sanitize a stored document in place
    pub fn sanitize(
        &self,
        document: &mut Document,
        listener: &mut dyn SanitationListener,
    ) -> Result<()> {
        self.sanitizer().sanitize(document, listener)
    }

    /// Convert editing markup to RichText, logging repairs
    pub fn to_data(&self, markup: &str) -> Result<Document> {
        self.to_data_with(markup, &mut TracingListener)
    }

    /// Convert editing markup to RichText, reporting repairs to `listener`
    pub fn to_data_with(
        &self,
        markup: &str,
        listener: &mut dyn SanitationListener,
    ) -> Result<Document> {
        let mut source = Document::parse_fragment(markup, XHTML_NAMESPACE)?;
        let source_root = source
            .root()
            .ok_or_else(|| Error::Tree("fragment has no container".to_string()))?;
        let mut target = self.new_data_document();
        let root = target
            .root()
            .ok_or_else(|| Error::Tree("data document has no root".to_string()))?;

        TreeConverter::new(&self.to_data)
            .with_limits(self.config.limits().clone())
            .convert_children(&mut source, source_root, &mut target, root)?;
        self.sanitize(&mut target, listener)?;
        Ok(target)
    }

    /// Convert editing markup to serialized RichText
    pub fn to_data_string(&self, markup: &str) -> Result<String> {
        Ok(self.to_data(markup)?.to_xml())
    }

    /// Convert stored RichText to an editing document
    ///
    /// The returned document element is a `div` in the XHTML namespace
    /// whose children are the converted content.
    pub fn to_view(&self, data: &str) -> Result<Document> {
        let mut source = Document::parse(data)?;
        let source_root = source
            .root()
            .ok_or_else(|| Error::Tree("data document has no root".to_string()))?;
        let expected = self.schema.root_name();
        let is_data_root = source.element(source_root).map_or(false, |e| {
            e.name.prefix.is_none()
                && e.name.matches(self.schema.default_namespace(), expected.as_str())
        });
        if !is_data_root {
            let found = source
                .name(source_root)
                .map(ToString::to_string)
                .unwrap_or_default();
            return Err(Error::Namespace(format!(
                "expected <{}> in namespace {} as document element, found {}",
                expected,
                self.schema.default_namespace().unwrap_or("(none)"),
                found
            )));
        }
        let mut target = Document::with_root(Some(XHTML_NAMESPACE), "div");
        let root = target
            .root()
            .ok_or_else(|| Error::Tree("view document has no root".to_string()))?;

        TreeConverter::new(&self.to_view)
            .with_limits(self.config.limits().clone())
            .convert_children(&mut source, source_root, &mut target, root)?;
        Ok(target)
    }

    /// Convert stored RichText to editing markup
    pub fn to_view_string(&self, data: &str) -> Result<String> {
        let view = self.to_view(data)?;
        Ok(view.root().map(|root| view.inner_xml(root)).unwrap_or_default())
    }

    /// Empty document of this processor's grammar
    fn new_data_document(&self) -> Document {
        let root = self.schema.root_name();
        if self.schema.default_namespace() == Some(RICHTEXT_NAMESPACE)
            && root.as_str() == richtext::ROOT_ELEMENT
        {
            richtext::new_document()
        } else {
            Document::with_root(self.schema.default_namespace(), root.as_str())
        }
    }
}

impl Default for RichTextDataProcessor {
    fn default() -> Self {
        Self::with_schema(SchemaRegistry::richtext(), ProcessorConfig::default())
    }
}
