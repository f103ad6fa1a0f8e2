//! Conversion rule types
//!
//! A [`ConversionRule`] bundles up to two [`RuleSection`]s, one per
//! [`Direction`]. A section holds up to four stage functions which the
//! [`RuleEngine`](super::RuleEngine) calls while a node is converted.

use super::context::ConversionContext;
use crate::documents::{Document, NodeId};
use crate::error::Result;
use std::fmt;
use std::sync::Arc;

/// Rule priorities; higher priorities run first
pub mod priority {
    /// Runs before everything else
    pub const HIGHEST: i32 = 100_000;
    /// Runs before normal rules
    pub const HIGH: i32 = 1000;
    /// Default priority
    pub const NORMAL: i32 = 0;
    /// Runs after normal rules
    pub const LOW: i32 = -1000;
    /// Runs after everything else
    pub const LOWEST: i32 = -100_000;
}

/// Conversion direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Editing markup to stored RichText
    ToData,
    /// Stored RichText to editing markup
    ToView,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ToData => write!(f, "toData"),
            Direction::ToView => write!(f, "toView"),
        }
    }
}

/// Result of an `imported` or `imported_with_children` stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep the current node
    Unchanged,
    /// Continue with another node, typically a new element or a fragment
    Replace(NodeId),
    /// Drop the node and its whole subtree, skipping all further rules
    Skip,
}

/// Mutates an original node before it is imported; must not move it
pub type PrepareFn = Arc<dyn Fn(&mut Document, NodeId) -> Result<()> + Send + Sync>;

/// Inspects or replaces an imported node
pub type ImportedFn =
    Arc<dyn Fn(NodeId, &mut ConversionContext<'_>) -> Result<Outcome> + Send + Sync>;

/// Observes a child right after it was attached to its parent
pub type AppendedFn =
    Arc<dyn Fn(NodeId, NodeId, &mut ConversionContext<'_>) -> Result<()> + Send + Sync>;

/// Stage functions of a rule for one direction
#[derive(Clone, Default)]
pub struct RuleSection {
    pub(crate) id: Option<String>,
    pub(crate) priority: Option<i32>,
    pub(crate) prepare: Option<PrepareFn>,
    pub(crate) imported: Option<ImportedFn>,
    pub(crate) imported_with_children: Option<ImportedFn>,
    pub(crate) appended: Option<AppendedFn>,
}

impl RuleSection {
    /// Create a section without stages
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the id; defaults to the rule's id
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the priority; defaults to the rule's priority
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the `prepare` stage
    pub fn on_prepare<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Document, NodeId) -> Result<()> + Send + Sync + 'static,
    {
        self.prepare = Some(Arc::new(f));
        self
    }

    /// Set the `imported` stage
    pub fn on_imported<F>(mut self, f: F) -> Self
    where
        F: Fn(NodeId, &mut ConversionContext<'_>) -> Result<Outcome> + Send + Sync + 'static,
    {
        self.imported = Some(Arc::new(f));
        self
    }

    /// Set the `imported_with_children` stage
    pub fn on_imported_with_children<F>(mut self, f: F) -> Self
    where
        F: Fn(NodeId, &mut ConversionContext<'_>) -> Result<Outcome> + Send + Sync + 'static,
    {
        self.imported_with_children = Some(Arc::new(f));
        self
    }

    /// Set the `appended` stage
    pub fn on_appended<F>(mut self, f: F) -> Self
    where
        F: Fn(NodeId, NodeId, &mut ConversionContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.appended = Some(Arc::new(f));
        self
    }

    /// Id, once resolved by the engine
    pub fn get_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Priority, once resolved by the engine
    pub fn get_priority(&self) -> Option<i32> {
        self.priority
    }

    /// Check if no stage is set
    pub fn is_empty(&self) -> bool {
        self.prepare.is_none()
            && self.imported.is_none()
            && self.imported_with_children.is_none()
            && self.appended.is_none()
    }
}

impl fmt::Debug for RuleSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stages = Vec::new();
        if self.prepare.is_some() {
            stages.push("prepare");
        }
        if self.imported.is_some() {
            stages.push("imported");
        }
        if self.imported_with_children.is_some() {
            stages.push("importedWithChildren");
        }
        if self.appended.is_some() {
            stages.push("appended");
        }
        f.debug_struct("RuleSection")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("stages", &stages)
            .finish()
    }
}

/// A named, prioritized pair of rule sections
#[derive(Debug, Clone, Default)]
pub struct ConversionRule {
    pub(crate) id: Option<String>,
    pub(crate) priority: Option<i32>,
    pub(crate) to_data: Option<RuleSection>,
    pub(crate) to_view: Option<RuleSection>,
}

impl ConversionRule {
    /// Create an empty rule
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the id; the engine assigns `rule-<n>` otherwise
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the priority; defaults to [`priority::NORMAL`]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Section converting editing markup to RichText
    pub fn to_data(mut self, section: RuleSection) -> Self {
        self.to_data = Some(section);
        self
    }

    /// Section converting RichText to editing markup
    pub fn to_view(mut self, section: RuleSection) -> Self {
        self.to_view = Some(section);
        self
    }

    /// Section for a direction
    pub fn section(&self, direction: Direction) -> Option<&RuleSection> {
        match direction {
            Direction::ToData => self.to_data.as_ref(),
            Direction::ToView => self.to_view.as_ref(),
        }
    }

    /// Rule id, if set
    pub fn get_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_builder() {
        let section = RuleSection::new()
            .id("bold")
            .priority(priority::HIGH)
            .on_imported(|_, _| Ok(Outcome::Unchanged));
        assert_eq!(section.get_id(), Some("bold"));
        assert_eq!(section.get_priority(), Some(priority::HIGH));
        assert!(!section.is_empty());
        assert!(RuleSection::new().is_empty());
    }

    #[test]
    fn test_section_debug_lists_stages() {
        let section = RuleSection::new()
            .on_prepare(|_, _| Ok(()))
            .on_appended(|_, _, _| Ok(()));
        let debug = format!("{:?}", section);
        assert!(debug.contains("prepare"));
        assert!(debug.contains("appended"));
        assert!(!debug.contains("importedWithChildren"));
    }

    #[test]
    fn test_rule_sections_by_direction() {
        let rule = ConversionRule::new()
            .id("headings")
            .to_data(RuleSection::new().id("h-to-p"));
        assert_eq!(rule.get_id(), Some("headings"));
        assert_eq!(
            rule.section(Direction::ToData).and_then(|s| s.get_id()),
            Some("h-to-p")
        );
        assert!(rule.section(Direction::ToView).is_none());
    }

    #[test]
    fn test_priority_order() {
        assert!(priority::HIGHEST > priority::HIGH);
        assert!(priority::HIGH > priority::NORMAL);
        assert!(priority::NORMAL > priority::LOW);
        assert!(priority::LOW > priority::LOWEST);
    }
}
