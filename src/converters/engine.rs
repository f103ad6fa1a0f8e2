//! Ordered dispatch of rule sections
//!
//! A [`RuleEngine`] serves one conversion direction. Assigning rules
//! resolves default ids and priorities and sorts the sections by descending
//! priority; ties keep their insertion order.

use super::base::{priority, ConversionRule, Direction, ImportedFn, Outcome, RuleSection};
use super::context::ConversionContext;
use crate::documents::{Document, NodeId};
use crate::error::Result;
use tracing::trace;

/// Priority-sorted rule sections for one direction
#[derive(Debug, Clone)]
pub struct RuleEngine {
    direction: Direction,
    sections: Vec<RuleSection>,
    assigned: usize,
}

impl RuleEngine {
    /// Create an engine without rules
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            sections: Vec::new(),
            assigned: 0,
        }
    }

    /// Create an engine with the given rules
    pub fn with_rules(direction: Direction, rules: impl IntoIterator<Item = ConversionRule>) -> Self {
        let mut engine = Self::new(direction);
        engine.add_rules(rules);
        engine
    }

    /// Replace all rules
    pub fn set_rules(&mut self, rules: impl IntoIterator<Item = ConversionRule>) {
        self.sections.clear();
        self.assigned = 0;
        self.add_rules(rules);
    }

    /// Add rules and re-sort
    ///
    /// Rules without a section for this engine's direction are ignored, but
    /// still count for default ids, so both engines name a rule alike.
    pub fn add_rules(&mut self, rules: impl IntoIterator<Item = ConversionRule>) {
        for rule in rules {
            let rule_id = rule
                .id
                .clone()
                .unwrap_or_else(|| format!("rule-{}", self.assigned));
            self.assigned += 1;
            let rule_priority = rule.priority.unwrap_or(priority::NORMAL);
            let section = match self.direction {
                Direction::ToData => rule.to_data,
                Direction::ToView => rule.to_view,
            };
            if let Some(mut section) = section {
                section.id.get_or_insert(rule_id);
                section.priority.get_or_insert(rule_priority);
                self.sections.push(section);
            }
        }
        // stable, equal priorities keep insertion order
        self.sections
            .sort_by_key(|s| std::cmp::Reverse(s.priority.unwrap_or(priority::NORMAL)));
    }

    /// Direction served by this engine
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Sections in dispatch order
    pub fn sections(&self) -> &[RuleSection] {
        &self.sections
    }

    /// Section ids in dispatch order
    pub fn ids(&self) -> Vec<&str> {
        self.sections.iter().filter_map(|s| s.get_id()).collect()
    }

    /// Number of sections
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Check if the engine has no sections
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Run every `prepare` stage on an original node
    pub fn prepare(&self, document: &mut Document, node: NodeId) -> Result<()> {
        for section in &self.sections {
            if let Some(prepare) = &section.prepare {
                prepare(&mut *document, node)?;
            }
        }
        Ok(())
    }

    /// Run the `imported` stages; `None` when a rule skipped the node
    pub fn imported(&self, node: NodeId, ctx: &mut ConversionContext<'_>) -> Result<Option<NodeId>> {
        self.chain(node, ctx, |s| s.imported.as_ref(), "imported")
    }

    /// Run the `imported_with_children` stages; `None` when a rule skipped the node
    pub fn imported_with_children(
        &self,
        node: NodeId,
        ctx: &mut ConversionContext<'_>,
    ) -> Result<Option<NodeId>> {
        self.chain(
            node,
            ctx,
            |s| s.imported_with_children.as_ref(),
            "importedWithChildren",
        )
    }

    /// Run every `appended` stage for a freshly attached child
    pub fn appended(
        &self,
        parent: NodeId,
        child: NodeId,
        ctx: &mut ConversionContext<'_>,
    ) -> Result<()> {
        for section in &self.sections {
            if let Some(appended) = &section.appended {
                appended(parent, child, &mut *ctx)?;
            }
        }
        Ok(())
    }

    fn chain<'s, F>(
        &'s self,
        node: NodeId,
        ctx: &mut ConversionContext<'_>,
        stage: F,
        stage_name: &str,
    ) -> Result<Option<NodeId>>
    where
        F: Fn(&'s RuleSection) -> Option<&'s ImportedFn>,
    {
        let mut current = node;
        for section in &self.sections {
            let Some(f) = stage(section) else {
                continue;
            };
            match f(current, &mut *ctx)? {
                Outcome::Unchanged => {}
                Outcome::Replace(replacement) => {
                    trace!(
                        rule = section.get_id().unwrap_or_default(),
                        stage = stage_name,
                        from = %current,
                        to = %replacement,
                        "node replaced"
                    );
                    current = replacement;
                }
                Outcome::Skip => {
                    trace!(
                        rule = section.get_id().unwrap_or_default(),
                        stage = stage_name,
                        node = %current,
                        "node skipped"
                    );
                    return Ok(None);
                }
            }
        }
        Ok(Some(current))
    }
}
