//! Tree converter
//!
//! Walks a source tree and rebuilds it in a target document, letting a
//! [`RuleEngine`] intercept every node:
//!
//! 1. `prepare` on the original node
//! 2. import without children (default namespaces are reconciled)
//! 3. `imported`, which may replace or skip the node
//! 4. children are converted and attached, `appended` runs for each
//! 5. `imported_with_children`, which may replace or skip the node
//!
//! Attribute results are set as attributes of the parent instead of being
//! appended, and fragment results contribute their children. An attribute
//! result below a fragment has no element to go to and is dropped.
//!
//! The walk keeps open nodes on an explicit stack, so deep input is bounded
//! by [`Limits::max_depth`] only.

use super::context::ConversionContext;
use super::engine::RuleEngine;
use crate::documents::{Document, NodeId};
use crate::error::{Error, Result};
use crate::limits::Limits;
use std::collections::HashMap;
use tracing::debug;

/// Rule-driven converter between two documents
#[derive(Debug, Clone)]
pub struct TreeConverter<'e> {
    engine: &'e RuleEngine,
    limits: Limits,
}

/// State of one top-level conversion
#[derive(Debug, Default)]
struct Run {
    /// Counterparts of source nodes whose conversion is in progress
    imported: HashMap<NodeId, NodeId>,
    /// Nodes imported so far
    count: usize,
}

impl<'e> TreeConverter<'e> {
    /// Create a converter dispatching to `engine`
    pub fn new(engine: &'e RuleEngine) -> Self {
        Self {
            engine,
            limits: Limits::default(),
        }
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Convert a source node and its subtree into `target`
    ///
    /// Returns the resulting detached node, or `None` when a rule skipped
    /// the node.
    pub fn convert(
        &self,
        source: &mut Document,
        node: NodeId,
        target: &mut Document,
    ) -> Result<Option<NodeId>> {
        let mut run = Run::default();
        let result = self.convert_tree(source, node, target, &mut run, 0);
        debug!(
            direction = %self.engine.direction(),
            imported = run.count,
            "conversion finished"
        );
        result
    }

    /// Convert the children of a source node and append them to `parent`
    pub fn convert_children(
        &self,
        source: &mut Document,
        node: NodeId,
        target: &mut Document,
        parent: NodeId,
    ) -> Result<()> {
        if !target.can_have_children(parent) {
            return Err(Error::Tree(format!("{} cannot have children", parent)));
        }
        let mut run = Run::default();
        for child in source.children(node).to_vec() {
            if let Some(converted) = self.convert_tree(source, child, target, &mut run, 1)? {
                self.attach(source, child, target, parent, converted, &run)?;
            }
        }
        debug!(
            direction = %self.engine.direction(),
            imported = run.count,
            "conversion finished"
        );
        Ok(())
    }

    /// Depth-first conversion driven by an explicit stack of open nodes
    fn convert_tree(
        &self,
        source: &mut Document,
        node: NodeId,
        target: &mut Document,
        run: &mut Run,
        depth: usize,
    ) -> Result<Option<NodeId>> {
        let Some(first) = self.enter(source, node, target, run, depth)? else {
            return Ok(None);
        };
        let mut open = vec![first];
        while let Some(top) = open.last_mut() {
            if let Some(child) = top.children.next() {
                let depth = top.depth + 1;
                if let Some(frame) = self.enter(source, child, target, run, depth)? {
                    open.push(frame);
                }
                continue;
            }
            let Some(done) = open.pop() else {
                break;
            };
            let converted = self.leave(source, &done, target, run)?;
            match (open.last(), converted) {
                (Some(parent), Some(converted)) => {
                    self.attach(source, done.node, target, parent.current, converted, run)?;
                }
                (Some(_), None) => {}
                (None, converted) => return Ok(converted),
            }
        }
        Ok(None)
    }

    /// Prepare and import a node, then run the `imported` stage
    ///
    /// Returns `None` when a rule skipped the node.
    fn enter(
        &self,
        source: &mut Document,
        node: NodeId,
        target: &mut Document,
        run: &mut Run,
        depth: usize,
    ) -> Result<Option<Frame>> {
        self.limits.check_depth(depth)?;
        self.engine.prepare(source, node)?;

        let imported = match run.imported.get(&node) {
            Some(existing) => *existing,
            None => {
                run.count += 1;
                self.limits.check_nodes(run.count)?;
                target.import_node(source, node)?
            }
        };
        run.imported.insert(node, imported);

        let current = {
            let mut ctx = ConversionContext::new(
                self.engine.direction(),
                source,
                node,
                target,
                &run.imported,
            );
            self.engine.imported(imported, &mut ctx)?
        };
        let Some(current) = current else {
            run.imported.remove(&node);
            return Ok(None);
        };

        let children = if source.can_have_children(node) && target.can_have_children(current) {
            source.children(node).to_vec()
        } else {
            Vec::new()
        };
        Ok(Some(Frame {
            node,
            current,
            depth,
            children: children.into_iter(),
        }))
    }

    /// Run the `imported_with_children` stage once all children are attached
    fn leave(
        &self,
        source: &mut Document,
        frame: &Frame,
        target: &mut Document,
        run: &mut Run,
    ) -> Result<Option<NodeId>> {
        let result = {
            let mut ctx = ConversionContext::new(
                self.engine.direction(),
                source,
                frame.node,
                target,
                &run.imported,
            );
            self.engine.imported_with_children(frame.current, &mut ctx)
        };
        run.imported.remove(&frame.node);
        result
    }

    /// Attach a converted child and run the `appended` stages
    fn attach(
        &self,
        source: &Document,
        source_child: NodeId,
        target: &mut Document,
        parent: NodeId,
        child: NodeId,
        run: &Run,
    ) -> Result<()> {
        let attached = if target.attribute(child).is_some() {
            // Fragments hand over their children, never attributes
            if target.element(parent).is_none() {
                debug!(attribute = %child, parent = %parent, "dropping attribute outside an element");
                return Ok(());
            }
            target.set_attribute_node(parent, child)?;
            vec![child]
        } else {
            target.append_child(parent, child)?
        };
        let mut ctx = ConversionContext::new(
            self.engine.direction(),
            source,
            source_child,
            target,
            &run.imported,
        );
        for node in attached {
            self.engine.appended(parent, node, &mut ctx)?;
        }
        Ok(())
    }
}

/// A converted node whose children are still being converted
#[derive(Debug)]
struct Frame {
    /// Source node
    node: NodeId,
    /// Its counterpart in the target
    current: NodeId,
    depth: usize,
    children: std::vec::IntoIter<NodeId>,
}
