//! Limits and constraints for tree processing
//!
//! Sanitation and conversion run on untrusted input. These limits bound
//! recursion depth, the number of nodes a conversion may create and the
//! number of passes the children repair loop may take.

use crate::error::{Error, Result};
use serde::Deserialize;

/// Global limits configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum element nesting depth
    pub max_depth: usize,

    /// Maximum number of repair passes over the children of one element
    pub max_repair_passes: usize,

    /// Maximum number of nodes a single conversion may import, and a
    /// sanitized tree may hold (attributes and detached nodes not counted)
    pub max_nodes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 1000,
            max_repair_passes: 10_000,
            max_nodes: 1_000_000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_depth: 100,
            max_repair_passes: 1000,
            max_nodes: 100_000,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_depth: 10_000,
            max_repair_passes: 100_000,
            max_nodes: 100_000_000,
        }
    }

    /// Check if the nesting depth is within limits
    pub fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            Err(Error::LimitExceeded(format!(
                "nesting depth {} exceeds maximum {}",
                depth, self.max_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the number of repair passes is within limits
    pub fn check_repair_passes(&self, passes: usize) -> Result<()> {
        if passes > self.max_repair_passes {
            Err(Error::LimitExceeded(format!(
                "children repair did not settle after {} passes",
                self.max_repair_passes
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the number of imported nodes is within limits
    pub fn check_nodes(&self, count: usize) -> Result<()> {
        if count > self.max_nodes {
            Err(Error::LimitExceeded(format!(
                "node count {} exceeds maximum {}",
                count, self.max_nodes
            )))
        } else {
            Ok(())
        }
    }
}
