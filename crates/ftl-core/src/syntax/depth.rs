//! Nesting depth accounting
//!
//! The parser, the serializer, the AST traversal and the resolver all bound
//! placeable nesting with the same explicit counter instead of relying on the
//! native call stack. A [`DepthGuard`] is a small `Copy` value: entering a
//! nested level produces a new guard, so the depth of the caller is never
//! mutated and unwinding needs no bookkeeping.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default nesting limit shared by every layer of the engine.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Raised when a nested construct would exceed the configured limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("maximum nesting depth of {max_depth} exceeded")]
pub struct DepthExceeded {
    pub max_depth: usize,
}

/// Immutable depth counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthGuard {
    depth: usize,
    max_depth: usize,
}

impl DepthGuard {
    pub fn new(max_depth: usize) -> Self {
        Self {
            depth: 0,
            max_depth,
        }
    }

    /// Current nesting level (0 at the top).
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Enter one nested level.
    pub fn enter(self) -> Result<Self, DepthExceeded> {
        if self.depth >= self.max_depth {
            return Err(DepthExceeded {
                max_depth: self.max_depth,
            });
        }
        Ok(Self {
            depth: self.depth + 1,
            max_depth: self.max_depth,
        })
    }
}

impl Default for DepthGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_increments_without_touching_parent() {
        let root = DepthGuard::new(2);
        let child = root.enter().unwrap();
        assert_eq!(root.depth(), 0);
        assert_eq!(child.depth(), 1);
    }

    #[test]
    fn test_enter_past_limit_fails() {
        let guard = DepthGuard::new(2).enter().unwrap().enter().unwrap();
        assert_eq!(guard.enter(), Err(DepthExceeded { max_depth: 2 }));
    }

    #[test]
    fn test_zero_limit_rejects_first_level() {
        assert!(DepthGuard::new(0).enter().is_err());
    }
}
