// src/formatting/state.rs
//! Immutable formatting state with pure transitions for markdown generation.

use crate::constants::BLOCK_MAX_RENDER_DEPTH;

/// Where in the tree a block is being rendered.
///
/// Transitions return new values; a context is never mutated in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatContext {
    /// Columns of leading whitespace for every line of the block.
    indent: usize,
    /// Nesting depth of the block being rendered.
    depth: usize,
}

impl FormatContext {
    /// Creates a new, empty formatting context.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at_indent(indent: usize) -> Self {
        Self { indent, depth: 0 }
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn indent_str(&self) -> String {
        " ".repeat(self.indent)
    }

    /// Checks if the recursion depth limit has been reached.
    pub fn depth_limit_reached(&self) -> bool {
        self.depth >= BLOCK_MAX_RENDER_DEPTH
    }

    /// Context for the children of the current block.
    pub fn enter_children(&self, extra_indent: usize) -> Self {
        Self {
            indent: self.indent + extra_indent,
            depth: self.depth + 1,
        }
    }
}
