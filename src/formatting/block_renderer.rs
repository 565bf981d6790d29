// src/formatting/block_renderer.rs
//! Block rendering entry points: block trees to markdown.
//!
//! Rendering never fails. Anything the dialect cannot express is either
//! dropped (underline, colors) or written as an HTML comment.

use super::pure_visitor::{BlockRenderer, MarkdownBlockRenderer};
use super::state::FormatContext;
use crate::constants::CHARS_PER_BLOCK_ESTIMATE;
use crate::model::Block;

/// Renders a whole document; the output ends with a single newline.
///
/// Consecutive list items are written without blank lines between them and
/// every other pair of neighbouring blocks is separated by exactly one blank
/// line.
pub fn render_document(blocks: &[Block]) -> String {
    log::debug!("Rendering {} top-level blocks", blocks.len());

    let mut output = String::with_capacity(blocks.len() * CHARS_PER_BLOCK_ESTIMATE);
    output.push_str(&MarkdownBlockRenderer.render_children(blocks, FormatContext::new()));
    if !output.is_empty() {
        output.push('\n');
    }
    output
}

/// Renders one block and its children, every line indented by `indent` spaces.
pub fn render_block(block: &Block, indent: usize) -> String {
    MarkdownBlockRenderer.render_block(block, FormatContext::at_indent(indent))
}
