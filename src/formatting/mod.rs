// src/formatting/mod.rs
//! Renders block trees and annotated text back into markdown.

pub mod block_renderer;
mod pure_visitor;
mod rich_text;
mod state;

pub use block_renderer::{render_block, render_document};
pub use rich_text::render_inline;
