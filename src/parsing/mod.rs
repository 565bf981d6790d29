// src/parsing/mod.rs
//! Markdown to block trees.
//!
//! `inline` turns a run of text into annotated spans; the block parser groups
//! lines into blocks and hands their text to `inline`.

mod callouts;
mod document;
pub mod inline;
pub(crate) mod lines;
mod lists;
mod tables;
mod toggles;

pub use callouts::AdmonitionKind;
pub use document::parse_document;
pub use inline::{chunk_plain_text, parse_inline};
pub use lists::parse_list;
