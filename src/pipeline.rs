// src/pipeline.rs
//! Document sync: moving whole pages between markdown and a block store.
//!
//! Both directions are thin compositions of the pure converter and the
//! store helpers in [`crate::api`].

use crate::api::{append_tree, clear_children, fetch_block_tree, wire, BlockStore};
use crate::error::AppError;
use crate::formatting::render_document;
use crate::model::Document;
use crate::parsing::parse_document;
use crate::types::PageId;

/// How imported blocks relate to a page's existing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Add after whatever the page already holds.
    #[default]
    Append,
    /// Delete the page's current top-level blocks first.
    Replace,
}

/// What an import did to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportReport {
    /// Top-level blocks parsed from the markdown.
    pub parsed: usize,
    /// Existing blocks removed (replace mode only).
    pub deleted: usize,
    /// Blocks written, nested ones included.
    pub written: usize,
}

/// Fetches a page's full block tree.
pub async fn fetch_document<S>(store: &S, page_id: &PageId) -> Result<Document, AppError>
where
    S: BlockStore + ?Sized,
{
    let blocks = fetch_block_tree(store, &page_id.as_block_id()).await?;
    let document = Document::new(page_id.clone(), blocks);
    log::info!(
        "Fetched {} blocks from page {}",
        document.block_count(),
        page_id
    );
    Ok(document)
}

/// Fetches a page and renders its content as markdown.
pub async fn export_page<S>(store: &S, page_id: &PageId) -> Result<String, AppError>
where
    S: BlockStore + ?Sized,
{
    let document = fetch_document(store, page_id).await?;
    Ok(render_document(&document.blocks))
}

/// Parses `markdown` and writes the blocks into the page.
///
/// Blocks the store would reject are reported before anything is deleted or
/// written.
pub async fn import_markdown<S>(
    store: &S,
    page_id: &PageId,
    markdown: &str,
    mode: ImportMode,
) -> Result<ImportReport, AppError>
where
    S: BlockStore + ?Sized,
{
    let blocks = parse_document(markdown);
    wire::validate_tree(&blocks)?;
    let page_block = page_id.as_block_id();

    let deleted = match mode {
        ImportMode::Replace => clear_children(store, &page_block).await?,
        ImportMode::Append => 0,
    };
    let written = append_tree(store, &page_block, &blocks).await?;

    let report = ImportReport {
        parsed: blocks.len(),
        deleted,
        written,
    };
    log::info!(
        "Imported into page {}: {} blocks written, {} deleted",
        page_id,
        report.written,
        report.deleted
    );
    Ok(report)
}
