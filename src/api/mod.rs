// src/api/mod.rs
//! Notion API interaction: reading and writing block trees in a workspace.
//!
//! Business logic depends on the [`BlockStore`] trait, never on HTTP details.
//! [`NotionHttpClient`] is the production implementation.

pub mod client;
mod fetcher;
mod pagination;
pub mod responses;
mod throttle;
mod uploader;
pub mod wire;

use crate::error::AppError;
use crate::model::{Block, Page, Parent, PropertyPatches};
use crate::types::{BlockId, PageId};

/// The ability to read and write blocks in a Notion workspace.
#[async_trait::async_trait]
pub trait BlockStore: Send + Sync {
    /// One page of a block's direct children.
    async fn fetch_children(
        &self,
        block_id: &BlockId,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<BlockChildren, AppError>;

    /// Appends blocks (without their children) under `block_id`.
    ///
    /// Sent in batches of at most 100; returns the created ids in order.
    async fn append_children(
        &self,
        block_id: &BlockId,
        blocks: &[Block],
    ) -> Result<Vec<BlockId>, AppError>;

    /// Replaces a block's own content; its children are untouched.
    async fn update_block(&self, block_id: &BlockId, patch: &Block) -> Result<(), AppError>;

    async fn delete_block(&self, block_id: &BlockId) -> Result<(), AppError>;

    async fn retrieve_page(&self, page_id: &PageId) -> Result<Page, AppError>;

    /// Creates a page under `parent` holding `blocks`.
    async fn create_page(
        &self,
        parent: &Parent,
        title: &str,
        blocks: &[Block],
    ) -> Result<Page, AppError>;

    /// Writes property values; invalid values are rejected before any request.
    async fn update_page_properties(
        &self,
        page_id: &PageId,
        properties: &PropertyPatches,
    ) -> Result<(), AppError>;

    /// Pages whose title matches `query`, across all result pages.
    async fn search(&self, query: &str) -> Result<Vec<Page>, AppError>;
}

pub use client::NotionHttpClient;
pub use fetcher::{fetch_all_children, fetch_block_tree};
pub use pagination::collect_all_pages;
pub use responses::{BlockChildren, ChildRecord, PaginatedResponse};
pub use throttle::RequestThrottle;
pub use uploader::{append_tree, clear_children};
