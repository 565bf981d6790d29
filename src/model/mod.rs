mod block;
pub mod blocks;
pub mod common;
pub mod properties;

pub use block::Block;
pub use blocks::*;
pub use common::*;
pub use properties::{parse_property_patches, PropertyPatch, PropertyPatches};

use crate::types::{DatabaseId, PageId};
use serde::{Deserialize, Serialize};

/// A page's content held in memory for the duration of one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub page_id: PageId,
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(page_id: PageId, blocks: Vec<Block>) -> Self {
        Self { page_id, blocks }
    }

    /// Total number of blocks in the tree, children included.
    pub fn block_count(&self) -> usize {
        fn count(blocks: &[Block]) -> usize {
            blocks.iter().map(|b| 1 + count(b.children())).sum()
        }
        count(&self.blocks)
    }
}

/// Page metadata as returned by the store; content is fetched separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub title: PageTitle,
    pub url: String,
    pub archived: bool,
}

/// Page title
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageTitle(String);

impl PageTitle {
    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PageTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a new page is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Parent {
    #[serde(rename = "page_id")]
    Page { page_id: PageId },
    #[serde(rename = "database_id")]
    Database { database_id: DatabaseId },
}
