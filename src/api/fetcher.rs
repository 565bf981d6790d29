// src/api/fetcher.rs
//! Recursive block tree fetching.

use super::pagination::collect_all_pages;
use super::{BlockStore, ChildRecord};
use crate::constants::{NOTION_API_PAGE_SIZE, NOTION_MAX_FETCH_DEPTH};
use crate::error::AppError;
use crate::model::{Block, TableRow};
use crate::types::BlockId;
use futures::future::BoxFuture;

/// Every direct child record of `parent`, across all result pages.
pub async fn fetch_all_children<S>(store: &S, parent: &BlockId) -> Result<Vec<ChildRecord>, AppError>
where
    S: BlockStore + ?Sized,
{
    collect_all_pages(|cursor| async move {
        store
            .fetch_children(parent, NOTION_API_PAGE_SIZE, cursor.as_deref())
            .await
    })
    .await
}

/// Fetches the children of `root` and, recursively, theirs.
///
/// Tables get their rows filled in. Blocks nested deeper than the fetch
/// depth limit are kept but left without children, with a warning.
pub async fn fetch_block_tree<S>(store: &S, root: &BlockId) -> Result<Vec<Block>, AppError>
where
    S: BlockStore + ?Sized,
{
    fetch_level(store, root.clone(), 0).await
}

fn fetch_level<'a, S>(
    store: &'a S,
    parent: BlockId,
    depth: usize,
) -> BoxFuture<'a, Result<Vec<Block>, AppError>>
where
    S: BlockStore + ?Sized,
{
    Box::pin(async move {
        let records = fetch_all_children(store, &parent).await?;
        let mut blocks = Vec::with_capacity(records.len());

        for record in records {
            let (mut block, has_children) = match record {
                ChildRecord::Block {
                    block,
                    has_children,
                } => (block, has_children),
                ChildRecord::TableRow(_) => {
                    log::debug!("Skipping table row outside a table under {}", parent);
                    continue;
                }
            };

            if has_children {
                if let Some(id) = block.id().cloned() {
                    if let Block::Table(table) = &mut block {
                        table.rows = fetch_table_rows(store, &id).await?;
                    } else if depth + 1 >= NOTION_MAX_FETCH_DEPTH {
                        log::warn!(
                            "Fetch depth limit ({}) reached; children of {} block {} not fetched",
                            NOTION_MAX_FETCH_DEPTH,
                            block.block_type(),
                            id
                        );
                    } else {
                        let children = fetch_level(store, id, depth + 1).await?;
                        block.set_children(children);
                    }
                }
            }
            blocks.push(block);
        }

        Ok(blocks)
    })
}

async fn fetch_table_rows<S>(store: &S, table: &BlockId) -> Result<Vec<TableRow>, AppError>
where
    S: BlockStore + ?Sized,
{
    let records = fetch_all_children(store, table).await?;
    Ok(records
        .into_iter()
        .filter_map(|record| match record {
            ChildRecord::TableRow(cells) => Some(cells),
            ChildRecord::Block { .. } => None,
        })
        .collect())
}
