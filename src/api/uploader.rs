// src/api/uploader.rs
//! Writing block trees level by level.

use super::fetcher::fetch_all_children;
use super::{wire, BlockStore, ChildRecord};
use crate::error::AppError;
use crate::model::Block;
use crate::types::BlockId;
use std::collections::VecDeque;

/// Appends `blocks` under `parent`, then each block's children under the
/// block the store created for it.
///
/// The whole tree is validated first, so a schema error writes nothing.
/// Returns the number of blocks written, nested ones included.
pub async fn append_tree<S>(store: &S, parent: &BlockId, blocks: &[Block]) -> Result<usize, AppError>
where
    S: BlockStore + ?Sized,
{
    wire::validate_tree(blocks)?;

    let mut pending: VecDeque<(BlockId, &[Block])> = VecDeque::new();
    pending.push_back((parent.clone(), blocks));
    let mut written = 0;

    while let Some((parent_id, level)) = pending.pop_front() {
        if level.is_empty() {
            continue;
        }
        let created = store.append_children(&parent_id, level).await?;
        if created.len() != level.len() {
            return Err(AppError::MalformedResponse(format!(
                "appended {} blocks under {} but the store reported {}",
                level.len(),
                parent_id,
                created.len()
            )));
        }
        written += level.len();

        for (id, block) in created.into_iter().zip(level) {
            if block.has_children() {
                pending.push_back((id, block.children()));
            }
        }
    }

    log::debug!("Wrote {} blocks under {}", written, parent);
    Ok(written)
}

/// Deletes every direct child of `parent`; returns how many were deleted.
pub async fn clear_children<S>(store: &S, parent: &BlockId) -> Result<usize, AppError>
where
    S: BlockStore + ?Sized,
{
    let ids: Vec<BlockId> = fetch_all_children(store, parent)
        .await?
        .into_iter()
        .filter_map(|record| match record {
            ChildRecord::Block { block, .. } => block.id().cloned(),
            ChildRecord::TableRow(_) => None,
        })
        .collect();

    for id in &ids {
        store.delete_block(id).await?;
    }
    log::debug!("Deleted {} existing blocks under {}", ids.len(), parent);
    Ok(ids.len())
}
