// src/api/pagination.rs
//! Cursor pagination over any paged listing.

use super::responses::PaginatedResponse;
use crate::error::AppError;
use std::collections::HashSet;

/// Fetches every page, passing each response's cursor to the next call.
///
/// Stops when `has_more` is false, when the cursor is missing, or when the
/// store hands back a cursor it has already been given.
pub async fn collect_all_pages<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, AppError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: std::future::Future<Output = Result<PaginatedResponse<T>, AppError>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut seen: HashSet<String> = HashSet::new();
    let mut pages_fetched = 0u32;

    loop {
        let response = fetch_page(cursor.clone()).await?;
        pages_fetched += 1;
        items.extend(response.results);

        let next = match (response.has_more, response.next_cursor) {
            (true, Some(next)) => next,
            (true, None) => {
                log::debug!("Store reported more results without a cursor; stopping");
                break;
            }
            (false, _) => break,
        };
        if !seen.insert(next.clone()) {
            log::warn!("Store repeated cursor {}; stopping pagination", next);
            break;
        }
        cursor = Some(next);
    }

    log::debug!("Fetched {} items over {} pages", items.len(), pages_fetched);
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn page(results: Vec<u32>, next: Option<&str>, has_more: bool) -> PaginatedResponse<u32> {
        PaginatedResponse {
            results,
            next_cursor: next.map(str::to_string),
            has_more,
        }
    }

    #[tokio::test]
    async fn test_follows_cursors() {
        let items = collect_all_pages(|cursor| async move {
            Ok(match cursor.as_deref() {
                None => page(vec![1, 2], Some("c1"), true),
                Some("c1") => page(vec![3], Some("c2"), true),
                _ => page(vec![4], None, false),
            })
        })
        .await
        .unwrap();
        assert_eq!(items, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_has_more_without_cursor_terminates() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let items = collect_all_pages(move |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(page(vec![7], None, true))
        })
        .await
        .unwrap();
        assert_eq!(items, vec![7]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repeated_cursor_terminates() {
        let items = collect_all_pages(|_| async move { Ok(page(vec![1], Some("same"), true)) })
            .await
            .unwrap();
        assert_eq!(items, vec![1, 1]);
    }

    #[tokio::test]
    async fn test_cursor_cycle_terminates() {
        let items = collect_all_pages(|cursor| async move {
            Ok(match cursor.as_deref() {
                None => page(vec![1], Some("a"), true),
                Some("a") => page(vec![2], Some("b"), true),
                _ => page(vec![3], Some("a"), true),
            })
        })
        .await
        .unwrap();
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let result: Result<Vec<u32>, _> = collect_all_pages(|_| async move {
            Err(AppError::MalformedResponse("nope".to_string()))
        })
        .await;
        assert!(result.is_err());
    }
}
