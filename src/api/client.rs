// src/api/client.rs
//! HTTP implementation of the block store over the Notion REST API.
//!
//! Every request goes through the client's throttle and retry policy. Schema
//! problems are caught while encoding, so a rejected write never reaches the
//! network.

use super::pagination::collect_all_pages;
use super::responses::{read_json, BlockChildren, ListEnvelope, PaginatedResponse};
use super::throttle::RequestThrottle;
use super::{uploader, wire, BlockStore};
use crate::config::ClientConfig;
use crate::constants::{NOTION_API_PAGE_SIZE, NOTION_API_VERSION, NOTION_APPEND_BATCH_SIZE};
use crate::error::AppError;
use crate::error_recovery::RetryPolicy;
use crate::model::{Block, Page, Parent, PropertyPatches};
use crate::types::{ApiKey, BlockId, PageId};
use reqwest::{header, Client, Method};
use serde_json::{json, Value};
use std::sync::Arc;

/// A Notion API client with authentication, pacing and retries built in.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
    base_url: String,
    throttle: Arc<RequestThrottle>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for NotionHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionHttpClient")
            .field("base_url", &self.base_url)
            .field("throttle", &self.throttle.min_interval())
            .field("retry", &self.retry)
            .finish()
    }
}

impl NotionHttpClient {
    /// Creates a client from resolved configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers(&config.api_key)?)
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            throttle: Arc::new(RequestThrottle::new(config.min_request_interval)),
            retry: config.retry,
        })
    }

    /// Creates the default headers for Notion API requests.
    fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", api_key.as_str());
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
            })?,
        );
        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_API_VERSION),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    /// Sends one logical request, retrying transient failures.
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value, AppError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let this = self;
        let url = url.as_str();
        self.retry
            .run(move || this.send_once(method.clone(), url, body))
            .await
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Value, AppError> {
        self.throttle.wait().await;
        log::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        read_json(response).await
    }

    async fn get(&self, endpoint: &str) -> Result<Value, AppError> {
        self.request(Method::GET, endpoint, None).await
    }

    async fn post(&self, endpoint: &str, body: &Value) -> Result<Value, AppError> {
        self.request(Method::POST, endpoint, Some(body)).await
    }

    async fn patch(&self, endpoint: &str, body: &Value) -> Result<Value, AppError> {
        self.request(Method::PATCH, endpoint, Some(body)).await
    }
}

fn parse_list(response: Value) -> Result<ListEnvelope, AppError> {
    serde_json::from_value(response)
        .map_err(|e| AppError::MalformedResponse(format!("invalid list response: {}", e)))
}

#[async_trait::async_trait]
impl BlockStore for NotionHttpClient {
    async fn fetch_children(
        &self,
        block_id: &BlockId,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<BlockChildren, AppError> {
        let mut endpoint = format!(
            "blocks/{}/children?page_size={}",
            block_id.to_dashed(),
            page_size.clamp(1, NOTION_API_PAGE_SIZE)
        );
        if let Some(cursor) = cursor {
            let encoded: String = url::form_urlencoded::byte_serialize(cursor.as_bytes()).collect();
            endpoint.push_str("&start_cursor=");
            endpoint.push_str(&encoded);
        }

        let envelope = parse_list(self.get(&endpoint).await?)?;
        Ok(PaginatedResponse {
            results: envelope
                .results
                .iter()
                .map(wire::convert_block)
                .collect::<Result<_, _>>()?,
            next_cursor: envelope.next_cursor,
            has_more: envelope.has_more,
        })
    }

    async fn append_children(
        &self,
        block_id: &BlockId,
        blocks: &[Block],
    ) -> Result<Vec<BlockId>, AppError> {
        let encoded = blocks
            .iter()
            .map(wire::encode_block)
            .collect::<Result<Vec<_>, _>>()?;

        let endpoint = format!("blocks/{}/children", block_id.to_dashed());
        let mut created = Vec::with_capacity(encoded.len());
        for chunk in encoded.chunks(NOTION_APPEND_BATCH_SIZE) {
            log::debug!("Appending {} blocks to {}", chunk.len(), block_id);
            let response = self
                .patch(&endpoint, &json!({ "children": chunk }))
                .await?;
            created.extend(wire::convert_created_ids(&response)?);
        }
        Ok(created)
    }

    async fn update_block(&self, block_id: &BlockId, patch: &Block) -> Result<(), AppError> {
        let body = wire::encode_block_update(patch)?;
        self.patch(&format!("blocks/{}", block_id.to_dashed()), &body)
            .await?;
        Ok(())
    }

    async fn delete_block(&self, block_id: &BlockId) -> Result<(), AppError> {
        self.request(
            Method::DELETE,
            &format!("blocks/{}", block_id.to_dashed()),
            None,
        )
        .await?;
        Ok(())
    }

    async fn retrieve_page(&self, page_id: &PageId) -> Result<Page, AppError> {
        let response = self.get(&format!("pages/{}", page_id.to_dashed())).await?;
        wire::convert_page(&response)
    }

    async fn create_page(
        &self,
        parent: &Parent,
        title: &str,
        blocks: &[Block],
    ) -> Result<Page, AppError> {
        wire::validate_tree(blocks)?;

        let inline_count = blocks
            .iter()
            .take(NOTION_APPEND_BATCH_SIZE)
            .take_while(|block| !block.has_children())
            .count();
        let (inline, rest) = blocks.split_at(inline_count);

        let children = inline
            .iter()
            .map(wire::encode_block)
            .collect::<Result<Vec<_>, _>>()?;
        let body = json!({
            "parent": wire::encode_parent(parent),
            "properties": wire::encode_title(title),
            "children": children,
        });

        let page = wire::convert_page(&self.post("pages", &body).await?)?;
        log::debug!("Created page {} with {} inline blocks", page.id, inline.len());

        if !rest.is_empty() {
            uploader::append_tree(self, &page.id.as_block_id(), rest).await?;
        }
        Ok(page)
    }

    async fn update_page_properties(
        &self,
        page_id: &PageId,
        properties: &PropertyPatches,
    ) -> Result<(), AppError> {
        let body = json!({ "properties": wire::encode_properties(properties)? });
        self.patch(&format!("pages/{}", page_id.to_dashed()), &body)
            .await?;
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<Page>, AppError> {
        let records = collect_all_pages(|cursor| async move {
            let mut body = json!({
                "query": query,
                "filter": {"property": "object", "value": "page"},
                "page_size": NOTION_API_PAGE_SIZE,
            });
            if let Some(cursor) = cursor {
                body["start_cursor"] = json!(cursor);
            }
            let envelope = parse_list(self.post("search", &body).await?)?;
            Ok(PaginatedResponse {
                results: envelope.results,
                next_cursor: envelope.next_cursor,
                has_more: envelope.has_more,
            })
        })
        .await?;

        records.iter().map(wire::convert_page).collect()
    }
}
