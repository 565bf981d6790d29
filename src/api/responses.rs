// src/api/responses.rs
//! Response envelopes and HTTP response handling.

use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::{AppError, NotionErrorCode};
use crate::model::{Block, TableRow};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::Response;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Generic paginated response wrapper
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedResponse<T> {
    pub results: Vec<T>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    /// A final page holding `results`.
    pub fn last(results: Vec<T>) -> Self {
        Self {
            results,
            next_cursor: None,
            has_more: false,
        }
    }
}

/// One record of a children listing.
///
/// Table rows only ever appear under a table and are kept apart from blocks.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildRecord {
    Block { block: Block, has_children: bool },
    TableRow(TableRow),
}

impl ChildRecord {
    /// A block record with no children of its own.
    pub fn leaf(block: Block) -> Self {
        ChildRecord::Block {
            block,
            has_children: false,
        }
    }
}

/// One page of a block's children.
pub type BlockChildren = PaginatedResponse<ChildRecord>;

/// The raw list envelope every paginated endpoint returns.
#[derive(Debug, Deserialize)]
pub(crate) struct ListEnvelope {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// The store's error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(default)]
    request_id: Option<String>,
}

/// Reads a response into JSON, turning error statuses into `NotionService`.
///
/// An empty success body reads as `null`.
pub(crate) async fn read_json(response: Response) -> Result<Value, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    let retry_after = parse_retry_after(response.headers());
    let header_request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.text().await?;

    if status.is_success() {
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_str(&body).map_err(|e| {
            log::error!("Failed to parse response from {}: {}", url, e);
            AppError::MalformedResponse(format!("{} (body: {})", e, preview(&body)))
        });
    }

    let error = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => AppError::NotionService {
            code: NotionErrorCode::from_api_response(&parsed.code),
            message: parsed.message,
            status: status.as_u16(),
            request_id: parsed.request_id.or(header_request_id),
            retry_after,
        },
        Err(_) => AppError::NotionService {
            code: NotionErrorCode::from_http_status(status.as_u16()),
            message: format!("HTTP {} from {}: {}", status, url, preview(&body)),
            status: status.as_u16(),
            request_id: header_request_id,
            retry_after,
        },
    };
    log::debug!("Request to {} failed: {}", url, error);
    Err(error)
}

/// `Retry-After` as whole or fractional seconds; HTTP dates are ignored.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    let seconds: f64 = raw.parse().ok()?;
    (seconds.is_finite() && seconds >= 0.0).then(|| Duration::from_secs_f64(seconds))
}

fn preview(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let cut: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_retry_after_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("2"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(2)));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("0.5"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_millis(500)));

        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(ERROR_BODY_PREVIEW_LENGTH + 10);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), ERROR_BODY_PREVIEW_LENGTH + 3);
    }
}
