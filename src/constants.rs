// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role. Reading these constants should tell you the story
//! of how the converter and the API adapter behave: how long a text run
//! may be, how many blocks go out per request, how deep we recurse, and
//! how politely we talk to the Notion API.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

/// How many objects the Notion API returns per page of results.
///
/// The Notion API maximum is 100. We use the maximum to minimize
/// round-trips during recursive fetching.
pub const NOTION_API_PAGE_SIZE: u32 = 100;

/// Maximum number of block records accepted by one append-children call.
pub const NOTION_APPEND_BATCH_SIZE: usize = 100;

/// Maximum characters in a single rich-text `content` field.
///
/// Longer runs are split into several spans carrying the same annotations.
pub const RICH_TEXT_SEGMENT_CAP: usize = 2000;

/// Maximum nesting depth when recursively fetching block children.
///
/// 50 levels is far deeper than any real Notion page; anything deeper is
/// left without children and reported with a warning.
pub const NOTION_MAX_FETCH_DEPTH: usize = 50;

/// Notion API version sent with every request.
pub const NOTION_API_VERSION: &str = "2022-06-28";

/// Default base URL of the Notion REST API.
pub const NOTION_API_BASE_URL: &str = "https://api.notion.com/v1";

// ---------------------------------------------------------------------------
// Request pacing and retries
// ---------------------------------------------------------------------------

/// Minimum spacing between two requests issued by the same client.
///
/// Notion allows an average of three requests per second per integration.
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(350);

/// How many times a rate-limited or transiently failing request is retried.
pub const MAX_REQUEST_RETRIES: u32 = 5;

/// First backoff delay when the server does not say how long to wait.
pub const INITIAL_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Upper bound for a single backoff delay.
pub const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(30);

/// Per-request timeout applied by the HTTP client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Formatting boundaries
// ---------------------------------------------------------------------------

/// Maximum nesting depth when recursively rendering blocks to markdown.
///
/// Parsed and fetched trees never get close; this only guards hand-built
/// trees from overflowing the stack.
pub const BLOCK_MAX_RENDER_DEPTH: usize = 100;

/// Columns a tab counts for when measuring list indentation.
pub const TAB_WIDTH: usize = 4;

/// Indentation added to the children of bulleted and to-do items.
pub const BULLET_CHILD_INDENT: usize = 2;

/// Indentation added to the children of numbered items (`1. ` is three wide).
pub const NUMBERED_CHILD_INDENT: usize = 3;

/// Estimated characters per block, used to pre-allocate output strings.
///
/// This is a performance hint, not a constraint.
pub const CHARS_PER_BLOCK_ESTIMATE: usize = 256;

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;
