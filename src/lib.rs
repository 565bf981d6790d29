// src/lib.rs
//! notionmd library: converts between a markdown dialect and Notion block trees.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Parsing**: `parse_document`, `parse_inline`, `chunk_plain_text`
//! - **Rendering**: `render_document`, `render_block`, `render_inline`
//! - **Domain model**: `Block`, `TextSpan`, `Annotations`, `Page`, etc.
//! - **API client**: `BlockStore`, `NotionHttpClient`, `RequestThrottle`, wire codec
//! - **Document sync**: `export_page`, `import_markdown`
//! - **Error handling**: `AppError`, `SchemaError`, `ValidationError`

pub mod api;
pub mod config;
pub mod constants;
mod error;
pub mod error_recovery;
pub mod formatting;
pub mod model;
pub mod parsing;
pub mod pipeline;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, NotionErrorCode, SchemaError};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{ClientConfig, CommandLineInput};
pub use crate::error_recovery::RetryPolicy;

// --- Domain Model ---
pub use crate::model::{
    parse_property_patches, Block, BlockCommon, Document, Page, PageTitle, Parent,
    PropertyPatch, PropertyPatches,
};

// --- Block Types ---
pub use crate::model::blocks::{
    BulletedListItemBlock, CalloutBlock, ChildPageBlock, CodeBlock, DividerBlock,
    HeadingBlock, Icon, ImageBlock, NumberedListItemBlock, ParagraphBlock, QuoteBlock,
    TableBlock, TableRow, TextBlockContent, ToDoBlock, ToggleBlock, UnsupportedBlock,
};

// --- Domain Types ---
pub use crate::types::{
    Annotations, ApiKey, BlockId, Color, DatabaseId, PageId, PropertyName, TextSpan,
    ValidatedUrl,
};

// --- Conversion ---
pub use crate::formatting::{render_block, render_document, render_inline};
pub use crate::parsing::{chunk_plain_text, parse_document, parse_inline, AdmonitionKind};

// --- API Client ---
pub use crate::api::{
    BlockChildren, BlockStore, ChildRecord, NotionHttpClient, PaginatedResponse,
    RequestThrottle,
};

// --- Document Sync ---
pub use crate::pipeline::{export_page, fetch_document, import_markdown, ImportMode, ImportReport};
