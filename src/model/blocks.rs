use super::common::BlockCommon;
use crate::types::{plain_text, Color, TextSpan};
use serde::{Deserialize, Serialize};

/// Text content block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextBlockContent {
    pub rich_text: Vec<TextSpan>,
    #[serde(default)]
    pub color: Color,
}

impl TextBlockContent {
    pub fn new(rich_text: Vec<TextSpan>) -> Self {
        Self {
            rich_text,
            color: Color::Default,
        }
    }

    pub fn plain_text(&self) -> String {
        plain_text(&self.rich_text)
    }
}

/// Paragraph block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParagraphBlock {
    #[serde(default)]
    pub common: BlockCommon,
    pub content: TextBlockContent,
}

/// Heading block, level 1 to 3
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingBlock {
    #[serde(default)]
    pub common: BlockCommon,
    pub level: u8,
    pub content: TextBlockContent,
}

/// Bulleted list item block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BulletedListItemBlock {
    #[serde(default)]
    pub common: BlockCommon,
    pub content: TextBlockContent,
}

/// Numbered list item block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NumberedListItemBlock {
    #[serde(default)]
    pub common: BlockCommon,
    pub content: TextBlockContent,
}

/// To-do block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToDoBlock {
    #[serde(default)]
    pub common: BlockCommon,
    pub content: TextBlockContent,
    #[serde(default)]
    pub checked: bool,
}

/// Quote block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuoteBlock {
    #[serde(default)]
    pub common: BlockCommon,
    pub content: TextBlockContent,
}

/// Callout block
///
/// The callout's color lives in `content.color`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalloutBlock {
    #[serde(default)]
    pub common: BlockCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    pub content: TextBlockContent,
}

/// Icon types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Icon {
    Emoji { emoji: String },
    External { url: String },
}

impl Icon {
    pub fn emoji(emoji: impl Into<String>) -> Self {
        Icon::Emoji {
            emoji: emoji.into(),
        }
    }
}

/// Toggle block; the summary line is `content`, the body is the children.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToggleBlock {
    #[serde(default)]
    pub common: BlockCommon,
    pub content: TextBlockContent,
}

/// Code block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodeBlock {
    #[serde(default)]
    pub common: BlockCommon,
    #[serde(default)]
    pub language: String,
    pub rich_text: Vec<TextSpan>,
}

impl CodeBlock {
    /// The code exactly as written, with any annotations dropped.
    pub fn text(&self) -> String {
        plain_text(&self.rich_text)
    }
}

/// Divider block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DividerBlock {
    #[serde(default)]
    pub common: BlockCommon,
}

/// A single table row: one rich-text sequence per cell.
pub type TableRow = Vec<Vec<TextSpan>>;

/// Table block
///
/// Rows are owned directly as a grid rather than as `table_row` children.
/// When `has_header` is set, the first row is the header.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableBlock {
    #[serde(default)]
    pub common: BlockCommon,
    #[serde(default)]
    pub has_header: bool,
    pub rows: Vec<TableRow>,
}

impl TableBlock {
    /// Number of columns, taken from the first row.
    pub fn table_width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// The rows below the header, or all rows when there is no header.
    pub fn data_rows(&self) -> &[TableRow] {
        if self.has_header && !self.rows.is_empty() {
            &self.rows[1..]
        } else {
            &self.rows
        }
    }
}

/// Image block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageBlock {
    #[serde(default)]
    pub common: BlockCommon,
    pub url: String,
    #[serde(default)]
    pub caption: Vec<TextSpan>,
}

/// Child page block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChildPageBlock {
    #[serde(default)]
    pub common: BlockCommon,
    pub title: String,
}

/// Unsupported block type
///
/// Stands in for any store-side block type this crate does not model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnsupportedBlock {
    #[serde(default)]
    pub common: BlockCommon,
    pub block_type: String,
}
