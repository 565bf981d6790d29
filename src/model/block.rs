use super::blocks::*;
use super::common::BlockCommon;
use crate::types::{BlockId, TextSpan};
use serde::{Deserialize, Serialize};

/// Macro to reduce boilerplate in Block enum methods
macro_rules! match_all_blocks {
    ($self:expr, $pattern:pat => $result:expr) => {
        match $self {
            Block::Paragraph($pattern) => $result,
            Block::Heading($pattern) => $result,
            Block::BulletedListItem($pattern) => $result,
            Block::NumberedListItem($pattern) => $result,
            Block::ToDo($pattern) => $result,
            Block::Quote($pattern) => $result,
            Block::Callout($pattern) => $result,
            Block::Toggle($pattern) => $result,
            Block::Code($pattern) => $result,
            Block::Divider($pattern) => $result,
            Block::Table($pattern) => $result,
            Block::Image($pattern) => $result,
            Block::ChildPage($pattern) => $result,
            Block::Unsupported($pattern) => $result,
        }
    };
}

/// Block represents every block kind the converter understands.
///
/// The set is closed; anything else the store returns becomes `Unsupported`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph(ParagraphBlock),
    Heading(HeadingBlock),
    BulletedListItem(BulletedListItemBlock),
    NumberedListItem(NumberedListItemBlock),
    ToDo(ToDoBlock),
    Quote(QuoteBlock),
    Callout(CalloutBlock),
    Toggle(ToggleBlock),
    Code(CodeBlock),
    Divider(DividerBlock),
    Table(TableBlock),
    Image(ImageBlock),
    ChildPage(ChildPageBlock),
    Unsupported(UnsupportedBlock),
}

impl Block {
    /// Get the block's ID, if the store has assigned one
    pub fn id(&self) -> Option<&BlockId> {
        self.common().id.as_ref()
    }

    /// Get the block's children
    pub fn children(&self) -> &[Block] {
        match_all_blocks!(self, b => &b.common.children)
    }

    /// Get mutable reference to children
    pub fn children_mut(&mut self) -> &mut Vec<Block> {
        match_all_blocks!(self, b => &mut b.common.children)
    }

    /// Check if block has children
    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// Get common block data
    pub fn common(&self) -> &BlockCommon {
        match_all_blocks!(self, b => &b.common)
    }

    /// Get mutable common block data
    pub fn common_mut(&mut self) -> &mut BlockCommon {
        match_all_blocks!(self, b => &mut b.common)
    }

    /// Set children
    pub fn set_children(&mut self, children: Vec<Block>) {
        self.common_mut().children = children;
    }

    /// Removes and returns the children, leaving the block childless.
    pub fn take_children(&mut self) -> Vec<Block> {
        std::mem::take(self.children_mut())
    }

    /// Get block type name as the store spells it
    pub fn block_type(&self) -> &str {
        match self {
            Block::Paragraph(_) => "paragraph",
            Block::Heading(h) => match h.level {
                1 => "heading_1",
                2 => "heading_2",
                _ => "heading_3",
            },
            Block::BulletedListItem(_) => "bulleted_list_item",
            Block::NumberedListItem(_) => "numbered_list_item",
            Block::ToDo(_) => "to_do",
            Block::Quote(_) => "quote",
            Block::Callout(_) => "callout",
            Block::Toggle(_) => "toggle",
            Block::Code(_) => "code",
            Block::Divider(_) => "divider",
            Block::Table(_) => "table",
            Block::Image(_) => "image",
            Block::ChildPage(_) => "child_page",
            Block::Unsupported(b) => &b.block_type,
        }
    }

    // --- Constructors used by the parser ---

    pub fn paragraph(rich_text: Vec<TextSpan>) -> Self {
        Block::Paragraph(ParagraphBlock {
            common: BlockCommon::default(),
            content: TextBlockContent::new(rich_text),
        })
    }

    pub fn heading(level: u8, rich_text: Vec<TextSpan>) -> Self {
        Block::Heading(HeadingBlock {
            common: BlockCommon::default(),
            level,
            content: TextBlockContent::new(rich_text),
        })
    }

    pub fn bulleted(rich_text: Vec<TextSpan>, children: Vec<Block>) -> Self {
        Block::BulletedListItem(BulletedListItemBlock {
            common: BlockCommon::default().with_children(children),
            content: TextBlockContent::new(rich_text),
        })
    }

    pub fn numbered(rich_text: Vec<TextSpan>, children: Vec<Block>) -> Self {
        Block::NumberedListItem(NumberedListItemBlock {
            common: BlockCommon::default().with_children(children),
            content: TextBlockContent::new(rich_text),
        })
    }

    pub fn todo(rich_text: Vec<TextSpan>, checked: bool, children: Vec<Block>) -> Self {
        Block::ToDo(ToDoBlock {
            common: BlockCommon::default().with_children(children),
            content: TextBlockContent::new(rich_text),
            checked,
        })
    }

    pub fn quote(rich_text: Vec<TextSpan>) -> Self {
        Block::Quote(QuoteBlock {
            common: BlockCommon::default(),
            content: TextBlockContent::new(rich_text),
        })
    }

    pub fn toggle(summary: Vec<TextSpan>, children: Vec<Block>) -> Self {
        Block::Toggle(ToggleBlock {
            common: BlockCommon::default().with_children(children),
            content: TextBlockContent::new(summary),
        })
    }

    pub fn divider() -> Self {
        Block::Divider(DividerBlock::default())
    }

    pub fn image(url: impl Into<String>, caption: Vec<TextSpan>) -> Self {
        Block::Image(ImageBlock {
            common: BlockCommon::default(),
            url: url.into(),
            caption,
        })
    }
}
