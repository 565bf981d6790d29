//! GitHub-style admonitions (`> [!NOTE]`) and their callout styling.

use super::inline::parse_inline;
use super::lines::{is_blank, ADMONITION, QUOTE};
use crate::model::{Block, BlockCommon, CalloutBlock, Icon, TextBlockContent};
use crate::types::Color;

/// The admonition keyword of a callout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmonitionKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
    /// Any keyword not listed above.
    Other,
}

impl AdmonitionKind {
    /// Case-insensitive keyword lookup.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.to_ascii_uppercase().as_str() {
            "NOTE" => AdmonitionKind::Note,
            "TIP" => AdmonitionKind::Tip,
            "IMPORTANT" => AdmonitionKind::Important,
            "WARNING" => AdmonitionKind::Warning,
            "CAUTION" => AdmonitionKind::Caution,
            _ => AdmonitionKind::Other,
        }
    }

    /// The keyword a callout of this color renders with.
    pub fn from_color(color: Color) -> Self {
        match color.base_hue() {
            Color::Yellow | Color::Orange => AdmonitionKind::Warning,
            Color::Red => AdmonitionKind::Important,
            Color::Blue => AdmonitionKind::Tip,
            _ => AdmonitionKind::Note,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            AdmonitionKind::Note | AdmonitionKind::Other => "NOTE",
            AdmonitionKind::Tip => "TIP",
            AdmonitionKind::Important => "IMPORTANT",
            AdmonitionKind::Warning => "WARNING",
            AdmonitionKind::Caution => "CAUTION",
        }
    }

    /// Icon emoji and color given to a parsed callout.
    pub fn style(self) -> (&'static str, Color) {
        match self {
            AdmonitionKind::Note => ("ℹ️", Color::GrayBackground),
            AdmonitionKind::Tip => ("💡", Color::BlueBackground),
            AdmonitionKind::Important => ("❗", Color::RedBackground),
            AdmonitionKind::Warning => ("⚠️", Color::YellowBackground),
            AdmonitionKind::Caution => ("🛑", Color::OrangeBackground),
            AdmonitionKind::Other => ("💬", Color::Default),
        }
    }
}

/// Parses the admonition starting at `start` and its `>` continuation lines.
///
/// Continuation lines are joined with single spaces. Returns the callout and the
/// index of the first line after it.
pub(crate) fn parse_callout(lines: &[&str], start: usize) -> (Block, usize) {
    let Some(caps) = ADMONITION.captures(lines[start]) else {
        return (Block::paragraph(parse_inline(lines[start].trim())), start + 1);
    };
    let kind = AdmonitionKind::from_keyword(&caps[1]);

    let mut parts: Vec<String> = Vec::new();
    if !caps[2].is_empty() {
        parts.push(caps[2].to_string());
    }

    let mut index = start + 1;
    while index < lines.len() {
        let line = lines[index];
        if is_blank(line) || ADMONITION.is_match(line) {
            break;
        }
        let Some(quoted) = QUOTE.captures(line) else {
            break;
        };
        let text = quoted[1].trim();
        if !text.is_empty() {
            parts.push(text.to_string());
        }
        index += 1;
    }

    let (emoji, color) = kind.style();
    let block = Block::Callout(CalloutBlock {
        common: BlockCommon::default(),
        icon: Some(Icon::emoji(emoji)),
        content: TextBlockContent {
            rich_text: parse_inline(&parts.join(" ")),
            color,
        },
    });
    (block, index)
}
