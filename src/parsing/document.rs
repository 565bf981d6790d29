//! Line-oriented block parser.
//!
//! Each line is classified in a fixed order (table, admonition, toggle, code
//! fence, divider, heading, image, list, quote) and anything else starts a
//! paragraph. Every branch consumes at least one line, so parsing always ends.

use super::callouts::parse_callout;
use super::inline::{chunk_plain_text, parse_inline};
use super::lines::{
    indent_width, is_blank, is_table_row, starts_block, ADMONITION, DETAILS_OPEN, DIVIDER, FENCE,
    HEADING, IMAGE, QUOTE,
};
use super::lists::{is_list_item, parse_list};
use super::tables::parse_table;
use super::toggles::parse_toggle;
use crate::model::{Block, BlockCommon, CodeBlock};

/// Parses a markdown document into a sequence of top-level blocks.
///
/// Never fails: input that matches no block syntax becomes paragraphs.
pub fn parse_document(markdown: &str) -> Vec<Block> {
    let lines: Vec<&str> = markdown.lines().collect();
    let blocks = parse_lines(&lines);
    log::debug!("Parsed {} lines into {} blocks", lines.len(), blocks.len());
    blocks
}

pub(crate) fn parse_lines(lines: &[&str]) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        if is_blank(lines[index]) {
            index += 1;
            continue;
        }
        let (parsed, next) = parse_block(lines, index);
        debug_assert!(next > index, "block parser must consume input");
        blocks.extend(parsed);
        index = next.max(index + 1);
    }

    blocks
}

fn parse_block(lines: &[&str], index: usize) -> (Vec<Block>, usize) {
    let line = lines[index];

    if is_table_row(line) {
        let (table, next) = parse_table(lines, index);
        return (vec![table], next);
    }
    if ADMONITION.is_match(line) {
        let (callout, next) = parse_callout(lines, index);
        return (vec![callout], next);
    }
    if DETAILS_OPEN.is_match(line) {
        let (toggle, next) = parse_toggle(lines, index);
        return (vec![toggle], next);
    }
    if FENCE.is_match(line) {
        let (code, next) = parse_code(lines, index);
        return (vec![code], next);
    }
    if DIVIDER.is_match(line) {
        return (vec![Block::divider()], index + 1);
    }
    if let Some(caps) = HEADING.captures(line) {
        let level = caps[1].len() as u8;
        return (vec![Block::heading(level, parse_inline(&caps[2]))], index + 1);
    }
    if let Some(caps) = IMAGE.captures(line) {
        let alt = caps[1].trim();
        let url = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map_or("", |m| m.as_str());
        let caption = if alt.is_empty() {
            Vec::new()
        } else {
            parse_inline(alt)
        };
        return (vec![Block::image(url, caption)], index + 1);
    }
    if is_list_item(line) {
        return parse_list(lines, index, indent_width(line));
    }
    if QUOTE.is_match(line) {
        let (quote, next) = parse_quote(lines, index);
        return (vec![quote], next);
    }

    let (paragraph, next) = parse_paragraph(lines, index);
    (vec![paragraph], next)
}

/// A fenced code block. An unclosed fence runs to the end of the input.
fn parse_code(lines: &[&str], start: usize) -> (Block, usize) {
    let (fence_len, language) = match FENCE.captures(lines[start]) {
        Some(caps) => (caps[1].len(), caps[2].to_string()),
        None => (3, String::new()),
    };

    let mut index = start + 1;
    let mut body = Vec::new();
    let mut closed = false;
    while index < lines.len() {
        let line = lines[index];
        if closes_fence(line, fence_len) {
            closed = true;
            break;
        }
        body.push(line);
        index += 1;
    }

    let block = Block::Code(CodeBlock {
        common: BlockCommon::default(),
        language,
        rich_text: chunk_plain_text(&body.join("\n")),
    });
    (block, if closed { index + 1 } else { index })
}

/// Whether `line` ends a code fence opened with `fence_len` backticks.
pub(crate) fn closes_fence(line: &str, fence_len: usize) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= fence_len && trimmed.chars().all(|c| c == '`')
}

/// Consecutive `>` lines that are not admonitions, joined with newlines.
fn parse_quote(lines: &[&str], start: usize) -> (Block, usize) {
    let mut index = start;
    let mut body = Vec::new();
    while index < lines.len() {
        let line = lines[index];
        if is_blank(line) || ADMONITION.is_match(line) {
            break;
        }
        let Some(caps) = QUOTE.captures(line) else {
            break;
        };
        body.push(caps.get(1).map_or("", |m| m.as_str()).trim_end());
        index += 1;
    }
    (Block::quote(parse_inline(&body.join("\n"))), index.max(start + 1))
}

/// Lines up to the next blank line or block marker, joined with newlines.
fn parse_paragraph(lines: &[&str], start: usize) -> (Block, usize) {
    let mut index = start + 1;
    while index < lines.len() && !is_blank(lines[index]) && !starts_block(lines[index]) {
        index += 1;
    }
    let text = lines[start..index]
        .iter()
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join("\n");
    (Block::paragraph(parse_inline(&text)), index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::plain_text;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_heading_levels() {
        let blocks = parse_document("# One\n## Two\n### Three\n#### Four");
        assert!(matches!(&blocks[0], Block::Heading(h) if h.level == 1));
        assert!(matches!(&blocks[1], Block::Heading(h) if h.level == 2));
        assert!(matches!(&blocks[2], Block::Heading(h) if h.level == 3));
        assert!(matches!(&blocks[3], Block::Paragraph(p) if p.content.plain_text() == "#### Four"));
    }

    #[test]
    fn test_paragraph_lines_joined() {
        let blocks = parse_document("first line\nsecond line\n\nnext");
        assert_eq!(blocks.len(), 2);
        match &blocks[0] {
            Block::Paragraph(p) => assert_eq!(p.content.plain_text(), "first line\nsecond line"),
            other => panic!("expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn test_paragraph_stops_at_block_marker() {
        let blocks = parse_document("text\n- item");
        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[1], Block::BulletedListItem(_)));
    }

    #[test]
    fn test_code_fence_preserves_content() {
        let blocks = parse_document("```rust\nfn main() {\n    *x = 1;\n}\n```");
        match &blocks[0] {
            Block::Code(code) => {
                assert_eq!(code.language, "rust");
                assert_eq!(code.text(), "fn main() {\n    *x = 1;\n}");
                assert!(code.rich_text.iter().all(|s| s.annotations == Default::default()));
            }
            other => panic!("expected code, got {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        let blocks = parse_document("```\nstill code\n\n# not a heading");
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            Block::Code(code) => assert_eq!(code.text(), "still code\n\n# not a heading"),
            other => panic!("expected code, got {:?}", other),
        }
    }

    #[test]
    fn test_longer_fence_contains_shorter() {
        let blocks = parse_document("````md\n```\ninner\n```\n````");
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            Block::Code(code) => assert_eq!(code.text(), "```\ninner\n```"),
            other => panic!("expected code, got {:?}", other),
        }
    }

    #[test]
    fn test_quote_lines_joined() {
        let blocks = parse_document("> one\n> two\n\n> three");
        assert_eq!(blocks.len(), 2);
        match &blocks[0] {
            Block::Quote(q) => assert_eq!(q.content.plain_text(), "one\ntwo"),
            other => panic!("expected quote, got {:?}", other),
        }
    }

    #[test]
    fn test_divider_and_image() {
        let blocks = parse_document("---\n![A *cat*](https://x.io/cat.png)");
        assert!(matches!(blocks[0], Block::Divider(_)));
        match &blocks[1] {
            Block::Image(image) => {
                assert_eq!(image.url, "https://x.io/cat.png");
                assert_eq!(plain_text(&image.caption), "A cat");
            }
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_table_first() {
        let blocks = parse_document("| a |\n| - |\n| b |");
        assert!(matches!(&blocks[0], Block::Table(t) if t.has_header && t.rows.len() == 2));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_document("").is_empty());
        assert!(parse_document("\n\n  \n").is_empty());
    }
}
