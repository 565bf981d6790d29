//! Nested bulleted, numbered and to-do lists.

use super::inline::parse_inline;
use super::lines::{indent_width, is_blank, next_non_blank, CHECKBOX, LIST_ITEM};
use crate::model::Block;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemKind {
    Bulleted,
    Numbered,
    ToDo { checked: bool },
}

/// One list item line, before nesting is resolved.
#[derive(Debug)]
struct ListLine<'a> {
    indent: usize,
    kind: ItemKind,
    text: &'a str,
}

impl<'a> ListLine<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let caps = LIST_ITEM.captures(line)?;
        let indent = indent_width(line);
        let marker = caps.get(2)?.as_str();
        let rest = caps.get(3).map_or("", |m| m.as_str());

        if marker.ends_with('.') {
            return Some(Self {
                indent,
                kind: ItemKind::Numbered,
                text: rest,
            });
        }

        match CHECKBOX.captures(rest) {
            Some(check) => Some(Self {
                indent,
                kind: ItemKind::ToDo {
                    checked: &check[1] != " ",
                },
                text: check.get(2).map_or("", |m| m.as_str()),
            }),
            None => Some(Self {
                indent,
                kind: ItemKind::Bulleted,
                text: rest,
            }),
        }
    }

    fn into_block(self) -> Block {
        let rich_text = parse_inline(self.text.trim());
        match self.kind {
            ItemKind::Bulleted => Block::bulleted(rich_text, Vec::new()),
            ItemKind::Numbered => Block::numbered(rich_text, Vec::new()),
            ItemKind::ToDo { checked } => Block::todo(rich_text, checked, Vec::new()),
        }
    }
}

/// Whether `line` is a list item line.
pub(crate) fn is_list_item(line: &str) -> bool {
    LIST_ITEM.is_match(line)
}

/// Parses list items at `indent` starting from `start`.
///
/// Items indented deeper than their predecessor become its children; a
/// shallower item ends this level. A blank line is skipped only when the next
/// non-blank line is an item at this level or deeper. Returns the items and
/// the index of the first unconsumed line.
pub fn parse_list(lines: &[&str], start: usize, indent: usize) -> (Vec<Block>, usize) {
    let mut items: Vec<Block> = Vec::new();
    let mut index = start;

    while index < lines.len() {
        let line = lines[index];

        if is_blank(line) {
            match next_non_blank(lines, index) {
                Some(next)
                    if ListLine::parse(lines[next]).is_some_and(|item| item.indent >= indent) =>
                {
                    index = next;
                    continue;
                }
                _ => break,
            }
        }

        let Some(item) = ListLine::parse(line) else {
            break;
        };
        if item.indent < indent {
            break;
        }

        if item.indent > indent {
            if let Some(parent) = items.last_mut() {
                let (children, next) = parse_list(lines, index, item.indent);
                parent.children_mut().extend(children);
                index = next;
                continue;
            }
        }

        items.push(item.into_block());
        index += 1;
    }

    (items, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::plain_text;
    use pretty_assertions::assert_eq;

    fn text_of(block: &Block) -> String {
        match block {
            Block::BulletedListItem(b) => b.content.plain_text(),
            Block::NumberedListItem(b) => b.content.plain_text(),
            Block::ToDo(b) => plain_text(&b.content.rich_text),
            other => panic!("not a list item: {:?}", other),
        }
    }

    fn parse(markdown: &str) -> (Vec<Block>, usize) {
        let lines: Vec<&str> = markdown.lines().collect();
        parse_list(&lines, 0, 0)
    }

    #[test]
    fn test_nested_children() {
        let (items, next) = parse("- a\n  - b\n    - c\n- d");
        assert_eq!(next, 4);
        assert_eq!(items.len(), 2);
        assert_eq!(text_of(&items[0]), "a");
        assert_eq!(text_of(&items[0].children()[0]), "b");
        assert_eq!(text_of(&items[0].children()[0].children()[0]), "c");
        assert_eq!(text_of(&items[1]), "d");
    }

    #[test]
    fn test_uneven_dedent_attaches_to_parent() {
        let (items, _) = parse("- a\n    - b\n  - c");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].children().len(), 2);
    }

    #[test]
    fn test_mixed_kinds() {
        let (items, _) = parse("1. one\n- [x] done\n- [ ] open\n* star");
        assert!(matches!(items[0], Block::NumberedListItem(_)));
        assert!(matches!(&items[1], Block::ToDo(t) if t.checked));
        assert!(matches!(&items[2], Block::ToDo(t) if !t.checked));
        assert!(matches!(items[3], Block::BulletedListItem(_)));
    }

    #[test]
    fn test_blank_line_between_items() {
        let (items, next) = parse("- a\n\n- b\n\nparagraph");
        assert_eq!(items.len(), 2);
        assert_eq!(next, 3);
    }

    #[test]
    fn test_tab_indentation() {
        let (items, _) = parse("- a\n\t- b");
        assert_eq!(items[0].children().len(), 1);
    }

    #[test]
    fn test_empty_item() {
        let (items, _) = parse("-\n- [ ]");
        assert_eq!(text_of(&items[0]), "");
        assert!(matches!(items[1], Block::ToDo(_)));
    }
}
