//! `<details>` sections as toggle blocks.

use super::document::{closes_fence, parse_lines};
use super::inline::parse_inline;
use super::lines::{DETAILS_CLOSE, DETAILS_OPEN, FENCE, SUMMARY};
use crate::model::Block;

/// Parses the collapsible section opening at `start`.
///
/// The summary comes from a `<summary>` element on the opening line or the one
/// after it. The body runs to the matching `</details>`, counting nested
/// sections outside code fences, and is parsed recursively into the toggle's children. An
/// unclosed section runs to the end of the input.
pub(crate) fn parse_toggle(lines: &[&str], start: usize) -> (Block, usize) {
    let opening_rest = DETAILS_OPEN
        .captures(lines[start])
        .and_then(|caps| caps.get(1))
        .map_or("", |m| m.as_str());

    let mut body_start = start + 1;
    let summary = match SUMMARY.captures(opening_rest) {
        Some(caps) => {
            if opening_rest.contains("</details>") {
                let summary = parse_inline(caps[1].trim());
                return (Block::toggle(summary, Vec::new()), start + 1);
            }
            caps[1].trim().to_string()
        }
        None => match lines.get(start + 1).and_then(|line| SUMMARY.captures(line)) {
            Some(caps) => {
                body_start += 1;
                caps[1].trim().to_string()
            }
            None => String::new(),
        },
    };

    let mut depth = 1usize;
    let mut index = body_start;
    let mut body_end = lines.len();
    let mut open_fence: Option<usize> = None;
    while index < lines.len() {
        let line = lines[index];
        if let Some(fence_len) = open_fence {
            if closes_fence(line, fence_len) {
                open_fence = None;
            }
        } else if let Some(caps) = FENCE.captures(line) {
            open_fence = Some(caps[1].len());
        } else if DETAILS_OPEN.is_match(line) {
            depth += 1;
        } else if DETAILS_CLOSE.is_match(line) {
            depth -= 1;
            if depth == 0 {
                body_end = index;
                break;
            }
        }
        index += 1;
    }

    let children = parse_lines(&lines[body_start.min(body_end)..body_end]);
    let next = if body_end < lines.len() {
        body_end + 1
    } else {
        lines.len()
    };
    (Block::toggle(parse_inline(&summary), children), next)
}
