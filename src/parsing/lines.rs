//! Line classification shared by the block parser and the block renderer.

use crate::constants::TAB_WIDTH;
use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,3})\s+(.*?)\s*$").expect("heading regex is valid"));

pub(crate) static DIVIDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}-{3,}\s*$").expect("divider regex is valid"));

pub(crate) static LIST_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([ \t]*)([-*]|\d+\.)(?:[ \t]+(.*))?$").expect("list item regex is valid")
});

pub(crate) static CHECKBOX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([ xX])\](?:[ \t]+(.*))?$").expect("checkbox regex is valid"));

pub(crate) static ADMONITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*>\s*\[!([A-Za-z]+)\]\s*(.*?)\s*$").expect("admonition regex is valid")
});

pub(crate) static QUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*> ?(.*)$").expect("quote regex is valid"));

pub(crate) static IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*!\[(.*)\]\((?:<([^>]+)>|(\S+?))\)\s*$").expect("image regex is valid")
});

pub(crate) static FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(`{3,})\s*([^`\s]*)\s*$").expect("fence regex is valid"));

pub(crate) static TABLE_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\|?\s*:?-+:?\s*(?:\|\s*:?-+:?\s*)*\|?$").expect("separator regex is valid")
});

pub(crate) static DETAILS_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*<details(?:\s[^>]*)?>(.*)$").expect("details regex is valid"));

pub(crate) static DETAILS_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*</details>\s*$").expect("details close regex is valid"));

pub(crate) static SUMMARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<summary>(.*?)</summary>").expect("summary regex is valid"));

pub(crate) fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

pub(crate) fn is_table_row(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

/// Leading whitespace width in columns; a tab counts as `TAB_WIDTH`.
pub(crate) fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

/// Whether a line opens any block other than a paragraph.
pub(crate) fn starts_block(line: &str) -> bool {
    is_table_row(line)
        || ADMONITION.is_match(line)
        || DETAILS_OPEN.is_match(line)
        || FENCE.is_match(line)
        || DIVIDER.is_match(line)
        || HEADING.is_match(line)
        || IMAGE.is_match(line)
        || LIST_ITEM.is_match(line)
        || QUOTE.is_match(line)
}

/// Index of the next non-blank line at or after `from`.
pub(crate) fn next_non_blank(lines: &[&str], from: usize) -> Option<usize> {
    (from..lines.len()).find(|&i| !is_blank(lines[i]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_width_counts_tabs() {
        assert_eq!(indent_width("  - a"), 2);
        assert_eq!(indent_width("\t- a"), 4);
        assert_eq!(indent_width(" \t- a"), 5);
        assert_eq!(indent_width("- a"), 0);
    }

    #[test]
    fn test_list_markers() {
        assert!(LIST_ITEM.is_match("- item"));
        assert!(LIST_ITEM.is_match("12. item"));
        assert!(LIST_ITEM.is_match("-"));
        assert!(!LIST_ITEM.is_match("**bold**"));
        assert!(!LIST_ITEM.is_match("-5 degrees"));
        assert!(!LIST_ITEM.is_match("1.5 million"));
    }

    #[test]
    fn test_block_starts() {
        assert!(starts_block("# Title"));
        assert!(starts_block("---"));
        assert!(starts_block("> quoted"));
        assert!(starts_block("![alt](https://x.io/a.png)"));
        assert!(starts_block("```rust"));
        assert!(starts_block("<details>"));
        assert!(!starts_block("#hashtag"));
        assert!(!starts_block("#### too deep"));
        assert!(!starts_block("plain words"));
    }

    #[test]
    fn test_table_separator() {
        assert!(TABLE_SEPARATOR.is_match("| --- | --- |"));
        assert!(TABLE_SEPARATOR.is_match("|:---|---:|"));
        assert!(!TABLE_SEPARATOR.is_match("| a | b |"));
    }
}
