// src/formatting/pure_visitor.rs
//! Pure functional visitor for block formatting.
//!
//! Every block renders to its own lines, already indented, with no trailing
//! newline. Siblings are joined by [`join_rendered`]: consecutive list items
//! stay tight, everything else gets one blank line between.

use super::rich_text::{escape_markdown, render_inline};
use super::state::FormatContext;
use crate::constants::{BULLET_CHILD_INDENT, NUMBERED_CHILD_INDENT};
use crate::model::*;
use crate::parsing::lines::{starts_block, DETAILS_CLOSE, LIST_ITEM};
use crate::parsing::AdmonitionKind;
use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("blank run regex is valid"));

/// Trait for formatting blocks into markdown.
pub trait BlockRenderer {
    /// Format a block, children included.
    fn render_block(&self, block: &Block, context: FormatContext) -> String;

    /// Format sibling blocks and join them.
    fn render_children(&self, blocks: &[Block], context: FormatContext) -> String {
        let rendered: Vec<(bool, String)> = blocks
            .iter()
            .map(|block| (is_list_item(block), self.render_block(block, context)))
            .collect();
        join_rendered(rendered)
    }
}

/// Formats blocks as markdown.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownBlockRenderer;

impl BlockRenderer for MarkdownBlockRenderer {
    fn render_block(&self, block: &Block, context: FormatContext) -> String {
        match block {
            Block::Paragraph(b) => {
                let text = self.format_paragraph(&b.content, &context);
                self.with_children(text, &b.common.children, context, 0, "\n\n")
            }
            Block::Heading(b) => {
                let heading = self.format_heading(b, &context);
                self.with_children(heading, &b.common.children, context, 0, "\n\n")
            }
            Block::BulletedListItem(b) => self.format_list_item(
                "- ",
                &b.content,
                &b.common.children,
                context,
                BULLET_CHILD_INDENT,
            ),
            Block::NumberedListItem(b) => self.format_list_item(
                "1. ",
                &b.content,
                &b.common.children,
                context,
                NUMBERED_CHILD_INDENT,
            ),
            Block::ToDo(b) => {
                let marker = if b.checked { "- [x] " } else { "- [ ] " };
                self.format_list_item(
                    marker,
                    &b.content,
                    &b.common.children,
                    context,
                    BULLET_CHILD_INDENT,
                )
            }
            Block::Quote(b) => self.format_quote(b, context),
            Block::Callout(b) => self.format_callout(b, context),
            Block::Toggle(b) => self.format_toggle(b, context),
            Block::Code(b) => self.format_code_block(b, &context),
            Block::Divider(_) => format!("{}---", context.indent_str()),
            Block::Table(b) => self.format_table(b, &context),
            Block::Image(b) => self.format_image(b, &context),
            Block::ChildPage(b) => format!(
                "{}📄 **{}**",
                context.indent_str(),
                escape_markdown(&single_line(&b.title))
            ),
            Block::Unsupported(b) => {
                let id = b
                    .common
                    .id
                    .as_ref()
                    .map(|id| format!(" ({})", id))
                    .unwrap_or_default();
                format!(
                    "{}<!-- unsupported block: {}{} -->",
                    context.indent_str(),
                    b.block_type,
                    id
                )
            }
        }
    }
}

impl MarkdownBlockRenderer {
    // --- Block-type formatters ---

    /// Paragraph text, with lines that would re-parse as block syntax escaped.
    fn format_paragraph(&self, content: &TextBlockContent, context: &FormatContext) -> String {
        let text = collapse_blank_runs(&render_inline(&content.rich_text));
        let escaped = text
            .split('\n')
            .map(escape_block_start)
            .collect::<Vec<_>>()
            .join("\n");
        indent_block_content(&escaped, &context.indent_str())
    }

    /// Format heading with appropriate markdown level
    fn format_heading(&self, b: &HeadingBlock, context: &FormatContext) -> String {
        let prefix = "#".repeat(b.level.clamp(1, 3) as usize);
        let text = single_line(&render_inline(&b.content.rich_text));
        format!("{}{} {}", context.indent_str(), prefix, text)
    }

    /// Format a list item line and its indented children.
    fn format_list_item(
        &self,
        marker: &str,
        content: &TextBlockContent,
        children: &[Block],
        context: FormatContext,
        child_indent: usize,
    ) -> String {
        let text = single_line(&render_inline(&content.rich_text));
        let line = format!("{}{}{}", context.indent_str(), marker, text);
        self.with_children(line, children, context, child_indent, "\n")
    }

    /// Every line of the quote prefixed with `> `.
    fn format_quote(&self, b: &QuoteBlock, context: FormatContext) -> String {
        let text = collapse_blank_runs(&render_inline(&b.content.rich_text));
        let quoted = quote_lines(&text, &context.indent_str());
        self.with_children(quoted, &b.common.children, context, 0, "\n\n")
    }

    /// An admonition header chosen from the callout color, then the content.
    fn format_callout(&self, b: &CalloutBlock, context: FormatContext) -> String {
        let indent = context.indent_str();
        let keyword = AdmonitionKind::from_color(b.content.color).keyword();
        let text = collapse_blank_runs(&render_inline(&b.content.rich_text));

        let mut out = format!("{}> [!{}]", indent, keyword);
        if !text.trim().is_empty() {
            out.push('\n');
            out.push_str(&quote_lines(&text, &indent));
        }
        self.with_children(out, &b.common.children, context, 0, "\n\n")
    }

    /// A `<details>` section with the summary and the children inside.
    fn format_toggle(&self, b: &ToggleBlock, context: FormatContext) -> String {
        let indent = context.indent_str();
        let summary = single_line(&render_inline(&b.content.rich_text));
        let mut out = format!("{indent}<details>\n{indent}<summary>{summary}</summary>\n\n");

        if !b.common.children.is_empty() {
            if context.depth_limit_reached() {
                log_depth_limit(&context, "toggle");
            } else {
                let children = self.render_children(&b.common.children, context.enter_children(0));
                if !children.is_empty() {
                    out.push_str(&children);
                    out.push_str("\n\n");
                }
            }
        }
        out.push_str(&indent);
        out.push_str("</details>");
        out
    }

    /// Format code block with language; the content is written verbatim.
    fn format_code_block(&self, code: &CodeBlock, context: &FormatContext) -> String {
        let indent = context.indent_str();
        let text = code.text();
        let fence = "`".repeat(longest_backtick_run(&text).max(2) + 1);

        let mut out = format!("{}{}{}\n", indent, fence, code.language);
        if !text.is_empty() {
            out.push_str(&indent_block_content(&text, &indent));
            out.push('\n');
        }
        out.push_str(&indent);
        out.push_str(&fence);
        out
    }

    /// A pipe table; the separator row follows the header when there is one.
    fn format_table(&self, b: &TableBlock, context: &FormatContext) -> String {
        if b.rows.is_empty() {
            return String::new();
        }
        let indent = context.indent_str();
        let mut lines = Vec::with_capacity(b.rows.len() + 1);

        for (i, row) in b.rows.iter().enumerate() {
            let mut line = format!("{}|", indent);
            for cell in row {
                line.push_str(&format!(" {} |", table_cell(cell)));
            }
            lines.push(line);

            if i == 0 && b.has_header {
                let separator = vec![" --- |"; b.table_width().max(1)].join("");
                lines.push(format!("{}|{}", indent, separator));
            }
        }
        lines.join("\n")
    }

    /// Format an image block with caption.
    fn format_image(&self, b: &ImageBlock, context: &FormatContext) -> String {
        let caption = single_line(&render_inline(&b.caption));
        let url = if b.url.chars().any(char::is_whitespace) || b.url.contains(')') {
            format!("<{}>", b.url)
        } else {
            b.url.clone()
        };
        format!("{}![{}]({})", context.indent_str(), caption, url)
    }

    // --- Helpers ---

    /// Appends rendered children, or warns and drops them past the depth limit.
    fn with_children(
        &self,
        head: String,
        children: &[Block],
        context: FormatContext,
        child_indent: usize,
        separator: &str,
    ) -> String {
        if children.is_empty() {
            return head;
        }
        if context.depth_limit_reached() {
            log_depth_limit(&context, "nested");
            return head;
        }
        let rendered = self.render_children(children, context.enter_children(child_indent));
        if rendered.is_empty() {
            head
        } else {
            format!("{}{}{}", head, separator, rendered)
        }
    }
}

/// Joins rendered siblings; list items stay tight, other blocks get a blank line.
pub(crate) fn join_rendered(rendered: Vec<(bool, String)>) -> String {
    let mut out = String::new();
    let mut previous_was_list = false;

    for (is_list, text) in rendered {
        if text.is_empty() {
            continue;
        }
        if !out.is_empty() {
            let trimmed = out.trim_end_matches('\n').len();
            out.truncate(trimmed);
            out.push_str(if previous_was_list && is_list {
                "\n"
            } else {
                "\n\n"
            });
        }
        out.push_str(&text);
        previous_was_list = is_list;
    }
    out
}

fn is_list_item(block: &Block) -> bool {
    matches!(
        block,
        Block::BulletedListItem(_) | Block::NumberedListItem(_) | Block::ToDo(_)
    )
}

fn log_depth_limit(context: &FormatContext, kind: &str) {
    log::warn!(
        "Render depth limit reached at depth {}; children of {} block omitted",
        context.depth(),
        kind
    );
}

/// Backslash-escapes a line that would otherwise start a block.
///
/// A numbered-list marker gets its period escaped (`1\. x`); anything else
/// gets a backslash before its first visible character.
fn escape_block_start(line: &str) -> String {
    if !(starts_block(line) || DETAILS_CLOSE.is_match(line)) {
        return line.to_string();
    }
    if let Some(marker) = LIST_ITEM.captures(line).and_then(|caps| caps.get(2)) {
        if marker.as_str().ends_with('.') {
            let dot = marker.end() - 1;
            return format!("{}\\{}", &line[..dot], &line[dot..]);
        }
    }
    let start = line.len() - line.trim_start().len();
    format!("{}\\{}", &line[..start], &line[start..])
}

fn quote_lines(text: &str, indent: &str) -> String {
    text.split('\n')
        .map(|line| format!("{}> {}", indent, line).trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn table_cell(cell: &[crate::types::TextSpan]) -> String {
    single_line(&render_inline(cell)).replace('|', "\\|")
}

fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace('\n', " ")
}

fn collapse_blank_runs(text: &str) -> String {
    BLANK_RUNS.replace_all(text, "\n\n").into_owned()
}

fn longest_backtick_run(text: &str) -> usize {
    text.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}

/// Indents each non-empty line of `text` by `indent`, preserving blank lines.
fn indent_block_content(text: &str, indent: &str) -> String {
    if indent.is_empty() {
        return text.to_string();
    }
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                line.to_string()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
