// src/formatting/rich_text/annotations.rs
//! Annotation processing for rich text.
//!
//! Spans are written left to right while a stack of open emphasis markers is
//! kept, so a marker shared by neighbouring spans is opened once and closed once
//! (`**a *b***` rather than `**a** ***b***`). Code is always the innermost
//! wrapper and is applied per span.

use crate::types::Annotations;

/// An emphasis marker with markdown syntax.
///
/// Underline and color have none and are dropped on render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker {
    Strikethrough,
    Italic,
    Bold,
}

/// A marker closed by the most recent `close_all_except`, with the byte
/// offsets of its opening and closing delimiters.
#[derive(Debug, Clone, Copy)]
struct ClosedMarker {
    marker: Marker,
    open_at: usize,
    close_at: usize,
}

impl Marker {
    /// Outermost first, used to break ties between markers opening together.
    pub(crate) const ALL: [Marker; 3] = [Marker::Strikethrough, Marker::Italic, Marker::Bold];

    fn delimiter(self) -> &'static str {
        match self {
            Marker::Strikethrough => "~~",
            Marker::Italic => "*",
            Marker::Bold => "**",
        }
    }

    /// Same emphasis spelled with underscores.
    fn underscore_delimiter(self) -> &'static str {
        match self {
            Marker::Strikethrough => "~~",
            Marker::Italic => "_",
            Marker::Bold => "__",
        }
    }

    fn is_set(self, annotations: &Annotations) -> bool {
        match self {
            Marker::Strikethrough => annotations.strikethrough,
            Marker::Italic => annotations.italic,
            Marker::Bold => annotations.bold,
        }
    }

    fn rank(self) -> usize {
        Marker::ALL.iter().position(|&m| m == self).unwrap_or(0)
    }

    /// Markers set in `annotations`, minus any in `exclude`.
    pub(crate) fn from_annotations(annotations: &Annotations, exclude: &[Marker]) -> Vec<Marker> {
        Marker::ALL
            .into_iter()
            .filter(|m| m.is_set(annotations) && !exclude.contains(m))
            .collect()
    }
}

/// One piece of already-escaped output and the emphasis that wraps it.
#[derive(Debug, Clone)]
pub(crate) struct StyledUnit {
    pub text: String,
    pub markers: Vec<Marker>,
    /// Whitespace-only text never opens a marker: `** **` would not re-parse.
    pub is_blank: bool,
}

/// Renderer for text styles to Markdown.
#[derive(Debug, Default)]
pub(crate) struct MarkdownStyleRenderer {
    out: String,
    open: Vec<Marker>,
    /// Byte offset of each open marker's delimiter, parallel to `open`.
    opened_at: Vec<usize>,
    last_closed: Option<ClosedMarker>,
    /// Byte offset of the first text written since the last marker.
    text_start: usize,
}

impl MarkdownStyleRenderer {
    /// Writes all units and closes whatever is still open.
    pub(crate) fn render(units: &[StyledUnit]) -> String {
        let mut renderer = Self::default();
        for (index, unit) in units.iter().enumerate() {
            renderer.write_unit(units, index, unit);
        }
        renderer.close_all_except(&[]);
        renderer.out
    }

    fn write_unit(&mut self, units: &[StyledUnit], index: usize, unit: &StyledUnit) {
        let target: Vec<Marker> = if unit.is_blank {
            unit.markers
                .iter()
                .copied()
                .filter(|m| self.open.contains(m))
                .collect()
        } else {
            unit.markers.clone()
        };

        self.close_all_except(&target);

        let mut missing: Vec<Marker> = target
            .into_iter()
            .filter(|m| !self.open.contains(m))
            .collect();
        if missing.is_empty() {
            self.out.push_str(&unit.text);
            return;
        }

        // Longest-lived marker outermost so it is opened only once.
        missing.sort_by_key(|&m| (std::cmp::Reverse(run_length(units, index, m)), m.rank()));

        let body = unit.text.trim_start();
        let opens_with_star = missing
            .first()
            .is_some_and(|m| m.delimiter().starts_with('*'));
        if opens_with_star && body.len() == unit.text.len() {
            self.respell_adjacent_closer();
        }
        self.out.push_str(&unit.text[..unit.text.len() - body.len()]);
        for marker in missing {
            self.opened_at.push(self.out.len());
            self.out.push_str(marker.delimiter());
            self.open.push(marker);
        }
        self.text_start = self.out.len();
        self.out.push_str(body);
    }

    /// Closes innermost markers until every open marker is in `keep`.
    ///
    /// Trailing whitespace of the text being closed moves outside the closers.
    fn close_all_except(&mut self, keep: &[Marker]) {
        self.last_closed = None;
        if self.open.iter().all(|m| keep.contains(m)) {
            return;
        }

        let tail = &self.out[self.text_start..];
        let kept_len = tail.trim_end().len();
        let trailing = if kept_len > 0 {
            self.out.split_off(self.text_start + kept_len)
        } else {
            String::new()
        };

        while self.open.iter().any(|m| !keep.contains(m)) {
            if let (Some(marker), Some(open_at)) = (self.open.pop(), self.opened_at.pop()) {
                self.last_closed = trailing.is_empty().then_some(ClosedMarker {
                    marker,
                    open_at,
                    close_at: self.out.len(),
                });
                self.out.push_str(marker.delimiter());
            }
        }
        self.out.push_str(&trailing);
        self.text_start = self.out.len();
    }

    /// Rewrites the marker that was just closed with underscores.
    ///
    /// A closing `*` run directly followed by an opening one merges into a
    /// single run on re-parse (`*a***(b)**`); `_a_**(b)**` keeps them apart.
    /// Skipped when the opener follows a word character, where `_` cannot open.
    fn respell_adjacent_closer(&mut self) {
        let Some(closed) = self.last_closed.take() else {
            return;
        };
        if closed.marker == Marker::Strikethrough {
            return;
        }
        let width = closed.marker.delimiter().len();
        let after_word = self.out[..closed.open_at]
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric);
        if closed.close_at + width != self.out.len() || after_word {
            return;
        }
        let underscores = closed.marker.underscore_delimiter();
        self.out
            .replace_range(closed.close_at..closed.close_at + width, underscores);
        self.out
            .replace_range(closed.open_at..closed.open_at + width, underscores);
    }
}

/// Number of consecutive units from `index` that carry `marker`.
fn run_length(units: &[StyledUnit], index: usize, marker: Marker) -> usize {
    units[index..]
        .iter()
        .take_while(|u| u.markers.contains(&marker))
        .count()
}

/// Backslash-escapes characters that would otherwise re-parse as markup.
///
/// An underscore between two word characters is left alone; it cannot open or
/// close emphasis there.
pub(crate) fn escape_markdown(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '\\' | '*' | '~' | '[' | ']' | '`' => {
                out.push('\\');
                out.push(c);
            }
            '_' => {
                let prev_word = i > 0 && chars[i - 1].is_alphanumeric();
                let next_word = chars.get(i + 1).is_some_and(|n| n.is_alphanumeric());
                if !(prev_word && next_word) {
                    out.push('\\');
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Wraps code in a backtick fence longer than any backtick run inside it.
pub(crate) fn code_span(content: &str) -> String {
    let mut longest = 0;
    let mut current = 0;
    for c in content.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    let fence = "`".repeat(longest + 1);

    let needs_padding = content.starts_with('`')
        || content.ends_with('`')
        || (content.len() >= 2
            && content.starts_with(' ')
            && content.ends_with(' ')
            && !content.chars().all(|c| c == ' '));
    let pad = if needs_padding { " " } else { "" };

    format!("{fence}{pad}{content}{pad}{fence}")
}
