// src/parsing/inline.rs
//! Inline markdown to annotated text spans.
//!
//! The scanner walks the text once, left to right. At each special character it
//! tries, in order, an inline code span, a link, bold, strikethrough and italic.
//! A delimiter without a usable partner stays in the text as-is, so this never
//! fails. Emphasis recurses into its content and ORs its annotation onto
//! whatever the inner parse produced.

use crate::constants::RICH_TEXT_SEGMENT_CAP;
use crate::types::{Annotations, TextSpan};

/// Characters that a preceding backslash turns into plain text.
pub(crate) const ESCAPABLE: &[char] = &[
    '\\', '`', '*', '_', '~', '[', ']', '(', ')', '|', '#', '>', '<', '!', '-', '.', '+',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emphasis {
    Bold,
    Italic,
}

impl Emphasis {
    fn width(self) -> usize {
        match self {
            Emphasis::Bold => 2,
            Emphasis::Italic => 1,
        }
    }

    fn annotations(self) -> Annotations {
        match self {
            Emphasis::Bold => Annotations::bold(),
            Emphasis::Italic => Annotations::italic(),
        }
    }
}

/// Parses one run of inline markdown into spans.
///
/// Adjacent spans with the same formatting are merged, and any span longer than
/// the segment cap is split. Empty input yields a single empty plain span.
pub fn parse_inline(text: &str) -> Vec<TextSpan> {
    let chars: Vec<char> = text.chars().collect();
    let spans = parse_spans(&chars, Annotations::default(), None);
    normalize_spans(spans)
}

/// Splits plain text into unformatted spans no longer than the segment cap.
///
/// Concatenating the span contents gives back `text` exactly.
pub fn chunk_plain_text(text: &str) -> Vec<TextSpan> {
    if text.is_empty() {
        return Vec::new();
    }
    split_long_spans(vec![TextSpan::plain(text)], RICH_TEXT_SEGMENT_CAP)
}

fn parse_spans(chars: &[char], outer: Annotations, link: Option<&str>) -> Vec<TextSpan> {
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\\' {
            match chars.get(i + 1) {
                Some(&next) if ESCAPABLE.contains(&next) => {
                    plain.push(next);
                    i += 2;
                }
                _ => {
                    plain.push(c);
                    i += 1;
                }
            }
            continue;
        }

        let matched = match c {
            '`' => parse_code_span(chars, i, outer, link),
            '[' if link.is_none() => parse_link(chars, i, outer),
            '*' | '_' => parse_emphasis(chars, i, outer, link),
            '~' => parse_strikethrough(chars, i, outer, link),
            _ => None,
        };

        match matched {
            Some((inner, next)) => {
                flush_plain(&mut plain, &mut spans, outer, link);
                spans.extend(inner);
                i = next;
            }
            None => {
                let run = if matches!(c, '`' | '*' | '_' | '~') {
                    run_length(chars, i, c)
                } else {
                    1
                };
                plain.extend(&chars[i..i + run]);
                i += run;
            }
        }
    }

    flush_plain(&mut plain, &mut spans, outer, link);
    spans
}

fn flush_plain(plain: &mut String, spans: &mut Vec<TextSpan>, annotations: Annotations, link: Option<&str>) {
    if plain.is_empty() {
        return;
    }
    spans.push(TextSpan {
        content: std::mem::take(plain),
        annotations,
        link: link.map(str::to_string),
    });
}

fn run_length(chars: &[char], start: usize, c: char) -> usize {
    chars[start..].iter().take_while(|&&ch| ch == c).count()
}

/// Finds a backtick run of exactly `len` at or after `from`.
fn find_closing_backticks(chars: &[char], from: usize, len: usize) -> Option<usize> {
    let mut j = from;
    while j < chars.len() {
        if chars[j] == '`' {
            let run = run_length(chars, j, '`');
            if run == len {
                return Some(j);
            }
            j += run;
        } else {
            j += 1;
        }
    }
    None
}

/// Index just past a code span opening at `j`, or past the bare backtick run.
fn skip_code_span(chars: &[char], j: usize) -> usize {
    let run = run_length(chars, j, '`');
    match find_closing_backticks(chars, j + run, run) {
        Some(close) => close + run,
        None => j + run,
    }
}

fn parse_code_span(
    chars: &[char],
    i: usize,
    outer: Annotations,
    link: Option<&str>,
) -> Option<(Vec<TextSpan>, usize)> {
    let run = run_length(chars, i, '`');
    let start = i + run;
    let close = find_closing_backticks(chars, start, run)?;

    let mut content: String = chars[start..close].iter().collect();
    if content.len() >= 2
        && content.starts_with(' ')
        && content.ends_with(' ')
        && !content.chars().all(|c| c == ' ')
    {
        content = content[1..content.len() - 1].to_string();
    }

    let span = TextSpan {
        content,
        annotations: Annotations::code().merged_with(outer),
        link: link.map(str::to_string),
    };
    Some((vec![span], close + run))
}

fn parse_link(chars: &[char], i: usize, outer: Annotations) -> Option<(Vec<TextSpan>, usize)> {
    let mut j = i + 1;
    let mut depth = 0usize;
    loop {
        match chars.get(j)? {
            '\\' => j += 2,
            '`' => j = skip_code_span(chars, j),
            '[' => {
                depth += 1;
                j += 1;
            }
            ']' if depth == 0 => break,
            ']' => {
                depth -= 1;
                j += 1;
            }
            _ => j += 1,
        }
    }
    let label_end = j;
    if label_end == i + 1 || chars.get(label_end + 1) != Some(&'(') {
        return None;
    }

    let (url, next) = parse_link_destination(chars, label_end + 2)?;
    let label = parse_spans(&chars[i + 1..label_end], outer, Some(&url));
    Some((label, next))
}

/// Reads `url)` or `<url>)` starting at `start`; returns the url and the index after `)`.
fn parse_link_destination(chars: &[char], start: usize) -> Option<(String, usize)> {
    if chars.get(start) == Some(&'<') {
        let end = chars[start + 1..].iter().position(|&c| c == '>')? + start + 1;
        if chars.get(end + 1) != Some(&')') || end == start + 1 {
            return None;
        }
        return Some((chars[start + 1..end].iter().collect(), end + 2));
    }

    let mut depth = 0usize;
    let mut j = start;
    loop {
        let c = *chars.get(j)?;
        if c.is_whitespace() {
            return None;
        }
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => break,
            ')' => depth -= 1,
            _ => {}
        }
        j += 1;
    }
    if j == start {
        return None;
    }
    Some((chars[start..j].iter().collect(), j + 1))
}

fn parse_emphasis(
    chars: &[char],
    i: usize,
    outer: Annotations,
    link: Option<&str>,
) -> Option<(Vec<TextSpan>, usize)> {
    let delim = chars[i];
    let run = run_length(chars, i, delim);
    if run > 3 || chars.get(i + run).map_or(true, |c| c.is_whitespace()) {
        return None;
    }
    if delim == '_' && i > 0 && chars[i - 1].is_alphanumeric() {
        return None;
    }

    let candidates: &[Emphasis] = match run {
        1 => &[Emphasis::Italic],
        2 => &[Emphasis::Bold, Emphasis::Italic],
        // `***`: whichever closer comes first decides which marker is outermost.
        _ => match first_closing_run(chars, i + run, delim) {
            Some(2) => &[Emphasis::Italic, Emphasis::Bold],
            _ => &[Emphasis::Bold, Emphasis::Italic],
        },
    };

    for &kind in candidates {
        let content_start = i + kind.width();
        if let Some(close) = find_closing_delimiter(chars, content_start, delim, kind.width()) {
            if close > content_start {
                let annotations = kind.annotations().merged_with(outer);
                let inner = parse_spans(&chars[content_start..close], annotations, link);
                return Some((inner, close + kind.width()));
            }
        }
    }
    None
}

fn parse_strikethrough(
    chars: &[char],
    i: usize,
    outer: Annotations,
    link: Option<&str>,
) -> Option<(Vec<TextSpan>, usize)> {
    if run_length(chars, i, '~') != 2 || chars.get(i + 2).map_or(true, |c| c.is_whitespace()) {
        return None;
    }
    let content_start = i + 2;
    let close = find_closing_delimiter(chars, content_start, '~', 2)?;
    if close == content_start {
        return None;
    }
    let annotations = Annotations::strikethrough().merged_with(outer);
    let inner = parse_spans(&chars[content_start..close], annotations, link);
    Some((inner, close + 2))
}

/// Walks delimiter runs after `from` that could close emphasis, skipping escapes
/// and code spans, and hands each `(start, len, followed_by_word)` to `accept`.
fn scan_closing_runs<T>(
    chars: &[char],
    from: usize,
    delim: char,
    mut accept: impl FnMut(usize, usize, bool) -> Option<T>,
) -> Option<T> {
    let mut j = from;
    while j < chars.len() && chars[j] == delim {
        j += 1;
    }

    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            '`' => j = skip_code_span(chars, j),
            c if c == delim => {
                let len = run_length(chars, j, delim);
                let end = j + len;
                let preceded_by_space = chars[j - 1].is_whitespace();
                let followed_by_word = chars.get(end).is_some_and(|c| c.is_alphanumeric());
                let intraword_underscore = delim == '_' && followed_by_word;
                if !preceded_by_space && !intraword_underscore {
                    if let Some(found) = accept(j, len, followed_by_word) {
                        return Some(found);
                    }
                }
                j = end;
            }
            _ => j += 1,
        }
    }
    None
}

fn first_closing_run(chars: &[char], from: usize, delim: char) -> Option<usize> {
    scan_closing_runs(chars, from, delim, |_, len, _| Some(len))
}

/// Start index of the closing delimiter for a marker `width` characters wide.
///
/// Runs of even length cannot close a single-character marker: they belong to
/// a double marker nested inside. In a longer run, the closer takes the left end
/// when more text follows and the right end otherwise.
fn find_closing_delimiter(chars: &[char], from: usize, delim: char, width: usize) -> Option<usize> {
    scan_closing_runs(chars, from, delim, |start, len, followed_by_word| {
        let fits = if width == 1 { len % 2 == 1 } else { len >= width };
        if !fits {
            None
        } else if followed_by_word {
            Some(start)
        } else {
            Some(start + len - width)
        }
    })
}

/// Merges neighbouring spans that share formatting, drops empty ones, then
/// applies the segment cap.
pub(crate) fn normalize_spans(spans: Vec<TextSpan>) -> Vec<TextSpan> {
    let mut merged: Vec<TextSpan> = Vec::with_capacity(spans.len());
    for span in spans.into_iter().filter(|s| !s.content.is_empty()) {
        match merged.last_mut() {
            Some(last) if last.can_merge_with(&span) => last.content.push_str(&span.content),
            _ => merged.push(span),
        }
    }

    if merged.is_empty() {
        return vec![TextSpan::plain("")];
    }
    split_long_spans(merged, RICH_TEXT_SEGMENT_CAP)
}

/// Splits every span longer than `cap` characters, on character boundaries.
pub(crate) fn split_long_spans(spans: Vec<TextSpan>, cap: usize) -> Vec<TextSpan> {
    let mut out = Vec::with_capacity(spans.len());
    for span in spans {
        if span.char_len() <= cap {
            out.push(span);
            continue;
        }
        let chars: Vec<char> = span.content.chars().collect();
        for chunk in chars.chunks(cap) {
            out.push(TextSpan {
                content: chunk.iter().collect(),
                annotations: span.annotations,
                link: span.link.clone(),
            });
        }
    }
    out
}
