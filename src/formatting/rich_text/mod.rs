// src/formatting/rich_text/mod.rs
//! Renders annotated text spans back into inline markdown.
//!
//! This is the inverse of `parsing::parse_inline`: for anything that parser
//! produced, parsing the rendered text again yields the same spans.

mod annotations;

use crate::types::TextSpan;
use annotations::{code_span, MarkdownStyleRenderer, Marker, StyledUnit};

pub(crate) use annotations::escape_markdown;

/// Formats spans as inline markdown.
///
/// Consecutive spans sharing a link become one `[label](url)`; emphasis shared
/// by every span of a link wraps the whole link.
pub fn render_inline(spans: &[TextSpan]) -> String {
    let mut units = Vec::with_capacity(spans.len());
    let mut index = 0;

    while index < spans.len() {
        match &spans[index].link {
            Some(url) => {
                let group_len = spans[index..]
                    .iter()
                    .take_while(|s| s.link.as_ref() == Some(url))
                    .count();
                let group = &spans[index..index + group_len];
                units.push(link_unit(group, url));
                index += group_len;
            }
            None => {
                units.extend(span_unit(&spans[index], &[]));
                index += 1;
            }
        }
    }

    MarkdownStyleRenderer::render(&units)
}

fn span_unit(span: &TextSpan, exclude: &[Marker]) -> Option<StyledUnit> {
    if span.content.is_empty() {
        return None;
    }
    let code = span.annotations.code;
    Some(StyledUnit {
        text: if code {
            code_span(&span.content)
        } else {
            escape_markdown(&span.content)
        },
        markers: Marker::from_annotations(&span.annotations, exclude),
        is_blank: !code && span.content.trim().is_empty(),
    })
}

fn link_unit(group: &[TextSpan], url: &str) -> StyledUnit {
    let shared: Vec<Marker> = Marker::ALL
        .into_iter()
        .filter(|m| {
            group
                .iter()
                .all(|s| Marker::from_annotations(&s.annotations, &[]).contains(m))
        })
        .collect();

    let label_units: Vec<StyledUnit> = group
        .iter()
        .filter_map(|s| span_unit(s, &shared))
        .collect();
    let mut label = MarkdownStyleRenderer::render(&label_units);
    if label.is_empty() {
        label = escape_markdown(url);
    }

    StyledUnit {
        text: format!("[{}]({})", label, link_destination(url)),
        markers: shared,
        is_blank: false,
    }
}

/// Angle-brackets a destination that would not survive bare.
fn link_destination(url: &str) -> String {
    let mut depth = 0i32;
    let mut balanced = true;
    for c in url.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    balanced = false;
                }
            }
            _ => {}
        }
    }
    if !balanced || depth != 0 || url.chars().any(char::is_whitespace) {
        format!("<{}>", url)
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::parse_inline;
    use crate::types::{Annotations, Color};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_and_styled() {
        let spans = vec![
            TextSpan::plain("a "),
            TextSpan::styled("b", Annotations::bold()),
            TextSpan::plain(" "),
            TextSpan::styled("c", Annotations::code().merged_with(Annotations::bold())),
        ];
        assert_eq!(render_inline(&spans), "a **b** **`c`**");
    }

    #[test]
    fn test_nesting_order() {
        let all = Annotations {
            bold: true,
            italic: true,
            strikethrough: true,
            code: true,
            ..Default::default()
        };
        assert_eq!(render_inline(&[TextSpan::styled("x", all)]), "~~***`x`***~~");
    }

    #[test]
    fn test_link_groups() {
        let spans = vec![
            TextSpan::plain("the ").with_link("https://a.io"),
            TextSpan::styled("docs", Annotations::bold()).with_link("https://a.io"),
        ];
        assert_eq!(render_inline(&spans), "[the **docs**](https://a.io)");

        let shared = vec![
            TextSpan::styled("a ", Annotations::bold()),
            TextSpan::styled("b", Annotations::bold()).with_link("https://b.io"),
        ];
        assert_eq!(render_inline(&shared), "**a [b](https://b.io)**");
    }

    #[test]
    fn test_underline_and_color_are_dropped() {
        let span = TextSpan::styled(
            "u",
            Annotations {
                underline: true,
                color: Color::Red,
                ..Default::default()
            },
        );
        assert_eq!(render_inline(&[span]), "u");
    }

    #[test]
    fn test_backslashes_escaped() {
        assert_eq!(render_inline(&[TextSpan::plain(r"C:\dir")]), r"C:\\dir");
    }

    #[test]
    fn test_awkward_destinations() {
        let span = TextSpan::plain("x").with_link("https://a.io/has space");
        assert_eq!(render_inline(&[span]), "[x](<https://a.io/has space>)");
    }

    #[test]
    fn test_reparse_is_stable() {
        let inputs = [
            "plain text",
            "**bold** and *italic* and ~~strike~~",
            "***both*** then `code` and [a **link**](https://x.io)",
            "**a *b* c** d",
            "*a***b**",
            "escaped \\* star and snake_case",
            "`` a`b ``",
            "~~**x**~~y",
            "_note_**(b)**",
            "__a__*(b)*",
            "***x***__(y)__",
        ];
        for input in inputs {
            let parsed = parse_inline(input);
            let rendered = render_inline(&parsed);
            assert_eq!(parse_inline(&rendered), parsed, "input: {input}, rendered: {rendered}");
        }
    }
}
