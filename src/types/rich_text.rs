use super::Color;
use serde::{Deserialize, Serialize};

/// The full formatting state of a span.
///
/// Every flag is always present, so renderers never special-case missing keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: Color,
}

impl Annotations {
    /// Combines two annotation sets; a flag set on either side stays set.
    ///
    /// The color of `self` wins unless it is the default.
    pub fn merged_with(self, outer: Annotations) -> Annotations {
        Annotations {
            bold: self.bold || outer.bold,
            italic: self.italic || outer.italic,
            strikethrough: self.strikethrough || outer.strikethrough,
            underline: self.underline || outer.underline,
            code: self.code || outer.code,
            color: if self.color == Color::Default {
                outer.color
            } else {
                self.color
            },
        }
    }

    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Default::default()
        }
    }

    pub fn strikethrough() -> Self {
        Self {
            strikethrough: true,
            ..Default::default()
        }
    }

    pub fn code() -> Self {
        Self {
            code: true,
            ..Default::default()
        }
    }
}

/// A run of text sharing one annotation state and optional link target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    pub content: String,
    pub annotations: Annotations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl TextSpan {
    /// A span with no formatting and no link.
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            annotations: Annotations::default(),
            link: None,
        }
    }

    pub fn styled(content: impl Into<String>, annotations: Annotations) -> Self {
        Self {
            content: content.into(),
            annotations,
            link: None,
        }
    }

    pub fn with_link(mut self, url: impl Into<String>) -> Self {
        self.link = Some(url.into());
        self
    }

    /// Length in characters, the unit the segment cap is measured in.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Whether `other` can be appended to this span without changing meaning.
    pub fn can_merge_with(&self, other: &TextSpan) -> bool {
        self.annotations == other.annotations && self.link == other.link
    }
}

/// Concatenates the content of all spans, dropping formatting.
pub fn plain_text(spans: &[TextSpan]) -> String {
    spans.iter().map(|span| span.content.as_str()).collect()
}
