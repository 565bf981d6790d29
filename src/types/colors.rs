use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type-safe color enum instead of strings.
///
/// Serializes to the tags the Notion API uses (`"red"`, `"red_background"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    #[default]
    Default,
    Gray,
    Brown,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    GrayBackground,
    BrownBackground,
    RedBackground,
    OrangeBackground,
    YellowBackground,
    GreenBackground,
    BlueBackground,
    PurpleBackground,
    PinkBackground,
}

impl std::str::FromStr for Color {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Color::Default),
            "gray" => Ok(Color::Gray),
            "brown" => Ok(Color::Brown),
            "red" => Ok(Color::Red),
            "orange" => Ok(Color::Orange),
            "yellow" => Ok(Color::Yellow),
            "green" => Ok(Color::Green),
            "blue" => Ok(Color::Blue),
            "purple" => Ok(Color::Purple),
            "pink" => Ok(Color::Pink),
            "gray_background" => Ok(Color::GrayBackground),
            "brown_background" => Ok(Color::BrownBackground),
            "red_background" => Ok(Color::RedBackground),
            "orange_background" => Ok(Color::OrangeBackground),
            "yellow_background" => Ok(Color::YellowBackground),
            "green_background" => Ok(Color::GreenBackground),
            "blue_background" => Ok(Color::BlueBackground),
            "purple_background" => Ok(Color::PurpleBackground),
            "pink_background" => Ok(Color::PinkBackground),
            _ => Err(ValidationError::InvalidColor(s.to_string())),
        }
    }
}

impl Color {
    /// Parses a color tag from fetched content, falling back to `Default`.
    ///
    /// Fetched documents must never fail to load because the API grew a new color.
    pub fn from_api_str(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            log::debug!("Unknown color: {}", s);
            Color::Default
        })
    }

    /// Convert to the API string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Default => "default",
            Color::Gray => "gray",
            Color::Brown => "brown",
            Color::Red => "red",
            Color::Orange => "orange",
            Color::Yellow => "yellow",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Purple => "purple",
            Color::Pink => "pink",
            Color::GrayBackground => "gray_background",
            Color::BrownBackground => "brown_background",
            Color::RedBackground => "red_background",
            Color::OrangeBackground => "orange_background",
            Color::YellowBackground => "yellow_background",
            Color::GreenBackground => "green_background",
            Color::BlueBackground => "blue_background",
            Color::PurpleBackground => "purple_background",
            Color::PinkBackground => "pink_background",
        }
    }

    /// The hue without the background distinction (`RedBackground` -> `Red`).
    pub fn base_hue(&self) -> Color {
        match self {
            Color::GrayBackground => Color::Gray,
            Color::BrownBackground => Color::Brown,
            Color::RedBackground => Color::Red,
            Color::OrangeBackground => Color::Orange,
            Color::YellowBackground => Color::Yellow,
            Color::GreenBackground => Color::Green,
            Color::BlueBackground => Color::Blue,
            Color::PurpleBackground => Color::Purple,
            Color::PinkBackground => Color::Pink,
            other => *other,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_color_parsing() {
        assert_eq!(Color::from_str("red").unwrap(), Color::Red);
        assert_eq!(
            Color::from_str("gray_background").unwrap(),
            Color::GrayBackground
        );
        assert!(Color::from_str("invalid").is_err());
    }

    #[test]
    fn test_lenient_api_parsing() {
        assert_eq!(Color::from_api_str("teal_background"), Color::Default);
        assert_eq!(Color::from_api_str("blue"), Color::Blue);
    }

    #[test]
    fn test_serde_uses_api_tags() {
        let json = serde_json::to_string(&Color::YellowBackground).unwrap();
        assert_eq!(json, "\"yellow_background\"");
    }

    #[test]
    fn test_base_hue() {
        assert_eq!(Color::OrangeBackground.base_hue(), Color::Orange);
        assert_eq!(Color::Blue.base_hue(), Color::Blue);
        assert_eq!(Color::Default.base_hue(), Color::Default);
    }
}
