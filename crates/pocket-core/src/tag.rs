//! Color tags for notes and credentials

use serde::{Deserialize, Serialize};

/// Color tag; `None` renders as the neutral background
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TagColor {
    /// No color (default)
    #[default]
    None = 0,
    /// Red
    Red = 1,
    /// Orange
    Orange = 2,
    /// Yellow
    Yellow = 3,
    /// Green
    Green = 4,
    /// Blue
    Blue = 5,
    /// Purple
    Purple = 6,
}

impl TagColor {
    /// Get tag from its stored index; out-of-range values map to `None`
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => TagColor::Red,
            2 => TagColor::Orange,
            3 => TagColor::Yellow,
            4 => TagColor::Green,
            5 => TagColor::Blue,
            6 => TagColor::Purple,
            _ => TagColor::None,
        }
    }

    /// Parse the legacy string encoding (`"0"`..`"6"`)
    pub fn from_stored(value: &str) -> Self {
        value
            .trim()
            .parse::<u8>()
            .map(Self::from_u8)
            .unwrap_or_default()
    }

    /// Get as u8
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// RGB components
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            TagColor::None => (242, 242, 242),
            TagColor::Red => (238, 75, 72),
            TagColor::Orange => (245, 165, 81),
            TagColor::Yellow => (245, 206, 86),
            TagColor::Green => (104, 202, 71),
            TagColor::Blue => (87, 189, 248),
            TagColor::Purple => (213, 140, 231),
        }
    }

    /// Hex color code
    pub fn hex_color(&self) -> String {
        let (r, g, b) = self.rgb();
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            TagColor::None => "None",
            TagColor::Red => "Red",
            TagColor::Orange => "Orange",
            TagColor::Yellow => "Yellow",
            TagColor::Green => "Green",
            TagColor::Blue => "Blue",
            TagColor::Purple => "Purple",
        }
    }

    /// Get all tags in picker order
    pub fn all() -> &'static [TagColor] {
        &[
            TagColor::None,
            TagColor::Red,
            TagColor::Orange,
            TagColor::Yellow,
            TagColor::Green,
            TagColor::Blue,
            TagColor::Purple,
        ]
    }
}
