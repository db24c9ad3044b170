//! Color representation for terminal cells
//!
//! Supports:
//! - Default foreground/background
//! - 16 standard ANSI colors (0-15)
//! - 256-color palette (0-255)
//! - 24-bit true color (RGB)
//!
//! Colors render to CSS: the indexed palette maps to stylesheet classes so a
//! theme can recolor output, while RGB colors become inline styles.

use serde::{Deserialize, Serialize};

/// Color representation supporting all terminal color modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Color {
    /// Default terminal color (foreground or background)
    #[default]
    Default,
    /// Indexed color (0-255)
    /// 0-7: standard colors
    /// 8-15: bright colors
    /// 16-231: 6x6x6 color cube
    /// 232-255: grayscale
    Indexed(u8),
    /// 24-bit RGB color
    Rgb { r: u8, g: u8, b: u8 },
}

impl Color {
    /// Create a new indexed color
    pub fn indexed(index: u8) -> Self {
        Color::Indexed(index)
    }

    /// Create a new RGB color
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// CSS class when used as a foreground, if class-representable
    pub(crate) fn fg_class(self) -> Option<String> {
        match self {
            Color::Default | Color::Rgb { .. } => None,
            Color::Indexed(n @ 0..=7) => Some(format!("term-fg3{n}")),
            Color::Indexed(n @ 8..=15) => Some(format!("term-fg9{}", n - 8)),
            Color::Indexed(n) => Some(format!("term-fgx{n}")),
        }
    }

    /// CSS class when used as a background, if class-representable
    pub(crate) fn bg_class(self) -> Option<String> {
        match self {
            Color::Default | Color::Rgb { .. } => None,
            Color::Indexed(n @ 0..=7) => Some(format!("term-bg4{n}")),
            Color::Indexed(n @ 8..=15) => Some(format!("term-bg10{}", n - 8)),
            Color::Indexed(n) => Some(format!("term-bgx{n}")),
        }
    }

    /// Inline CSS declaration when used as a foreground (RGB only)
    pub(crate) fn fg_inline(self) -> Option<String> {
        match self {
            Color::Rgb { r, g, b } => Some(format!("color:rgb({r},{g},{b})")),
            _ => None,
        }
    }

    /// Inline CSS declaration when used as a background (RGB only)
    pub(crate) fn bg_inline(self) -> Option<String> {
        match self {
            Color::Rgb { r, g, b } => Some(format!("background-color:rgb({r},{g},{b})")),
            _ => None,
        }
    }
}
