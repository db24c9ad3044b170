//! Per-cell style attributes
//!
//! A [`Style`] is a small plain value copied into every cell: two colors plus
//! a word of packed flag bits. The screen keeps one current style and stamps
//! it onto cells as text is written; SGR sequences update the current style
//! through [`Style::apply_sgr`].

use serde::{Deserialize, Serialize};

use crate::color::Color;

const BOLD: u8 = 1 << 0;
const FAINT: u8 = 1 << 1;
const ITALIC: u8 = 1 << 2;
const UNDERLINE: u8 = 1 << 3;
const BLINK: u8 = 1 << 4;
const STRIKETHROUGH: u8 = 1 << 5;
const HYPERLINK: u8 = 1 << 6;
const ELEMENT: u8 = 1 << 7;

/// Display attributes for a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Style {
    fg: Color,
    bg: Color,
    flags: u8,
}

impl Style {
    /// The empty style: default colors, no flags
    pub const DEFAULT: Style = Style {
        fg: Color::Default,
        bg: Color::Default,
        flags: 0,
    };

    /// Foreground color
    pub fn fg(&self) -> Color {
        self.fg
    }

    /// Background color
    pub fn bg(&self) -> Color {
        self.bg
    }

    /// Bold text (SGR 1)
    pub fn bold(&self) -> bool {
        self.flags & BOLD != 0
    }

    /// Faint/dim text (SGR 2)
    pub fn faint(&self) -> bool {
        self.flags & FAINT != 0
    }

    /// Italic text (SGR 3)
    pub fn italic(&self) -> bool {
        self.flags & ITALIC != 0
    }

    /// Underlined text (SGR 4)
    pub fn underline(&self) -> bool {
        self.flags & UNDERLINE != 0
    }

    /// Blinking text (SGR 5)
    pub fn blink(&self) -> bool {
        self.flags & BLINK != 0
    }

    /// Strikethrough text (SGR 9)
    pub fn strikethrough(&self) -> bool {
        self.flags & STRIKETHROUGH != 0
    }

    /// Whether cells written with this style are hyperlinked (OSC 8)
    pub fn hyperlink(&self) -> bool {
        self.flags & HYPERLINK != 0
    }

    /// Set or clear the hyperlink flag
    pub fn set_hyperlink(&mut self, on: bool) {
        self.set_flag(HYPERLINK, on);
    }

    /// Whether the cell's glyph is an index into the line's element list
    pub fn element(&self) -> bool {
        self.flags & ELEMENT != 0
    }

    /// Set or clear the element flag
    pub fn set_element(&mut self, on: bool) {
        self.set_flag(ELEMENT, on);
    }

    /// True when the style would render as bare text (no classes, no inline
    /// styles). The hyperlink flag is not counted: linking is expressed by
    /// the surrounding anchor, not by the span.
    pub(crate) fn is_plain(&self) -> bool {
        self.flags & !HYPERLINK == 0 && self.fg == Color::Default && self.bg == Color::Default
    }

    fn set_flag(&mut self, flag: u8, on: bool) {
        if on {
            self.flags |= flag;
        } else {
            self.flags &= !flag;
        }
    }

    /// Apply SGR parameters to this style, returning the updated style.
    ///
    /// Parameters arrive as the raw strings collected from a CSI sequence.
    /// An empty parameter list is a full reset. Unknown parameters are
    /// skipped; a truncated extended-color form (`38;5;…` / `38;2;…`)
    /// abandons the rest of the list.
    pub fn apply_sgr(mut self, params: &[String]) -> Style {
        if params.is_empty() {
            return Style::DEFAULT;
        }

        let mut i = 0;
        while i < params.len() {
            let param = params[i].as_str();
            if param.is_empty() {
                self = Style::DEFAULT;
                i += 1;
                continue;
            }
            let Ok(code) = param.parse::<u16>() else {
                i += 1;
                continue;
            };
            match code {
                0 => self = Style::DEFAULT,
                1 => self.set_flag(BOLD, true),
                2 => self.set_flag(FAINT, true),
                3 => self.set_flag(ITALIC, true),
                4 => self.set_flag(UNDERLINE, true),
                5 => self.set_flag(BLINK, true),
                9 => self.set_flag(STRIKETHROUGH, true),
                21 | 22 => {
                    self.set_flag(BOLD, false);
                    self.set_flag(FAINT, false);
                }
                23 => self.set_flag(ITALIC, false),
                24 => self.set_flag(UNDERLINE, false),
                25 => self.set_flag(BLINK, false),
                29 => self.set_flag(STRIKETHROUGH, false),
                30..=37 => self.fg = Color::Indexed((code - 30) as u8),
                39 => self.fg = Color::Default,
                40..=47 => self.bg = Color::Indexed((code - 40) as u8),
                49 => self.bg = Color::Default,
                90..=97 => self.fg = Color::Indexed((code - 90 + 8) as u8),
                100..=107 => self.bg = Color::Indexed((code - 100 + 8) as u8),
                38 => match parse_extended_color(&params[i + 1..]) {
                    Some((color, consumed)) => {
                        self.fg = color;
                        i += consumed;
                    }
                    None => return self,
                },
                48 => match parse_extended_color(&params[i + 1..]) {
                    Some((color, consumed)) => {
                        self.bg = color;
                        i += consumed;
                    }
                    None => return self,
                },
                _ => {}
            }
            i += 1;
        }
        self
    }

    /// CSS classes for this style's flags and indexed colors
    pub(crate) fn css_classes(&self) -> Vec<String> {
        let mut classes = Vec::new();
        if self.bold() {
            classes.push("term-fg1".to_string());
        }
        if self.faint() {
            classes.push("term-fg2".to_string());
        }
        if self.italic() {
            classes.push("term-fg3".to_string());
        }
        if self.underline() {
            classes.push("term-fg4".to_string());
        }
        if self.blink() {
            classes.push("term-fg5".to_string());
        }
        if self.strikethrough() {
            classes.push("term-fg9".to_string());
        }
        if let Some(class) = self.fg.fg_class() {
            classes.push(class);
        }
        if let Some(class) = self.bg.bg_class() {
            classes.push(class);
        }
        classes
    }

    /// Inline CSS declarations for this style's RGB colors
    pub(crate) fn css_inline(&self) -> Vec<String> {
        let mut styles = Vec::new();
        if let Some(decl) = self.fg.fg_inline() {
            styles.push(decl);
        }
        if let Some(decl) = self.bg.bg_inline() {
            styles.push(decl);
        }
        styles
    }
}

/// Parse the tail of a `38`/`48` extended color: `5;n` or `2;r;g;b`.
/// Returns the color and how many parameters were consumed.
fn parse_extended_color(rest: &[String]) -> Option<(Color, usize)> {
    match rest.first().map(String::as_str) {
        Some("5") => {
            let index = rest.get(1)?.parse::<u8>().ok()?;
            Some((Color::Indexed(index), 2))
        }
        Some("2") => {
            let r = rest.get(1)?.parse::<u8>().ok()?;
            let g = rest.get(2)?.parse::<u8>().ok()?;
            let b = rest.get(3)?.parse::<u8>().ok()?;
            Some((Color::Rgb { r, g, b }, 4))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sgr(style: Style, params: &[&str]) -> Style {
        let params: Vec<String> = params.iter().map(|s| s.to_string()).collect();
        style.apply_sgr(&params)
    }

    #[test]
    fn test_default_is_plain() {
        let style = Style::default();
        assert!(style.is_plain());
        assert!(!style.bold());
        assert_eq!(style.fg(), Color::Default);
    }

    #[test]
    fn test_sgr_basic_colors() {
        let style = sgr(Style::default(), &["31"]);
        assert_eq!(style.fg(), Color::Indexed(1));
        let style = sgr(style, &["42"]);
        assert_eq!(style.bg(), Color::Indexed(2));
        assert_eq!(style.fg(), Color::Indexed(1));
    }

    #[test]
    fn test_sgr_bright_colors() {
        let style = sgr(Style::default(), &["91"]);
        assert_eq!(style.fg(), Color::Indexed(9));
        let style = sgr(Style::default(), &["103"]);
        assert_eq!(style.bg(), Color::Indexed(11));
    }

    #[test]
    fn test_sgr_reset() {
        let style = sgr(Style::default(), &["1", "31", "44"]);
        assert!(style.bold());
        let style = sgr(style, &["0"]);
        assert_eq!(style, Style::DEFAULT);
    }

    #[test]
    fn test_sgr_empty_is_reset() {
        let style = sgr(Style::default(), &["1", "35"]);
        assert_eq!(sgr(style, &[]), Style::DEFAULT);
    }

    #[test]
    fn test_sgr_reset_clears_hyperlink() {
        let mut style = Style::default();
        style.set_hyperlink(true);
        assert!(sgr(style, &["0"]).is_plain());
    }

    #[test]
    fn test_sgr_decorations() {
        let style = sgr(Style::default(), &["1", "3", "4", "9"]);
        assert!(style.bold());
        assert!(style.italic());
        assert!(style.underline());
        assert!(style.strikethrough());

        let style = sgr(style, &["22", "23", "24", "29"]);
        assert!(style.is_plain());
    }

    #[test]
    fn test_sgr_256_color() {
        let style = sgr(Style::default(), &["38", "5", "208"]);
        assert_eq!(style.fg(), Color::Indexed(208));
        let style = sgr(style, &["48", "5", "17"]);
        assert_eq!(style.bg(), Color::Indexed(17));
    }

    #[test]
    fn test_sgr_rgb_color() {
        let style = sgr(Style::default(), &["38", "2", "255", "128", "0"]);
        assert_eq!(style.fg(), Color::Rgb { r: 255, g: 128, b: 0 });
    }

    #[test]
    fn test_sgr_extended_color_consumes_params() {
        // The bold after the RGB triple must still be applied
        let style = sgr(Style::default(), &["38", "2", "10", "20", "30", "1"]);
        assert!(style.bold());
        assert_eq!(style.fg(), Color::Rgb { r: 10, g: 20, b: 30 });
    }

    #[test]
    fn test_sgr_truncated_extended_color_aborts() {
        let style = sgr(Style::default(), &["31", "38", "5"]);
        assert_eq!(style.fg(), Color::Indexed(1));
        let style = sgr(Style::default(), &["38", "2", "1", "2"]);
        assert_eq!(style.fg(), Color::Default);
    }

    #[test]
    fn test_sgr_unknown_params_skipped() {
        let style = sgr(Style::default(), &["77", "31"]);
        assert_eq!(style.fg(), Color::Indexed(1));
    }

    #[test]
    fn test_css_classes() {
        let style = sgr(Style::default(), &["1", "31", "42"]);
        assert_eq!(style.css_classes(), vec!["term-fg1", "term-fg31", "term-bg42"]);
    }

    #[test]
    fn test_css_inline() {
        let style = sgr(Style::default(), &["38", "2", "1", "2", "3"]);
        assert_eq!(style.css_inline(), vec!["color:rgb(1,2,3)"]);
    }

    #[test]
    fn test_element_flag_roundtrip() {
        let mut style = Style::default();
        style.set_element(true);
        assert!(style.element());
        style.set_element(false);
        assert!(!style.element());
    }
}
