//! Terminal cell representation
//!
//! Each cell holds a Unicode scalar and the style it was written with. When
//! the style's element flag is set, the glyph's scalar value is instead an
//! index into the owning line's element list.

use serde::{Deserialize, Serialize};

use crate::style::Style;

/// A single addressable cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The glyph, or an element index when `style.element()` is set
    pub glyph: char,
    /// Display attributes
    pub style: Style,
}

impl Cell {
    /// The empty cell: a space with the default style
    pub const EMPTY: Cell = Cell {
        glyph: ' ',
        style: Style::DEFAULT,
    };

    /// Whether this cell's glyph refers into the line's element list
    pub fn is_element(&self) -> bool {
        self.style.element()
    }

    /// The element index this cell refers to, if any
    pub fn element_index(&self) -> Option<usize> {
        self.is_element().then_some(self.glyph as usize)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::EMPTY
    }
}
