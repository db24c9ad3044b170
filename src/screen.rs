//! Terminal screen - the main interface for terminal state
//!
//! The screen owns the scroll buffer, cursor, current style and the
//! streaming parser. Bytes go in through [`std::io::Write`]; the rendered
//! state comes out through [`Screen::as_html`] and
//! [`Screen::as_plain_text`].
//!
//! The viewport is the trailing `lines` entries of the buffer. Cursor motion
//! commands clamp to the viewport and count clamping events; content writes
//! are unclamped and may grow a line past the window width.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::mem;

use crate::cell::Cell;
use crate::element::Element;
use crate::error::{Result, ScreenError};
use crate::line::{Line, END_OF_LINE};
use crate::parser::Parser;
use crate::style::Style;

const DEFAULT_COLS: usize = 160;
const DEFAULT_LINES: usize = 100;

/// A terminal screen. Tracks cursor position, style, content and size.
pub struct Screen {
    /// Cursor position within the viewport
    x: usize,
    y: usize,

    /// Scroll buffer; the viewport is its last `lines` entries
    buffer: Vec<Line>,

    /// Current style stamped onto written cells
    style: Style,

    /// Current URL for OSC 8 hyperlinking
    url_brush: String,

    /// Streaming parser state
    parser: Parser,

    /// Upper bound on buffer retention and window height; 0 = unbounded
    max_lines: usize,

    /// Upper bound on window width; 0 = unbounded
    max_columns: usize,

    /// Current window size, bounding cursor movement. Content is not
    /// bounded: a line written with plain text can be arbitrarily long.
    cols: usize,
    lines: usize,

    /// Optional callback invoked with each line's HTML as it scrolls out of
    /// the top of a capped buffer, just before the line is dropped. Must not
    /// write to this screen.
    pub scroll_out_func: Option<Box<dyn FnMut(&str)>>,

    /// Count of lines that scrolled off the top
    pub lines_scrolled_out: usize,
    /// Count of up-motions that clamped at the top of the viewport
    pub cursor_up_oob: usize,
    /// Count of down-motions that clamped at the bottom of the viewport
    pub cursor_down_oob: usize,
    /// Count of forward-motions that clamped at the right edge
    pub cursor_fwd_oob: usize,
    /// Count of back-motions that clamped at the left edge
    pub cursor_back_oob: usize,
}

impl Screen {
    /// Create a screen with the default 160x100 window
    pub fn new() -> Screen {
        Screen {
            x: 0,
            y: 0,
            buffer: Vec::new(),
            style: Style::default(),
            url_brush: String::new(),
            parser: Parser::default(),
            max_lines: 0,
            max_columns: 0,
            cols: DEFAULT_COLS,
            lines: DEFAULT_LINES,
            scroll_out_func: None,
            lines_scrolled_out: 0,
            cursor_up_oob: 0,
            cursor_down_oob: 0,
            cursor_fwd_oob: 0,
            cursor_back_oob: 0,
        }
    }

    /// Start building a screen with non-default configuration
    pub fn builder() -> ScreenBuilder {
        ScreenBuilder {
            screen: Screen::new(),
            error: None,
        }
    }

    /// Change the window size.
    ///
    /// Rejects zero dimensions and values above the configured maxima. Does
    /// not rewrap existing content.
    pub fn set_size(&mut self, cols: usize, lines: usize) -> Result<()> {
        if cols == 0 || lines == 0 {
            return Err(ScreenError::InvalidSize { cols, lines });
        }
        if self.max_columns > 0 && cols > self.max_columns {
            return Err(ScreenError::ColsExceedMax {
                cols,
                max: self.max_columns,
            });
        }
        if self.max_lines > 0 && lines > self.max_lines {
            return Err(ScreenError::LinesExceedMax {
                lines,
                max: self.max_lines,
            });
        }
        self.cols = cols;
        self.lines = lines;
        Ok(())
    }

    /// Current window size as (cols, lines)
    pub fn size(&self) -> (usize, usize) {
        (self.cols, self.lines)
    }

    /// Cursor position as (x, y), relative to the viewport
    pub fn cursor(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    /// Number of lines currently held in the scroll buffer
    pub fn line_count(&self) -> usize {
        self.buffer.len()
    }

    /// A line of the scroll buffer by absolute index
    pub fn line(&self, index: usize) -> Option<&Line> {
        self.buffer.get(index)
    }

    /// Render the whole buffer as newline-joined HTML
    pub fn as_html(&self) -> String {
        let lines: Vec<String> = self.buffer.iter().map(Line::as_html).collect();
        lines.join("\n")
    }

    /// Render the whole buffer as newline-joined plain text
    pub fn as_plain_text(&self) -> String {
        let lines: Vec<String> = self.buffer.iter().map(Line::as_plain).collect();
        lines.join("\n")
    }

    /// Index within the buffer where the viewport begins
    fn top(&self) -> usize {
        self.buffer.len().saturating_sub(self.lines)
    }

    /// The line the cursor is on, if it has been allocated
    fn current_line_mut(&mut self) -> Option<&mut Line> {
        let idx = self.top() + self.y;
        self.buffer.get_mut(idx)
    }

    /// The line the cursor is on, allocating lines and padding cells as
    /// needed so the cell at the cursor's column exists.
    fn current_line_for_writing(&mut self) -> &mut Line {
        while self.top() + self.y >= self.buffer.len() {
            // Without a cap in effect, or below it, grow the buffer. The
            // viewport is the buffer's tail, so growth past the window
            // height slides the viewport down; compensate by moving the
            // cursor up until it is back in range.
            if self.max_lines == 0 || self.buffer.len() + 1 <= self.max_lines {
                self.buffer.push(Line::with_capacity(self.cols));
                if self.y >= self.lines {
                    self.y -= 1;
                }
                continue;
            }

            // The cap is reached: evict the top line, recycling its cell
            // storage as the new tail line.
            if let Some(func) = self.scroll_out_func.as_mut() {
                func(&self.buffer[0].as_html());
            }
            self.lines_scrolled_out += 1;

            let mut recycled = self.buffer.remove(0);
            recycled.reset_for_reuse();
            self.buffer.push(recycled);
            self.y -= 1;
        }

        let x = self.x;
        let idx = self.top() + self.y;
        let line = &mut self.buffer[idx];
        if line.cells.len() <= x {
            line.cells.resize(x + 1, Cell::EMPTY);
        }
        line
    }

    /// Write a glyph at the cursor without moving it
    fn write_glyph(&mut self, glyph: char) {
        let x = self.x;
        let style = self.style;
        let url = style.hyperlink().then(|| self.url_brush.clone());
        let line = self.current_line_for_writing();
        line.cells[x] = Cell { glyph, style };
        if let Some(url) = url {
            line.set_hyperlink(x, url);
        }
    }

    /// Write a glyph at the cursor and advance. The cursor is deliberately
    /// not clamped here: content may run past the window width.
    pub(crate) fn append(&mut self, glyph: char) {
        self.write_glyph(glyph);
        self.x += 1;
    }

    /// Append every character of `text`
    pub(crate) fn append_str(&mut self, text: &str) {
        for glyph in text.chars() {
            self.append(glyph);
        }
    }

    /// Embed an element at the cursor and advance
    pub(crate) fn append_element(&mut self, element: Element) {
        let x = self.x;
        let mut style = self.style;
        style.set_element(true);
        let line = self.current_line_for_writing();
        let idx = line.add_element(element);
        if let Some(glyph) = char::from_u32(idx as u32) {
            line.cells[x] = Cell { glyph, style };
        }
        self.x += 1;
    }

    /// Merge metadata into the current line under `namespace`
    pub(crate) fn set_line_metadata(&mut self, namespace: &str, data: HashMap<String, String>) {
        self.current_line_for_writing().set_metadata(namespace, data);
    }

    /// Set or clear the OSC 8 link brush. A non-empty URI paints subsequent
    /// cells with a hyperlink; an empty URI stops painting.
    pub(crate) fn set_link_brush(&mut self, uri: &str) {
        if uri.is_empty() {
            self.style.set_hyperlink(false);
        } else {
            self.url_brush = uri.to_string();
            self.style.set_hyperlink(true);
        }
    }

    /// Clear the line the cursor is on, if it exists
    pub(crate) fn clear_current_line(&mut self) {
        if let Some(line) = self.current_line_mut() {
            line.clear_range(0, END_OF_LINE);
        }
    }

    pub(crate) fn new_line(&mut self) {
        self.x = 0;
        self.y += 1;
    }

    pub(crate) fn rev_new_line(&mut self) {
        if self.y > 0 {
            self.y -= 1;
        }
    }

    pub(crate) fn carriage_return(&mut self) {
        self.x = 0;
    }

    pub(crate) fn backspace(&mut self) {
        if self.x > 0 {
            self.x -= 1;
        }
    }

    /// Restore a cursor position saved by DECSC
    pub(crate) fn set_cursor(&mut self, position: (usize, usize)) {
        self.x = position.0;
        self.y = position.1;
    }

    // Cursor motion commands clamp to the window and count each clamp.
    // After vertical motion the column is wrapped at the window width: if a
    // prior long line pushed the cursor past it, the cursor re-enters the
    // window at the wrapped column, which is what iTerm2 does.

    fn up(&mut self, param: &str) {
        let mut y = (self.y as i64).saturating_sub(ansi_int(param));
        if y < 0 {
            self.cursor_up_oob += 1;
            y = 0;
        }
        self.y = y as usize;
        self.x %= self.cols;
    }

    fn down(&mut self, param: &str) {
        let mut y = (self.y as i64).saturating_add(ansi_int(param));
        if y >= self.lines as i64 {
            self.cursor_down_oob += 1;
            y = self.lines as i64 - 1;
        }
        self.y = y as usize;
        self.x %= self.cols;
    }

    fn forward(&mut self, param: &str) {
        let mut x = (self.x as i64).saturating_add(ansi_int(param));
        if x >= self.cols as i64 {
            self.cursor_fwd_oob += 1;
            x = self.cols as i64 - 1;
        }
        self.x = x as usize;
    }

    fn backward(&mut self, param: &str) {
        let mut x = (self.x as i64).saturating_sub(ansi_int(param));
        if x < 0 {
            self.cursor_back_oob += 1;
            x = 0;
        }
        self.x = x as usize;
    }

    /// Apply a CSI sequence to the screen
    pub(crate) fn apply_escape(&mut self, code: char, instructions: &[String]) {
        let inst = |i: usize| instructions.get(i).map(String::as_str).unwrap_or("");

        if inst(0).starts_with('?') {
            // Private-mode sequences: cursor visibility, focus reporting,
            // alternate screen, bracketed paste. None are implemented.
            tracing::debug!(%code, params = ?instructions, "ignoring private control sequence");
            return;
        }

        match code {
            'A' => self.up(inst(0)),

            'B' => self.down(inst(0)),

            'C' => self.forward(inst(0)),

            'D' => self.backward(inst(0)),

            'E' => {
                // Next line: to the start of the line n down
                self.x = 0;
                self.down(inst(0));
            }

            'F' => {
                // Previous line: to the start of the line n up
                self.x = 0;
                self.up(inst(0));
            }

            'G' => {
                // Horizontal absolute: to column n (1-based, default 1)
                let x = ansi_int(inst(0)).saturating_sub(1);
                self.x = x.clamp(0, self.cols as i64 - 1) as usize;
            }

            'H' => {
                // Cursor position: row n, column m (1-based, default 1;1)
                let y = ansi_int(inst(0)).saturating_sub(1);
                self.y = y.clamp(0, self.lines as i64 - 1) as usize;
                let x = ansi_int(inst(1)).saturating_sub(1);
                self.x = x.clamp(0, self.cols as i64 - 1) as usize;
            }

            'J' => self.erase_in_display(inst(0)),

            'K' => self.erase_in_line(inst(0)),

            'M' => self.style = self.style.apply_sgr(instructions),

            _ => {}
        }
    }

    fn erase_in_display(&mut self, mode: &str) {
        match mode {
            "0" | "" => {
                // Erase from the cursor to the end of the screen. The
                // viewport is the buffer's tail, so the part below the
                // cursor can simply be truncated away.
                let x = self.x;
                if let Some(line) = self.current_line_mut() {
                    line.clear_range(x, END_OF_LINE);
                }
                let yidx = self.top() + self.y;
                if yidx >= self.buffer.len() {
                    return;
                }
                self.buffer.truncate(yidx + 1);
            }
            "1" => {
                // Erase from the start of the screen to the cursor. The
                // lines above become blank; the cursor stays still.
                let x = self.x;
                if let Some(line) = self.current_line_mut() {
                    line.clear_range(0, x);
                }
                let top = self.top();
                let end = (top + self.y).min(self.buffer.len());
                for line in &mut self.buffer[top..end] {
                    line.clear_all();
                }
            }
            "2" => {
                // Erase the viewport. Unlike hardware terminals the cursor
                // is reset to the origin.
                let top = self.top();
                self.buffer.truncate(top);
                self.x = 0;
                self.y = 0;
            }
            "3" => {
                // Erase everything including scrollback.
                self.buffer.clear();
                self.x = 0;
                self.y = 0;
            }
            _ => {}
        }
    }

    fn erase_in_line(&mut self, mode: &str) {
        let x = self.x;
        let Some(line) = self.current_line_mut() else {
            return;
        };
        match mode {
            "0" | "" => line.clear_range(x, END_OF_LINE),
            "1" => line.clear_range(0, x),
            "2" => line.clear_all(),
            _ => {}
        }
    }
}

impl Default for Screen {
    fn default() -> Self {
        Screen::new()
    }
}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Screen")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("cols", &self.cols)
            .field("lines", &self.lines)
            .field("max_columns", &self.max_columns)
            .field("max_lines", &self.max_lines)
            .field("buffer", &self.buffer)
            .finish_non_exhaustive()
    }
}

impl io::Write for Screen {
    /// Feed ANSI text to the screen. Always consumes the whole buffer and
    /// never fails; malformed input degrades to literal text.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut parser = mem::take(&mut self.parser);
        parser.parse_to_screen(self, buf);
        self.parser = parser;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Builder for [`Screen`] configuration.
///
/// Calls apply in order: `size` is validated against any maxima already
/// set, and `max_size` clamps an already-configured size down to the new
/// caps. The first failure is reported by [`ScreenBuilder::build`].
pub struct ScreenBuilder {
    screen: Screen,
    error: Option<ScreenError>,
}

impl ScreenBuilder {
    /// Set the initial window size
    pub fn size(mut self, cols: usize, lines: usize) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.screen.set_size(cols, lines) {
                self.error = Some(err);
            }
        }
        self
    }

    /// Set the size limits. `max_lines` also bounds scrollback retention;
    /// either value may be 0 for "unbounded".
    pub fn max_size(mut self, max_columns: usize, max_lines: usize) -> Self {
        if self.error.is_some() {
            return self;
        }
        self.screen.max_columns = max_columns;
        self.screen.max_lines = max_lines;
        if max_columns > 0 {
            self.screen.cols = self.screen.cols.min(max_columns);
        }
        if max_lines > 0 {
            self.screen.lines = self.screen.lines.min(max_lines);
        }
        self
    }

    /// Finish building the screen
    pub fn build(self) -> Result<Screen> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.screen),
        }
    }
}

/// Parse an ANSI numeric parameter. Empty or malformed parameters default
/// to 1.
fn ansi_int(s: &str) -> i64 {
    if s.is_empty() {
        return 1;
    }
    s.parse().unwrap_or(1)
}
