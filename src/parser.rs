//! Streaming ANSI escape sequence parser
//!
//! The parser consumes bytes incrementally and drives the screen directly.
//! It keeps a residual byte buffer: when a write ends in the middle of an
//! escape sequence (or a multi-byte UTF-8 scalar), the unfinished suffix is
//! retained and the next write resumes exactly where this one stopped, so
//! any split of a byte stream produces the same screen state as the
//! unsplit stream.
//!
//! How the state machine works:
//!
//! We start in Normal mode, where most input is written straight to the
//! screen and cursor-moving control characters are forwarded to it. An
//! escape character switches to Escape mode, where the next character
//! selects a control sequence (`[`), an operating system command (`]`), a
//! charset designation (`(` or `)`), an application program command (`_`),
//! or one of the direct instructions (`M`, `7`, `8`). Anything else is a
//! false alarm: the parser rewinds to where the escape began and carries on
//! in Normal mode.
//!
//! In Control mode, parameter characters accumulate until a final letter
//! dispatches the sequence to the screen. In OSC and APC modes, everything
//! up to a BEL or a two-byte ST (`ESC \`) is captured and handed to the
//! element or Buildkite decoder. Charset mode discards a single character.

use crate::apc::{parse_buildkite_apc, BK_NAMESPACE};
use crate::element::{parse_element_sequence, ElementKind};
use crate::screen::Screen;
use crate::utf8::{decode_scalar, Utf8Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    Normal,
    Escape,
    Control,
    Osc,
    OscEsc,
    Charset,
    Apc,
    ApcEsc,
}

/// Stateful streaming ANSI parser
#[derive(Debug, Default)]
pub(crate) struct Parser {
    mode: Mode,
    buffer: Vec<u8>,
    cursor: usize,
    escape_started_at: usize,
    instructions: Vec<String>,
    instruction_started_at: usize,
    save_position: (usize, usize),

    /// Running absolute timestamp for Buildkite APC `dt=` deltas
    last_timestamp: i64,
}

impl Parser {
    /// Feed `input` through the state machine, mutating `screen`.
    pub(crate) fn parse_to_screen(&mut self, screen: &mut Screen, input: &[u8]) {
        self.buffer.extend_from_slice(input);

        while self.cursor < self.buffer.len() {
            let (char, char_len) = match decode_scalar(&self.buffer[self.cursor..]) {
                Utf8Step::Complete(c, len) => (c, len),
                // A partial scalar at the end of the buffer: keep the bytes
                // and wait for more, like an unterminated escape.
                Utf8Step::Incomplete => break,
                Utf8Step::Invalid => (char::REPLACEMENT_CHARACTER, 1),
            };

            match self.mode {
                Mode::Escape => self.handle_escape(screen, char),
                Mode::Control => self.handle_control_sequence(screen, char),
                Mode::Osc => self.handle_osc(screen, char),
                Mode::OscEsc => self.handle_osc_escape(screen, char),
                Mode::Charset => self.handle_charset(),
                Mode::Apc => self.handle_apc(screen, char),
                Mode::ApcEsc => self.handle_apc_escape(screen, char),
                Mode::Normal => self.handle_normal(screen, char),
            }

            self.cursor += char_len;
        }

        // In normal mode everything up to the cursor has been processed; in
        // the middle of an escape, everything up to where it started has.
        let done = if self.mode == Mode::Normal {
            self.cursor
        } else {
            self.escape_started_at
        };

        self.buffer.drain(..done);
        self.cursor -= done;
        self.instruction_started_at = self.instruction_started_at.saturating_sub(done);
        self.escape_started_at = self.escape_started_at.saturating_sub(done);
    }

    fn handle_normal(&mut self, screen: &mut Screen, char: char) {
        match char {
            '\n' => screen.new_line(),
            '\r' => screen.carriage_return(),
            '\u{8}' => screen.backspace(),
            '\x1b' => {
                self.escape_started_at = self.cursor;
                self.mode = Mode::Escape;
            }
            _ => screen.append(char),
        }
    }

    fn handle_escape(&mut self, screen: &mut Screen, char: char) {
        match char {
            '[' => {
                self.instruction_started_at = self.cursor + 1;
                self.instructions = Vec::with_capacity(1);
                self.mode = Mode::Control;
            }
            ']' => {
                self.instruction_started_at = self.cursor + 1;
                self.mode = Mode::Osc;
            }
            '(' | ')' => {
                self.instruction_started_at = self.cursor + 1;
                self.mode = Mode::Charset;
            }
            '_' => {
                self.instruction_started_at = self.cursor + 1;
                self.mode = Mode::Apc;
            }
            'M' => {
                screen.rev_new_line();
                self.mode = Mode::Normal;
            }
            '7' => {
                self.save_position = screen.cursor();
                self.mode = Mode::Normal;
            }
            '8' => {
                screen.set_cursor(self.save_position);
                self.mode = Mode::Normal;
            }
            _ => {
                // Not an escape code, false alarm
                self.cursor = self.escape_started_at;
                self.mode = Mode::Normal;
            }
        }
    }

    fn handle_control_sequence(&mut self, screen: &mut Screen, char: char) {
        let char = char.to_ascii_uppercase();
        match char {
            '?' | '0'..='9' => {
                // Part of an instruction
            }
            ';' => {
                self.add_instruction();
                self.instruction_started_at = self.cursor + 1;
            }
            'A' | 'B' | 'C' | 'D' | 'E' | 'F' | 'G' | 'H' | 'J' | 'K' | 'M' | 'Q' => {
                self.add_instruction();
                screen.apply_escape(char, &self.instructions);
                self.mode = Mode::Normal;
            }
            'L' => {
                // Set/reset mode (SM/RM), acknowledged and ignored
                tracing::debug!("ignoring set/reset mode sequence");
                self.mode = Mode::Normal;
            }
            _ => {
                // Unrecognized character, abort the sequence
                self.cursor = self.escape_started_at;
                self.mode = Mode::Normal;
            }
        }
    }

    /// Append the pending parameter to the instruction list, if non-empty
    fn add_instruction(&mut self) {
        let bytes = &self.buffer[self.instruction_started_at..self.cursor];
        if !bytes.is_empty() {
            self.instructions
                .push(String::from_utf8_lossy(bytes).into_owned());
        }
    }

    fn handle_charset(&mut self) {
        self.mode = Mode::Normal;
    }

    fn handle_osc(&mut self, screen: &mut Screen, char: char) {
        match char {
            // BEL terminates the OSC
            '\x07' => self.process_osc(screen, self.cursor),
            // Next char could be \ which makes the combination ST
            '\x1b' => self.mode = Mode::OscEsc,
            _ => {}
        }
    }

    fn handle_osc_escape(&mut self, screen: &mut Screen, char: char) {
        match char {
            // ESC \ = string terminator; the ESC is not part of the payload
            '\\' => self.process_osc(screen, self.cursor - 1),
            // Not a string terminator, the OSC continues
            _ => self.mode = Mode::Osc,
        }
    }

    fn process_osc(&mut self, screen: &mut Screen, end: usize) {
        self.mode = Mode::Normal;
        let sequence =
            String::from_utf8_lossy(&self.buffer[self.instruction_started_at..end]).into_owned();

        // OSC 8 is a brush, not an element: it paints subsequent cells with
        // a link rather than embedding anything.
        if let Some(rest) = sequence.strip_prefix("8;") {
            let uri = rest.splitn(2, ';').nth(1).unwrap_or("");
            screen.set_link_brush(uri);
            return;
        }

        match parse_element_sequence(&sequence) {
            Ok(None) => {
                tracing::debug!(payload = %sequence, "ignoring operating system command");
            }
            Ok(Some(element)) => {
                // Images appear on their own line; links render inline.
                let own_line = element.kind() != ElementKind::Link;
                if own_line {
                    self.break_to_fresh_line(screen);
                }
                screen.append_element(element);
                if own_line {
                    screen.new_line();
                }
            }
            Err(err) => {
                self.break_to_fresh_line(screen);
                screen.append_str("*** Error parsing custom element escape sequence: ");
                screen.append_str(&err.to_string());
                screen.new_line();
            }
        }
    }

    fn break_to_fresh_line(&mut self, screen: &mut Screen) {
        if screen.cursor().0 != 0 {
            screen.new_line();
        }
        screen.clear_current_line();
    }

    // An APC sequence is properly terminated by ST (ESC \), but xterm
    // historically accepts BEL as well, which is how iTerm2 and the
    // Buildkite timestamper terminate theirs. Both forms are accepted.

    fn handle_apc(&mut self, screen: &mut Screen, char: char) {
        match char {
            '\x07' => self.process_apc(screen, self.cursor),
            '\x1b' => self.mode = Mode::ApcEsc,
            _ => {}
        }
    }

    fn handle_apc_escape(&mut self, screen: &mut Screen, char: char) {
        match char {
            '\\' => self.process_apc(screen, self.cursor - 1),
            _ => self.mode = Mode::Apc,
        }
    }

    fn process_apc(&mut self, screen: &mut Screen, end: usize) {
        self.mode = Mode::Normal;
        let sequence =
            String::from_utf8_lossy(&self.buffer[self.instruction_started_at..end]).into_owned();

        match parse_buildkite_apc(&sequence, &mut self.last_timestamp) {
            Ok(None) => {}
            Ok(Some(data)) => screen.set_line_metadata(BK_NAMESPACE, data),
            Err(err) => {
                screen.append_str("*** Error parsing Buildkite APC ANSI escape sequence: ");
                screen.append_str(&err.to_string());
            }
        }
    }
}
