//! Streaming ANSI/VT screen emulation with HTML and plain-text rendering
//!
//! This crate consumes a byte stream of text interleaved with ANSI control
//! sequences and maintains a virtual screen buffer. Its primary use is
//! converting captured CI/build-job terminal output into a faithful rendered
//! representation:
//! - An incremental parser that resumes from any byte offset, so sequences
//!   split across write boundaries lose nothing
//! - A screen model with a bounded viewport over capped-or-unbounded
//!   scrollback, styled per-cell storage, embedded elements, OSC 8
//!   hyperlinks and per-line metadata
//! - Read-only projections to HTML ([`Screen::as_html`]) and plain text
//!   ([`Screen::as_plain_text`])
//!
//! The input surface is [`std::io::Write`]; feeding the screen never fails,
//! and malformed sequences degrade to literal text.
//!
//! ```
//! use std::io::Write;
//!
//! let mut screen = ansi_screen::Screen::new();
//! screen.write_all(b"\x1b[1;32mok\x1b[0m build passed").unwrap();
//! assert_eq!(screen.as_plain_text(), "ok build passed");
//! assert_eq!(
//!     screen.as_html(),
//!     "<span class=\"term-fg1 term-fg32\">ok</span> build passed"
//! );
//! ```

mod apc;
mod cell;
mod color;
mod element;
mod error;
mod line;
mod parser;
mod screen;
mod style;
mod utf8;

pub use apc::{parse_buildkite_apc, ApcError, BK_NAMESPACE};
pub use cell::Cell;
pub use color::Color;
pub use element::{parse_element_sequence, Element, ElementError, ElementKind};
pub use error::{Result, ScreenError};
pub use line::Line;
pub use screen::{Screen, ScreenBuilder};
pub use style::Style;
