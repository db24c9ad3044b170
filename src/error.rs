//! Error types for screen configuration

use thiserror::Error;

/// Screen configuration error type
///
/// Stream processing itself never fails; these errors only surface from the
/// builder and from [`Screen::set_size`](crate::Screen::set_size).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenError {
    /// A window dimension was zero
    #[error("invalid dimension in size {cols}w x {lines}h")]
    InvalidSize { cols: usize, lines: usize },

    /// Requested width exceeds the configured maximum
    #[error("cols greater than max [{cols} > {max}]")]
    ColsExceedMax { cols: usize, max: usize },

    /// Requested height exceeds the configured maximum
    #[error("lines greater than max [{lines} > {max}]")]
    LinesExceedMax { lines: usize, max: usize },
}

/// Result type for screen configuration
pub type Result<T> = std::result::Result<T, ScreenError>;
