//! Error types for upnext parsing.

use thiserror::Error;

/// Errors produced while parsing a single event chunk.
///
/// Each variant carries the chunk's title line so callers can point at the
/// offending event without holding on to the raw input. A failed chunk
/// never affects the chunks around it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("event '{title}' has no date line")]
    MissingDateLine { title: String },

    #[error("event '{title}' has no calendar name in parentheses on its title line")]
    MissingCalendar { title: String },

    #[error("event '{title}' has an unparseable date '{value}'")]
    InvalidDate { title: String, value: String },

    #[error("event '{title}' has an unparseable time '{value}'")]
    InvalidTime { title: String, value: String },
}

/// Result type alias for parse operations.
pub type ParseResult<T> = Result<T, ParseError>;
