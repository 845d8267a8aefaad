//! Core types for the upnext terminal agenda.
//!
//! This crate holds everything that does not touch a terminal or a
//! subprocess:
//! - `Event` and the icalBuddy output parser
//! - a generic first-seen-order grouping utility
//! - the deterministic calendar-name color index
//! - the configuration tree (`merge::Value`) and deep-merge engine

pub mod color;
pub mod error;
pub mod event;
pub mod group;
pub mod merge;
pub mod parse;

// Re-export the most used items at crate root for convenience
pub use error::{ParseError, ParseResult};
pub use event::{Event, NOTES_PARAGRAPH_SEPARATOR};
pub use group::{group_by, group_by_with, Group};
pub use parse::parse_events;
