//! The parsed calendar event record.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Literal escape sequence icalBuddy uses for line breaks inside notes.
///
/// The parser keeps notes as a single raw string; renderers split on this
/// token to recover paragraphs.
pub const NOTES_PARAGRAPH_SEPARATOR: &str = "\\n";

/// One event recovered from the icalBuddy text output.
///
/// `start_time`/`end_time` are naive: the `GMT±hhmm` suffix icalBuddy
/// prints is the host machine's own offset on every line, so it carries no
/// information worth modeling. An all-day event has both timestamps at
/// midnight of its date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event title, with the trailing calendar parenthetical removed.
    pub name: String,
    /// Source calendar, from the last parenthesis pair on the title line.
    pub calendar: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// True iff start and end are the same instant at midnight.
    pub all_day: bool,
    pub location: Option<String>,
    pub attendees: Option<String>,
    pub notes: Option<String>,
    pub url: Option<String>,
    /// The chunk's original lines, kept verbatim for debug display.
    pub raw_lines: Vec<String>,
}

impl Event {
    /// Calendar day the event starts on.
    pub fn day(&self) -> NaiveDate {
        self.start_time.date()
    }

    /// Whether the event ends on a different calendar day than it starts.
    pub fn spans_days(&self) -> bool {
        self.start_time.date() != self.end_time.date()
    }

    /// Notes split into display paragraphs on the icalBuddy line-break
    /// escape. Empty when the event has no notes.
    pub fn note_paragraphs(&self) -> Vec<&str> {
        self.notes
            .as_deref()
            .map(|notes| notes.split(NOTES_PARAGRAPH_SEPARATOR).collect())
            .unwrap_or_default()
    }
}
