//! Parser for icalBuddy's bullet-formatted event listing.
//!
//! upnext runs icalBuddy with `--bullet "event: "`, `--dateFormat
//! "date: %a %b %e %Y|"` and `--timeFormat "%H:%M:%S GMT%z"`, which makes
//! the output a sequence of chunks like:
//!
//! ```text
//! event: A Test Event (Classes)
//!     location: Boston, MA
//!     date: Mon Feb 10 2020| at 18:00:00 GMT-0500 - 21:30:00 GMT-0500
//! ```
//!
//! Each chunk becomes one [`Event`]. A chunk that violates the grammar
//! yields a [`ParseError`] for that chunk only; its neighbors still parse.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{ParseError, ParseResult};
use crate::event::Event;

/// Bullet prefix separating events, as passed to `--bullet`.
pub const EVENT_MARKER: &str = "event: ";

const DATE_LABEL: &str = "date:";
const DATE_LABEL_WITH_SPACE: &str = "date: ";
const DATE_TIME_SEPARATOR: char = '|';
const RANGE_SEPARATOR: &str = " - ";
const TIME_PREFIX: &str = "at ";
const FIELD_VALUE_SEPARATOR: &str = ": ";

const DATE_FORMAT: &str = "%a %b %e %Y";
// Older icalBuddy time formats drop the seconds.
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Parse a complete icalBuddy output capture into event records.
///
/// Returns one entry per non-blank chunk, in input order. Failed chunks
/// come back as `Err`; the caller decides whether to skip or surface them.
pub fn parse_events(output: &str) -> Vec<ParseResult<Event>> {
    output
        .split(EVENT_MARKER)
        .filter(|chunk| !chunk.trim().is_empty())
        .map(parse_chunk)
        .collect()
}

fn parse_chunk(chunk: &str) -> ParseResult<Event> {
    let raw_lines: Vec<String> = chunk.split('\n').map(str::to_string).collect();
    let title_line = raw_lines[0].as_str();

    let (name, calendar) = split_title(title_line)?;

    let date_line = raw_lines
        .iter()
        .find(|line| line.contains(DATE_LABEL))
        .ok_or_else(|| ParseError::MissingDateLine {
            title: title_line.to_string(),
        })?
        .trim();

    let (start_time, end_time) = parse_date_line(title_line, date_line)?;

    let all_day =
        start_time == end_time && start_time.hour() == 0 && start_time.minute() == 0;

    Ok(Event {
        name,
        calendar,
        start_time,
        end_time,
        all_day,
        location: field_value(&raw_lines, "location:"),
        attendees: field_value(&raw_lines, "attendees:"),
        notes: field_value(&raw_lines, "notes:"),
        url: field_value(&raw_lines, "url:"),
        raw_lines,
    })
}

/// Split a title line into event name and calendar name.
///
/// The calendar sits in the *last* parenthesis pair: titles may contain
/// parentheses of their own ("Third Event (Same Day) (Classes)"), so only
/// the rightmost pair is authoritative. The separator character before the
/// pair (a space in well-formed output) is dropped from the name.
fn split_title(title_line: &str) -> ParseResult<(String, String)> {
    let (Some(open), Some(close)) = (title_line.rfind('('), title_line.rfind(')')) else {
        return Err(ParseError::MissingCalendar {
            title: title_line.to_string(),
        });
    };

    // An unbalanced title (")(" ordering) yields an empty calendar; the
    // grammar does not define anything better to do with it.
    let calendar = if close > open {
        title_line[open + 1..close].to_string()
    } else {
        String::new()
    };

    let mut name = title_line[..open].to_string();
    name.pop();

    Ok((name, calendar))
}

/// Extract the start and end timestamps from a (trimmed) date line.
///
/// Four shapes occur in practice:
/// - `date: <day>| at <time>` — a single moment, start == end
/// - `date: <day>| at <time> - <time>` — same-day range
/// - `date: <day>| at <time> - date: <day>| at <time>` — spans midnight
/// - `date: <day>|` — all-day, both timestamps at midnight
fn parse_date_line(title: &str, date_line: &str) -> ParseResult<(NaiveDateTime, NaiveDateTime)> {
    let (start_section, end_section) = match date_line.find(RANGE_SEPARATOR) {
        Some(at) => (
            &date_line[..at],
            Some(&date_line[at + RANGE_SEPARATOR.len()..]),
        ),
        None => (date_line, None),
    };

    let start_section = strip_date_label(start_section);
    let (start_date_text, start_time_text) = match start_section.find(DATE_TIME_SEPARATOR) {
        Some(bar) => (&start_section[..bar], &start_section[bar + 1..]),
        None => (start_section.as_str(), ""),
    };

    let start_date = parse_date(title, start_date_text)?;
    let start = NaiveDateTime::new(start_date, parse_time(title, start_time_text)?);

    let end = match end_section {
        None => start,
        Some(section) => {
            let section = strip_date_label(section.trim_start());
            match section.find(DATE_TIME_SEPARATOR) {
                // A second date label (stripped above) left a bar-separated
                // date in front of the end time: the event spans midnight.
                Some(bar) => NaiveDateTime::new(
                    parse_date(title, &section[..bar])?,
                    parse_time(title, &section[bar + 1..])?,
                ),
                None => NaiveDateTime::new(start_date, parse_time(title, &section)?),
            }
        }
    };

    Ok((start, end))
}

/// Remove the first occurrence of the `date: ` label from a section.
fn strip_date_label(section: &str) -> String {
    section.replacen(DATE_LABEL_WITH_SPACE, "", 1)
}

fn parse_date(title: &str, text: &str) -> ParseResult<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| ParseError::InvalidDate {
        title: title.to_string(),
        value: text.to_string(),
    })
}

/// Parse the time half of a date section. Empty text means midnight
/// (all-day). The trailing `GMT±hhmm` is the host's own offset on every
/// line and is discarded.
fn parse_time(title: &str, text: &str) -> ParseResult<NaiveTime> {
    let text = text.trim();
    let text = text.strip_prefix(TIME_PREFIX).unwrap_or(text);
    if text.is_empty() {
        return Ok(NaiveTime::MIN);
    }

    let clock = text.split_whitespace().next().unwrap_or(text);
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(clock, format).ok())
        .ok_or_else(|| ParseError::InvalidTime {
            title: title.to_string(),
            value: text.to_string(),
        })
}

/// Find the single line carrying `label` and return the text after the
/// first `": "` on it. No matching line means the field is absent.
fn field_value(lines: &[String], label: &str) -> Option<String> {
    let line = lines.iter().find(|line| line.contains(label))?;
    let value_start = line.find(FIELD_VALUE_SEPARATOR)? + FIELD_VALUE_SEPARATOR.len();
    Some(line[value_start..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datetime(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_parse_single_event() {
        let output = "event: A Test Event (Classes)\n    location: Boston, MA\n    date: Mon Feb 10 2020| at 18:00:00 GMT-0500 - 21:30:00 GMT-0500\n";

        let events = parse_events(output);
        assert_eq!(events.len(), 1);

        let event = events[0].as_ref().expect("event should parse");
        assert_eq!(event.name, "A Test Event");
        assert_eq!(event.calendar, "Classes");
        assert_eq!(event.start_time, datetime(2020, 2, 10, 18, 0, 0));
        assert_eq!(event.end_time, datetime(2020, 2, 10, 21, 30, 0));
        assert!(!event.all_day);
        assert_eq!(event.start_time.date(), event.end_time.date());
        assert_eq!(event.location.as_deref(), Some("Boston, MA"));
        assert_eq!(event.attendees, None);
        assert_eq!(event.notes, None);
        assert_eq!(event.url, None);
        assert_eq!(
            event.raw_lines,
            vec![
                "A Test Event (Classes)",
                "    location: Boston, MA",
                "    date: Mon Feb 10 2020| at 18:00:00 GMT-0500 - 21:30:00 GMT-0500",
                "",
            ]
        );
    }

    #[test]
    fn test_parse_multiple_events_in_order() {
        let output = "event: A Test Event (Classes)\n    location: Boston, MA\n    date: Mon Feb 10 2020| at 18:00:00 GMT-0500 - 21:30:00 GMT-0500\nevent: Another Event (Classes)\n    location: 129 Hurtig Hall\n    date: Tue Feb 11 2020| at 08:00:00 GMT-0500 - 09:40:00 GMT-0500\nevent: Third Event (Same Day) (Classes)\n    location: Boston, MA\n    date: Tue Feb 11 2020| at 13:35:00 GMT-0500 - 17:05:00 GMT-0500\nevent: Fourth Event - Same Day (Classes)\n    location: 130 Hurtig Hall\n    date: Tue Feb 11 2020| at 18:00:00 GMT-0500 - 21:15:00 GMT-0500\n";

        let events: Vec<Event> = parse_events(output)
            .into_iter()
            .map(|e| e.expect("all chunks should parse"))
            .collect();

        assert_eq!(events.len(), 4);
        assert_eq!(events[0].name, "A Test Event");
        assert_eq!(events[1].name, "Another Event");
        assert_eq!(events[1].location.as_deref(), Some("129 Hurtig Hall"));
        assert_eq!(events[1].start_time, datetime(2020, 2, 11, 8, 0, 0));
        // "Fourth Event - Same Day" contains the range separator in its
        // title; only the date line is range-split, so it stays intact.
        assert_eq!(events[3].name, "Fourth Event - Same Day");
        assert_eq!(events[3].end_time, datetime(2020, 2, 11, 21, 15, 0));
    }

    #[test]
    fn test_calendar_comes_from_last_parenthesis_pair() {
        let output = "event: Third Event (Same Day) (Classes)\n    date: Tue Feb 11 2020| at 13:35:00 GMT-0500 - 17:05:00 GMT-0500\n";

        let event = parse_events(output)[0].clone().expect("should parse");
        assert_eq!(event.name, "Third Event (Same Day)");
        assert_eq!(event.calendar, "Classes");
    }

    #[test]
    fn test_parse_multi_day_event() {
        let output = "event: [PL][x] Assignment 4 Due (HW Deadline)\n      date: Wed Feb 5 2020| at 23:00:00 GMT-0500 - date: Thu Feb 6 2020| at 00:00:00 GMT-0500\n  ";

        let event = parse_events(output)[0].clone().expect("should parse");
        assert_eq!(event.name, "[PL][x] Assignment 4 Due");
        assert_eq!(event.calendar, "HW Deadline");
        assert_eq!(event.start_time, datetime(2020, 2, 5, 23, 0, 0));
        assert_eq!(event.end_time, datetime(2020, 2, 6, 0, 0, 0));
        assert!(event.spans_days());
        assert!(!event.all_day);
        assert_eq!(
            event.raw_lines,
            vec![
                "[PL][x] Assignment 4 Due (HW Deadline)",
                "      date: Wed Feb 5 2020| at 23:00:00 GMT-0500 - date: Thu Feb 6 2020| at 00:00:00 GMT-0500",
                "  ",
            ]
        );
    }

    #[test]
    fn test_parse_all_day_event() {
        // Chunks before the first marker parse too (icalBuddy output that
        // was already stripped of its bullet).
        let output = "Valentine’s Day (US Holidays)\n      date: Fri Feb 14 2020|\n  ";

        let event = parse_events(output)[0].clone().expect("should parse");
        assert_eq!(event.name, "Valentine’s Day");
        assert_eq!(event.calendar, "US Holidays");
        assert_eq!(event.start_time, datetime(2020, 2, 14, 0, 0, 0));
        assert_eq!(event.start_time, event.end_time);
        assert!(event.all_day);
    }

    #[test]
    fn test_single_time_without_range() {
        let output = "event: Reminder (Personal)\n    date: Mon Feb 10 2020| at 18:00:00 GMT-0500\n";

        let event = parse_events(output)[0].clone().expect("should parse");
        assert_eq!(event.start_time, event.end_time);
        assert_eq!(event.start_time, datetime(2020, 2, 10, 18, 0, 0));
        // A single moment is not all-day unless it sits at midnight.
        assert!(!event.all_day);
    }

    #[test]
    fn test_notes_and_url_fields() {
        let output = "event: Standup (Work)\n    notes: Bring updates\\nAnd blockers\n    url: https://example.com/meet\n    date: Mon Feb 10 2020| at 09:00:00 GMT-0500 - 09:15:00 GMT-0500\n";

        let event = parse_events(output)[0].clone().expect("should parse");
        assert_eq!(event.notes.as_deref(), Some("Bring updates\\nAnd blockers"));
        assert_eq!(event.note_paragraphs(), vec!["Bring updates", "And blockers"]);
        assert_eq!(event.url.as_deref(), Some("https://example.com/meet"));
        assert_eq!(event.location, None);
    }

    #[test]
    fn test_chunk_without_date_line_fails_alone() {
        let output = "event: Broken Event (Classes)\n    location: Nowhere\nevent: Fine Event (Classes)\n    date: Tue Feb 11 2020| at 08:00:00 GMT-0500 - 09:40:00 GMT-0500\n";

        let events = parse_events(output);
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            Err(ParseError::MissingDateLine {
                title: "Broken Event (Classes)".to_string()
            })
        );
        assert_eq!(events[1].as_ref().unwrap().name, "Fine Event");
    }

    #[test]
    fn test_title_without_calendar_fails() {
        let output = "event: No Calendar Here\n    date: Mon Feb 10 2020|\n";

        assert_eq!(
            parse_events(output)[0],
            Err(ParseError::MissingCalendar {
                title: "No Calendar Here".to_string()
            })
        );
    }

    #[test]
    fn test_unparseable_date_reports_value() {
        let output = "event: Bad Date (Classes)\n    date: Sometime Soon| at 18:00:00 GMT-0500\n";

        assert_eq!(
            parse_events(output)[0],
            Err(ParseError::InvalidDate {
                title: "Bad Date (Classes)".to_string(),
                value: "Sometime Soon".to_string(),
            })
        );
    }

    #[test]
    fn test_empty_input_yields_no_events() {
        assert!(parse_events("").is_empty());
        assert!(parse_events("\n   \n").is_empty());
    }

    #[test]
    fn test_time_format_without_seconds() {
        let output = "event: Coffee (Personal)\n    date: Mon Feb 10 2020| at 09:30 GMT-0500 - 10:00 GMT-0500\n";

        let event = parse_events(output)[0].clone().expect("should parse");
        assert_eq!(event.start_time, datetime(2020, 2, 10, 9, 30, 0));
        assert_eq!(event.end_time, datetime(2020, 2, 10, 10, 0, 0));
    }
}
