//! Terminal rendering of the day-grouped agenda.

use chrono::NaiveDate;
use owo_colors::OwoColorize;
use upnext_core::color::palette_index;
use upnext_core::event::Event;
use upnext_core::group::group_by_with;

use crate::config::Settings;

/// Render parsed events as an agenda: one section per calendar day, in
/// the order the days appear in the input, capped at
/// `settings.max_day_groups` sections.
pub fn agenda(events: Vec<Event>, settings: &Settings, today: NaiveDate, raw: bool) -> String {
    let groups = group_by_with(events, |event| event.start_time, |a, b| a.date() == b.date());

    let mut lines: Vec<String> = Vec::new();
    for group in groups.iter().take(settings.max_day_groups) {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(day_label(group.key.date(), today, settings).bold().to_string());

        for event in &group.elements {
            render_event(event, settings, raw, &mut lines);
        }
    }

    if lines.is_empty() {
        return "No upcoming events".dimmed().to_string();
    }
    lines.join("\n")
}

/// Human label for a day: "Today", "Tomorrow", or "Wed Feb 5".
fn day_label(day: NaiveDate, today: NaiveDate, settings: &Settings) -> String {
    match (day - today).num_days() {
        0 => settings.label_today.clone(),
        1 => settings.label_tomorrow.clone(),
        _ => day.format("%a %b %-d").to_string(),
    }
}

fn render_event(event: &Event, settings: &Settings, raw: bool, lines: &mut Vec<String>) {
    let badge = calendar_badge(&event.calendar, &settings.palette);
    lines.push(format!("  {} {}", badge, event.name.bold()));
    lines.push(format!("    {}", time_range(event).dimmed()));

    if settings.show_location {
        if let Some(location) = &event.location {
            lines.push(format!("    {}", location.dimmed()));
        }
    }
    if settings.show_attendees {
        if let Some(attendees) = &event.attendees {
            lines.push(format!("    {}", format!("with {attendees}").dimmed()));
        }
    }
    if settings.show_notes {
        for paragraph in event.note_paragraphs() {
            lines.push(format!("    {}", paragraph.dimmed()));
        }
    }
    if let Some(url) = &event.url {
        lines.push(format!("    {}", url.dimmed()));
    }
    if raw {
        for line in &event.raw_lines {
            lines.push(format!("    | {}", line.dimmed()));
        }
    }
}

/// The calendar name, colored by its stable palette slot. Falls back to
/// plain text when the slot's color is not a parseable `#rrggbb`.
fn calendar_badge(calendar: &str, palette: &[String]) -> String {
    let slot = palette.get(palette_index(calendar, palette.len()));
    match slot.and_then(|hex| hex_rgb(hex)) {
        Some((r, g, b)) => format!("[{}]", calendar.truecolor(r, g, b)),
        None => format!("[{calendar}]"),
    }
}

/// "all-day", a single time, "18:00 - 21:30", or "23:00 - Feb 6 00:00"
/// when the event crosses midnight.
fn time_range(event: &Event) -> String {
    if event.all_day {
        return "all-day".to_string();
    }

    let start = event.start_time.format("%H:%M");
    if event.start_time == event.end_time {
        start.to_string()
    } else if event.spans_days() {
        format!("{} - {}", start, event.end_time.format("%b %-d %H:%M"))
    } else {
        format!("{} - {}", start, event.end_time.format("%H:%M"))
    }
}

fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}
