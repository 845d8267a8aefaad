//! The default command: fetch, parse and render the agenda.

use anyhow::Result;
use chrono::Local;
use owo_colors::OwoColorize;
use upnext_core::event::Event;
use upnext_core::parse::parse_events;

use crate::{buddy, config, render};

pub async fn run(days: Option<u32>, json: bool, raw: bool) -> Result<()> {
    let tree = config::load()?;
    let settings = config::Settings::from_tree(&tree);
    let days_ahead = days.unwrap_or(settings.days_ahead);

    let output = buddy::list_events(days_ahead).await?;

    // Chunks that fail to parse become warnings; the rest of the agenda
    // still renders.
    let mut events: Vec<Event> = Vec::new();
    for parsed in parse_events(&output) {
        match parsed {
            Ok(event) => events.push(event),
            Err(error) => eprintln!("{} {}", "warning:".yellow(), error),
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    let today = Local::now().date_naive();
    println!("{}", render::agenda(events, &settings, today, raw));
    Ok(())
}
