//! icalBuddy discovery and invocation.
//!
//! The formatting flags pin down the exact text grammar `upnext_core`
//! parses: a fixed bullet before every event title, a labeled
//! bar-terminated date, and a 24-hour time with the zone spelled out.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tokio::time::timeout;
use upnext_core::parse::EVENT_MARKER;

const BINARY_NAME: &str = "icalBuddy";
const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

const DATE_FORMAT_ARG: &str = "date: %a %b %e %Y|";
const TIME_FORMAT_ARG: &str = "%H:%M:%S GMT%z";

/// Run icalBuddy and capture its listing for today plus `days_ahead` days.
pub async fn list_events(days_ahead: u32) -> Result<String> {
    let binary = which::which(BINARY_NAME).context(
        "icalBuddy not found in PATH. Install it with:\n  brew install ical-buddy",
    )?;

    let running = Command::new(&binary)
        .arg("--noRelativeDates")
        .arg("--dateFormat")
        .arg(DATE_FORMAT_ARG)
        .arg("--timeFormat")
        .arg(TIME_FORMAT_ARG)
        .arg("--bullet")
        .arg(EVENT_MARKER)
        .arg(format!("eventsToday+{days_ahead}"))
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .output();

    let output = timeout(COMMAND_TIMEOUT, running)
        .await
        .with_context(|| {
            format!("icalBuddy timed out after {}s", COMMAND_TIMEOUT.as_secs())
        })?
        .context("Failed to run icalBuddy")?;

    if !output.status.success() {
        bail!(
            "icalBuddy exited with status: {}",
            output.status.code().unwrap_or(-1)
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
