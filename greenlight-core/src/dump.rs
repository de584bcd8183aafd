//! JSON dumps of showings and events.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{GreenlightError, GreenlightResult};
use crate::event::CalendarEvent;
use crate::showing::ShowingRecord;

pub fn read_showings(path: &Path) -> GreenlightResult<Vec<ShowingRecord>> {
    read_json(path)
}

/// Write showings as pretty JSON to `path`, or stdout when `path` is `None`.
pub fn write_showings(path: Option<&Path>, showings: &[ShowingRecord]) -> GreenlightResult<()> {
    let json = serde_json::to_string_pretty(showings)?;
    match path {
        Some(path) => fs::write(path, json + "\n")?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }
    Ok(())
}

pub fn read_events(path: &Path) -> GreenlightResult<Vec<CalendarEvent>> {
    read_json(path)
}

pub fn write_events(path: &Path, events: &[CalendarEvent]) -> GreenlightResult<()> {
    let json = serde_json::to_string_pretty(events)?;
    fs::write(path, json + "\n")?;
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> GreenlightResult<T> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        GreenlightError::Serialization(format!("{}: {}", path.display(), e))
    })
}
