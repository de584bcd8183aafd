//! Reconciling scraped showings with the events already on the calendar.

mod apply;
mod diff_kind;
mod plan;
mod run;

pub use apply::{FailedOperation, SyncReport, SyncStatus, apply};
pub use diff_kind::DiffKind;
pub use plan::{DiffOptions, EventUpdate, SyncPlan};
pub use run::{SyncRequest, SyncRun, sync_showings, sync_showtimes};

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, FixedOffset};

    use crate::event::CalendarEvent;
    use crate::showing::ShowingRecord;

    pub fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    pub fn showing(title: &str, start: &str, end: &str) -> ShowingRecord {
        ShowingRecord::new(title, at(start), at(end)).with_venue(Some("Green Light Cinema".into()))
    }

    /// The event an earlier run would have created for `showing`.
    pub fn stored(id: &str, showing: &ShowingRecord) -> CalendarEvent {
        let mut event = showing.to_event();
        event.id = Some(id.to_string());
        event
    }

    pub fn personal(id: &str, summary: &str, start: &str, end: &str) -> CalendarEvent {
        CalendarEvent {
            id: Some(id.to_string()),
            summary: summary.to_string(),
            description: None,
            location: None,
            start: at(start),
            end: at(end),
            html_link: None,
            identity: None,
            managed: false,
        }
    }
}
