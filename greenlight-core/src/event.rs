//! Calendar events as the synchronizer sees them.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// An event owned by the remote calendar.
///
/// `identity` and `managed` come from the event's private extended
/// properties. Events without the managed marker were created by a person
/// and are never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(default)]
    pub managed: bool,
}

impl CalendarEvent {
    /// Identity tag of an event this tool created, `None` for anything else.
    pub fn managed_identity(&self) -> Option<&str> {
        if self.managed {
            self.identity.as_deref()
        } else {
            None
        }
    }

    /// Compare the fields a person sees on the calendar.
    ///
    /// Times compare as instants, and an empty description or location
    /// equals a missing one.
    pub fn same_content(&self, other: &CalendarEvent) -> bool {
        self.summary == other.summary
            && self.start == other.start
            && self.end == other.end
            && non_empty(&self.description) == non_empty(&other.description)
            && non_empty(&self.location) == non_empty(&other.location)
    }

    /// Names of the visible fields that differ from `other`.
    pub fn changed_fields(&self, other: &CalendarEvent) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.summary != other.summary {
            fields.push("summary");
        }
        if self.start != other.start {
            fields.push("start");
        }
        if self.end != other.end {
            fields.push("end");
        }
        if non_empty(&self.description) != non_empty(&other.description) {
            fields.push("description");
        }
        if non_empty(&self.location) != non_empty(&other.location) {
            fields.push("location");
        }
        fields
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.summary, self.start.format("%b %d %H:%M"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(summary: &str, start: &str, end: &str) -> CalendarEvent {
        CalendarEvent {
            id: Some("evt-1".into()),
            summary: summary.into(),
            description: None,
            location: None,
            start: DateTime::parse_from_rfc3339(start).unwrap(),
            end: DateTime::parse_from_rfc3339(end).unwrap(),
            html_link: None,
            identity: Some("abc".into()),
            managed: true,
        }
    }

    #[test]
    fn same_content_compares_instants() {
        let a = event("Alien", "2026-03-01T19:00:00-05:00", "2026-03-01T21:00:00-05:00");
        let b = event("Alien", "2026-03-02T00:00:00+00:00", "2026-03-02T02:00:00+00:00");
        assert!(a.same_content(&b));
    }

    #[test]
    fn empty_description_equals_missing() {
        let a = event("Alien", "2026-03-01T19:00:00-05:00", "2026-03-01T21:00:00-05:00");
        let mut b = a.clone();
        b.description = Some(String::new());
        assert!(a.same_content(&b));
        b.description = Some("In space no one can hear you scream.".into());
        assert!(!a.same_content(&b));
        assert_eq!(a.changed_fields(&b), vec!["description"]);
    }

    #[test]
    fn unmanaged_events_have_no_identity() {
        let mut e = event("Alien", "2026-03-01T19:00:00-05:00", "2026-03-01T21:00:00-05:00");
        assert_eq!(e.managed_identity(), Some("abc"));
        e.managed = false;
        assert_eq!(e.managed_identity(), None);
    }
}
