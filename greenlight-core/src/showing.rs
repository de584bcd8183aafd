//! Showings scraped from the cinema's showtimes page.

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::event::CalendarEvent;

/// One scheduled screening of a film.
///
/// Records are rebuilt from the live page on every run. `source_identity`
/// is what ties a record to the calendar event created for it on an
/// earlier run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowingRecord {
    pub film_title: String,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub source_identity: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen: Option<String>,
}

impl ShowingRecord {
    pub fn new(
        film_title: impl Into<String>,
        start_time: DateTime<FixedOffset>,
        end_time: DateTime<FixedOffset>,
    ) -> Self {
        let film_title = film_title.into();
        let source_identity = source_identity(&film_title, &start_time);
        Self {
            film_title,
            start_time,
            end_time,
            source_identity,
            venue: None,
            address: None,
            ticket_url: None,
            description: None,
            rating: None,
            screen: None,
        }
    }

    pub fn with_venue(mut self, venue: Option<String>) -> Self {
        self.venue = venue;
        self
    }

    pub fn with_address(mut self, address: Option<String>) -> Self {
        self.address = address;
        self
    }

    pub fn with_ticket_url(mut self, url: Option<String>) -> Self {
        self.ticket_url = url;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_rating(mut self, rating: Option<String>) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_screen(mut self, screen: Option<String>) -> Self {
        self.screen = screen;
        self
    }

    /// The calendar event this showing should appear as.
    pub fn to_event(&self) -> CalendarEvent {
        let summary = match &self.venue {
            Some(venue) => format!("{} @ {}", self.film_title, venue),
            None => self.film_title.clone(),
        };

        let mut parts = Vec::new();
        if let Some(url) = &self.ticket_url {
            parts.push(url.clone());
        }
        if let Some(description) = &self.description {
            parts.push(description.clone());
        }
        if let Some(screen) = &self.screen {
            parts.push(format!("Screen: {}", screen));
        }
        if let Some(rating) = &self.rating {
            parts.push(format!("Rating: {}", rating));
        }

        CalendarEvent {
            id: None,
            summary,
            description: if parts.is_empty() {
                None
            } else {
                Some(parts.join("\n\n"))
            },
            location: self.address.clone(),
            start: self.start_time,
            end: self.end_time,
            html_link: None,
            identity: Some(self.source_identity.clone()),
            managed: true,
        }
    }
}

impl fmt::Display for ShowingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {}",
            self.film_title,
            self.start_time.format("%b %d %H:%M")
        )
    }
}

/// Stable key for a showing: film title plus the UTC instant it starts.
///
/// The offset the page used to spell the time does not affect the key.
pub fn source_identity(film_title: &str, start_time: &DateTime<FixedOffset>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(film_title.trim().as_bytes());
    hasher.update(b"|");
    hasher.update(start_time.with_timezone(&Utc).to_rfc3339().as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn identity_ignores_offset_spelling() {
        let eastern = source_identity("Paris, Texas", &at("2026-01-28T14:00:00-05:00"));
        let utc = source_identity("Paris, Texas", &at("2026-01-28T19:00:00Z"));
        assert_eq!(eastern, utc);
    }

    #[test]
    fn identity_distinguishes_title_and_time() {
        let a = source_identity("Paris, Texas", &at("2026-01-28T14:00:00-05:00"));
        let b = source_identity("Paris, Texas", &at("2026-01-28T16:30:00-05:00"));
        let c = source_identity("Wings of Desire", &at("2026-01-28T14:00:00-05:00"));
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn to_event_renders_summary_and_description() {
        let showing = ShowingRecord::new(
            "Paris, Texas",
            at("2026-01-28T14:00:00-05:00"),
            at("2026-01-28T16:25:00-05:00"),
        )
        .with_venue(Some("Green Light Cinema".into()))
        .with_address(Some("221 2nd Avenue North, St. Petersburg".into()))
        .with_ticket_url(Some("https://example.com/purchase/1".into()))
        .with_description(Some("A drifter wanders out of the desert.".into()))
        .with_rating(Some("R".into()));

        let event = showing.to_event();
        assert_eq!(event.summary, "Paris, Texas @ Green Light Cinema");
        assert_eq!(
            event.description.as_deref(),
            Some(
                "https://example.com/purchase/1\n\nA drifter wanders out of the desert.\n\nRating: R"
            )
        );
        assert_eq!(event.identity.as_deref(), Some(showing.source_identity.as_str()));
        assert!(event.managed);
        assert!(event.id.is_none());
    }

    #[test]
    fn to_event_without_details_has_no_description() {
        let showing = ShowingRecord::new(
            "Stop Making Sense",
            at("2026-02-01T20:00:00-05:00"),
            at("2026-02-01T21:30:00-05:00"),
        );
        let event = showing.to_event();
        assert_eq!(event.summary, "Stop Making Sense");
        assert!(event.description.is_none());
        assert!(event.location.is_none());
    }
}
