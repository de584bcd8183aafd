//! Showtime extraction from the cinema's ticketing page.
//!
//! The page carries two views of the same program: film listings
//! (description, rating) rendered as HTML, and one JSON-LD event per
//! showing. Showings come from the JSON-LD and borrow details from the
//! listing with the same title.

mod ld_json;
mod listing;
mod text;
mod time;

pub use listing::FilmListing;
pub use text::clean_text;
pub use time::{parse_datetime, parse_duration};

use std::collections::HashSet;
use std::fmt;

use chrono_tz::Tz;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::constants::{DEFAULT_RUNTIME_MINUTES, DEFAULT_TIMEZONE};
use crate::showing::ShowingRecord;

static LD_JSON_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("ld+json selector")
});

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Zone for showtimes printed without an offset.
    pub timezone: Tz,
    /// Runtime assumed when a showing has no end and no duration.
    pub default_runtime: chrono::Duration,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.parse().unwrap_or(chrono_tz::America::New_York),
            default_runtime: chrono::Duration::minutes(DEFAULT_RUNTIME_MINUTES),
        }
    }
}

/// Something on the page that could not become a showing.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseIssue {
    /// Start of the offending fragment, for locating it in the page.
    pub fragment: String,
    pub reason: String,
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (near `{}`)", self.reason, self.fragment)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub showings: Vec<ShowingRecord>,
    pub issues: Vec<ParseIssue>,
}

impl Extraction {
    fn report(&mut self, fragment: &str, reason: impl fmt::Display) {
        let issue = ParseIssue {
            fragment: snippet(fragment),
            reason: reason.to_string(),
        };
        warn!(%issue, "Skipping showing");
        self.issues.push(issue);
    }
}

/// Extract every showing from a showtimes page.
///
/// Never fails: fragments that cannot be read are reported in
/// [`Extraction::issues`] and the rest of the page is still processed.
pub fn parse_showtimes(html: &str, options: &ExtractOptions) -> Extraction {
    let document = Html::parse_document(html);
    let films = listing::parse_listings(&document);
    debug!(count = films.len(), "Parsed film listings");

    let mut extraction = Extraction::default();
    let mut seen = HashSet::new();

    for script in document.select(&LD_JSON_SELECTOR) {
        let raw = script.text().collect::<String>();
        let items = match ld_json::session_items(&raw) {
            Ok(items) => items,
            Err(e) => {
                extraction.report(&raw, e);
                continue;
            }
        };

        for item in items {
            match ld_json::parse_session(&item, &films, options) {
                Ok(Some(showing)) => {
                    if seen.insert(showing.source_identity.clone()) {
                        extraction.showings.push(showing);
                    } else {
                        extraction.report(&item.to_string(), format!("duplicate showing {}", showing));
                    }
                }
                Ok(None) => {}
                Err(e) => extraction.report(&item.to_string(), e),
            }
        }
    }

    debug!(
        showings = extraction.showings.len(),
        issues = extraction.issues.len(),
        "Extracted showtimes"
    );
    extraction
}

fn snippet(fragment: &str) -> String {
    let cleaned = clean_text(fragment);
    match cleaned.char_indices().nth(80) {
        Some((idx, _)) => format!("{}...", &cleaned[..idx]),
        None => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head>
<script type="application/ld+json">
{"@context": "https://schema.org", "@type": "MovieTheater", "name": "Green Light Cinema"}
</script>
<script type="application/ld+json">
[
  {"@type": "VisualArtsEvent", "name": "Paris, Texas",
   "startDate": "2026-01-28T14:00:00-05:00", "duration": "PT2H25M",
   "url": "https://ticketing.example/purchase/1",
   "location": {"name": "Green Light Cinema", "address": "221 2nd Ave N, St. Petersburg, FL"}},
  {"@type": "VisualArtsEvent", "name": "Paris, Texas",
   "startDate": "2026-01-28T19:00:00-05:00", "duration": "PT2H25M",
   "url": "https://ticketing.example/purchase/2",
   "location": {"name": "Green Light Cinema", "address": "221 2nd Ave N, St. Petersburg, FL"}},
  {"@type": "VisualArtsEvent", "name": "Hausu",
   "startDate": "2026-01-29T21:00:00", "duration": "PT1H28M",
   "location": {"name": "Green Light Cinema"}}
]
</script>
</head><body>
<div id="sessionsByFilmConent">
  <div class="film">
    <h3 class="title">Paris, Texas</h3>
    <p class="film-desc">A drifter wanders out of the desert.</p>
    <div><span class="censor">R</span> for language</div>
  </div>
  <div class="film">
    <h3 class="title">Hausu</h3>
    <div><span class="censor">NR</span></div>
  </div>
</div>
</body></html>"#;

    #[test]
    fn one_record_per_showing() {
        let extraction = parse_showtimes(PAGE, &ExtractOptions::default());
        assert!(extraction.issues.is_empty());
        assert_eq!(extraction.showings.len(), 3);

        let hausu = extraction
            .showings
            .iter()
            .find(|s| s.film_title == "Hausu")
            .unwrap();
        assert_eq!(hausu.rating.as_deref(), Some("This film is Not Rated."));
        assert_eq!(hausu.start_time.to_rfc3339(), "2026-01-29T21:00:00-05:00");

        let paris = &extraction.showings[0];
        assert_eq!(
            paris.description.as_deref(),
            Some("A drifter wanders out of the desert.")
        );
        assert_eq!(paris.rating.as_deref(), Some("R for language"));
    }

    #[test]
    fn identities_are_stable_across_runs() {
        let first = parse_showtimes(PAGE, &ExtractOptions::default());
        let second = parse_showtimes(PAGE, &ExtractOptions::default());
        let ids = |e: &Extraction| {
            e.showings
                .iter()
                .map(|s| s.source_identity.clone())
                .collect::<HashSet<_>>()
        };
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(ids(&first).len(), 3);
    }

    #[test]
    fn malformed_fragments_become_issues() {
        let page = r#"<html><head>
<script type="application/ld+json">[{"@type": "VisualArtsEvent", "name": </script>
<script type="application/ld+json">
[{"@type": "VisualArtsEvent", "name": "Alien", "startDate": "whenever"},
 {"@type": "VisualArtsEvent", "startDate": "2026-01-28T14:00:00-05:00"}]
</script>
</head><body></body></html>"#;
        let extraction = parse_showtimes(page, &ExtractOptions::default());
        assert!(extraction.showings.is_empty());
        assert_eq!(extraction.issues.len(), 3);
    }

    #[test]
    fn duplicates_are_reported_once() {
        let page = r#"<script type="application/ld+json">
[{"@type": "VisualArtsEvent", "name": "Alien", "startDate": "2026-02-01T19:00:00-05:00"},
 {"@type": "VisualArtsEvent", "name": "Alien", "startDate": "2026-02-02T00:00:00Z"}]
</script>"#;
        let extraction = parse_showtimes(page, &ExtractOptions::default());
        assert_eq!(extraction.showings.len(), 1);
        assert_eq!(extraction.issues.len(), 1);
        assert!(extraction.issues[0].reason.contains("duplicate"));
    }

    #[test]
    fn oversized_duration_does_not_stop_the_page() {
        let page = r#"<script type="application/ld+json">
[{"@type": "VisualArtsEvent", "name": "Alien", "startDate": "2026-02-01T19:00:00-05:00",
  "duration": "P300000Y"},
 {"@type": "VisualArtsEvent", "name": "Brazil", "startDate": "2026-02-01T21:30:00-05:00",
  "duration": "PT2H22M"}]
</script>"#;
        let extraction = parse_showtimes(page, &ExtractOptions::default());
        let titles: Vec<&str> = extraction
            .showings
            .iter()
            .map(|s| s.film_title.as_str())
            .collect();
        assert_eq!(titles, ["Alien", "Brazil"]);
        assert!(extraction.issues.is_empty());
    }

    #[test]
    fn page_without_showings_is_empty() {
        let extraction = parse_showtimes("<html><body>Closed</body></html>", &ExtractOptions::default());
        assert!(extraction.showings.is_empty());
        assert!(extraction.issues.is_empty());
    }

    #[test]
    fn long_fragments_are_shortened() {
        let long = "x".repeat(200);
        assert_eq!(snippet(&long).len(), 83);
    }
}
