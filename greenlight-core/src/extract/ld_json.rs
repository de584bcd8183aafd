//! Showings embedded as schema.org JSON-LD.

use std::collections::HashMap;

use serde_json::Value;

use super::listing::{self, FilmListing};
use super::text::clean_text;
use super::time::{parse_datetime, parse_duration};
use super::ExtractOptions;
use crate::error::{GreenlightError, GreenlightResult};
use crate::showing::ShowingRecord;

const SHOWING_TYPES: &[&str] = &["VisualArtsEvent", "ScreeningEvent"];

/// The candidate items in one JSON-LD script.
///
/// Invalid JSON is an error; any other shape that is not a list of objects
/// just yields nothing.
pub fn session_items(raw: &str) -> GreenlightResult<Vec<Value>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| GreenlightError::Parse(format!("invalid JSON-LD: {}", e)))?;
    Ok(match value {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        _ => Vec::new(),
    })
}

/// Turn one JSON-LD item into a showing.
///
/// Returns `Ok(None)` for items that are not showings at all, and an error
/// for showings missing a title or a usable start time.
pub fn parse_session(
    item: &Value,
    films: &HashMap<String, FilmListing>,
    options: &ExtractOptions,
) -> GreenlightResult<Option<ShowingRecord>> {
    let Some(object) = item.as_object() else {
        return Ok(None);
    };
    let is_showing = object
        .get("@type")
        .and_then(Value::as_str)
        .is_some_and(|kind| SHOWING_TYPES.contains(&kind));
    if !is_showing {
        return Ok(None);
    }

    let title = string_at(item, &["name"])
        .map(|s| clean_text(&s))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GreenlightError::Parse("showing has no title".to_string()))?;

    let raw_start = string_at(item, &["startDate"])
        .ok_or_else(|| GreenlightError::Parse(format!("'{}' has no start date", title)))?;
    let start = parse_datetime(&raw_start, options.timezone).ok_or_else(|| {
        GreenlightError::Parse(format!("'{}' has unreadable start date '{}'", title, raw_start))
    })?;

    let end = string_at(item, &["endDate"])
        .and_then(|raw| parse_datetime(&raw, options.timezone))
        .filter(|end| *end > start)
        .or_else(|| {
            string_at(item, &["duration"])
                .and_then(|raw| parse_duration(&raw))
                .and_then(|duration| start.checked_add_signed(duration))
        })
        .or_else(|| start.checked_add_signed(options.default_runtime))
        .ok_or_else(|| GreenlightError::Parse(format!("'{}' has no usable end time", title)))?;

    let listing = listing::find(films, &title);
    let screen = string_at(item, &["location", "room"])
        .or_else(|| string_at(item, &["location", "containedInPlace", "name"]));

    let showing = ShowingRecord::new(title, start, end)
        .with_venue(string_at(item, &["location", "name"]))
        .with_address(item.pointer("/location/address").and_then(address_text))
        .with_ticket_url(string_at(item, &["url"]))
        .with_description(listing.and_then(|l| l.description.clone()))
        .with_rating(listing.and_then(FilmListing::rating_text))
        .with_screen(screen);

    Ok(Some(showing))
}

/// A non-empty string found by walking `path` through nested objects.
fn string_at(item: &Value, path: &[&str]) -> Option<String> {
    path.iter()
        .try_fold(item, |value, key| value.get(key))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Addresses come either as plain text or as a `PostalAddress` object.
fn address_text(address: &Value) -> Option<String> {
    match address {
        Value::String(text) => Some(clean_text(text)).filter(|s| !s.is_empty()),
        Value::Object(_) => {
            let parts: Vec<String> = [
                "streetAddress",
                "addressLocality",
                "addressRegion",
                "postalCode",
            ]
            .iter()
            .filter_map(|key| string_at(address, &[*key]))
            .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options() -> ExtractOptions {
        ExtractOptions::default()
    }

    #[test]
    fn reads_a_full_session() {
        let item = json!({
            "@type": "VisualArtsEvent",
            "name": "Paris, Texas",
            "startDate": "2026-01-28T14:00:00-05:00",
            "duration": "PT2H25M",
            "url": "https://ticketing.example/purchase/1",
            "location": {
                "name": "Green Light Cinema",
                "address": {
                    "streetAddress": "221 2nd Ave N",
                    "addressLocality": "St. Petersburg",
                    "addressRegion": "FL"
                },
                "containedInPlace": { "name": "Screen 2" }
            }
        });
        let showing = parse_session(&item, &HashMap::new(), &options())
            .unwrap()
            .unwrap();
        assert_eq!(showing.film_title, "Paris, Texas");
        assert_eq!(showing.end_time.to_rfc3339(), "2026-01-28T16:25:00-05:00");
        assert_eq!(showing.venue.as_deref(), Some("Green Light Cinema"));
        assert_eq!(
            showing.address.as_deref(),
            Some("221 2nd Ave N, St. Petersburg, FL")
        );
        assert_eq!(showing.screen.as_deref(), Some("Screen 2"));
    }

    #[test]
    fn end_date_wins_over_duration() {
        let item = json!({
            "@type": "VisualArtsEvent",
            "name": "Alien",
            "startDate": "2026-02-01T19:00:00",
            "endDate": "2026-02-01T21:10:00",
            "duration": "PT1H"
        });
        let showing = parse_session(&item, &HashMap::new(), &options())
            .unwrap()
            .unwrap();
        assert_eq!(showing.end_time.to_rfc3339(), "2026-02-01T21:10:00-05:00");
    }

    #[test]
    fn falls_back_to_default_runtime() {
        let item = json!({
            "@type": "VisualArtsEvent",
            "name": "Alien",
            "startDate": "2026-02-01T19:00:00-05:00",
            "duration": "soon"
        });
        let showing = parse_session(&item, &HashMap::new(), &options())
            .unwrap()
            .unwrap();
        assert_eq!(showing.end_time - showing.start_time, chrono::Duration::hours(2));
    }

    #[test]
    fn oversized_duration_uses_default_runtime() {
        let item = json!({
            "@type": "VisualArtsEvent",
            "name": "Alien",
            "startDate": "2026-02-01T19:00:00-05:00",
            "duration": "P300000Y"
        });
        let showing = parse_session(&item, &HashMap::new(), &options())
            .unwrap()
            .unwrap();
        assert_eq!(showing.end_time - showing.start_time, chrono::Duration::hours(2));
    }

    #[test]
    fn other_types_are_ignored() {
        let item = json!({ "@type": "Organization", "name": "Green Light Cinema" });
        assert!(parse_session(&item, &HashMap::new(), &options()).unwrap().is_none());
        assert!(parse_session(&json!("text"), &HashMap::new(), &options()).unwrap().is_none());
    }

    #[test]
    fn missing_title_or_start_is_an_error() {
        let untitled = json!({ "@type": "VisualArtsEvent", "startDate": "2026-02-01T19:00:00" });
        assert!(parse_session(&untitled, &HashMap::new(), &options()).is_err());

        let undated = json!({ "@type": "VisualArtsEvent", "name": "Alien", "startDate": "TBA" });
        let err = parse_session(&undated, &HashMap::new(), &options()).unwrap_err();
        assert!(err.to_string().contains("Alien"));
    }

    #[test]
    fn non_list_scripts_yield_nothing() {
        assert!(session_items("42").unwrap().is_empty());
        assert!(session_items("  ").unwrap().is_empty());
        assert_eq!(session_items(r#"{"@type": "Movie"}"#).unwrap().len(), 1);
        assert!(session_items("[{").is_err());
    }
}
