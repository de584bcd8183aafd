//! Film listings from the "sessions by film" part of the page.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use super::text::{first_text, inner_text};

// The misspelled id is what the page actually uses.
static FILM_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#sessionsByFilmConent .film").expect("film selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".title").expect("film title selector"));
static DESCRIPTION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".film-desc").expect("film description selector"));
static CENSOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".censor").expect("film rating selector"));

const NOT_RATED: &str = "This film is Not Rated.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilmListing {
    pub title: String,
    pub description: Option<String>,
    /// Rating code, e.g. `PG-13`.
    pub rating: Option<String>,
    /// The sentence around the rating code, e.g. `R for language`.
    pub rating_description: Option<String>,
}

impl FilmListing {
    /// The rating text worth showing on an event.
    pub fn rating_text(&self) -> Option<String> {
        self.rating_description.clone().or_else(|| self.rating.clone())
    }
}

/// Film listings keyed by title. Blocks without a title are skipped.
pub fn parse_listings(document: &Html) -> HashMap<String, FilmListing> {
    let mut films = HashMap::new();

    for film in document.select(&FILM_SELECTOR) {
        let Some(title) = first_text(&film, &TITLE_SELECTOR) else {
            continue;
        };

        let censor = film.select(&CENSOR_SELECTOR).next();
        let rating = censor.map(inner_text).filter(|s| !s.is_empty());
        let rating_description = censor
            .and_then(|c| c.parent())
            .and_then(ElementRef::wrap)
            .map(inner_text)
            .filter(|s| !s.is_empty())
            .map(|text| {
                if text == "NR" {
                    NOT_RATED.to_string()
                } else {
                    text
                }
            });

        let listing = FilmListing {
            title: title.clone(),
            description: first_text(&film, &DESCRIPTION_SELECTOR),
            rating,
            rating_description,
        };
        films.insert(title, listing);
    }

    films
}

/// Find a listing by exact title, falling back to a case-insensitive match.
pub fn find<'a>(films: &'a HashMap<String, FilmListing>, title: &str) -> Option<&'a FilmListing> {
    films.get(title).or_else(|| {
        films
            .values()
            .find(|listing| listing.title.eq_ignore_ascii_case(title))
    })
}
