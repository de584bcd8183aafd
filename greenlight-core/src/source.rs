//! Where showtimes come from: the live page, a saved copy, or a dump.

use std::future;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use tracing::debug;

use crate::client::BoxFuture;
use crate::dump;
use crate::error::{GreenlightError, GreenlightResult};
use crate::showing::{ShowingRecord, source_identity};

// The ticketing site serves a stripped page to unknown clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Produces the HTML of a showtimes page.
pub trait PageSource: Send + Sync {
    /// Where the page comes from, for messages.
    fn describe(&self) -> String;

    fn fetch(&self) -> BoxFuture<'_, GreenlightResult<String>>;
}

/// The live showtimes page.
pub struct HttpPage {
    url: String,
    client: reqwest::Client,
}

impl HttpPage {
    pub fn new(url: impl Into<String>, timeout: Duration) -> GreenlightResult<Self> {
        let url = url.into();

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| GreenlightError::Fetch {
                url: url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self { url, client })
    }
}

impl PageSource for HttpPage {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> BoxFuture<'_, GreenlightResult<String>> {
        Box::pin(async move {
            let fetch_error = |message: String| GreenlightError::Fetch {
                url: self.url.clone(),
                message,
            };

            debug!(url = %self.url, "Fetching showtimes page");
            let response = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(|e| fetch_error(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(fetch_error(format!("HTTP {}", status)));
            }

            let body = response
                .text()
                .await
                .map_err(|e| fetch_error(e.to_string()))?;
            debug!(bytes = body.len(), "Fetched showtimes page");
            Ok(body)
        })
    }
}

/// A showtimes page saved to disk.
pub struct HtmlFile(pub PathBuf);

impl PageSource for HtmlFile {
    fn describe(&self) -> String {
        self.0.display().to_string()
    }

    fn fetch(&self) -> BoxFuture<'_, GreenlightResult<String>> {
        let result = std::fs::read_to_string(&self.0).map_err(|e| GreenlightError::Fetch {
            url: self.describe(),
            message: e.to_string(),
        });
        Box::pin(future::ready(result))
    }
}

/// Showings from an earlier `events dump`, bypassing the page entirely.
pub struct ShowingsFile(pub PathBuf);

impl ShowingsFile {
    /// Identities are recomputed, so a hand-edited dump still matches
    /// the events a live scrape would produce.
    pub fn read(&self) -> GreenlightResult<Vec<ShowingRecord>> {
        let mut showings = dump::read_showings(&self.0)?;
        for showing in &mut showings {
            showing.source_identity = source_identity(&showing.film_title, &showing.start_time);
        }
        Ok(showings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn html_file_reads_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<html></html>").unwrap();
        let html = HtmlFile(path).fetch().await.unwrap();
        assert_eq!(html, "<html></html>");
    }

    #[tokio::test]
    async fn missing_html_file_is_a_fetch_error() {
        let err = HtmlFile(PathBuf::from("/nonexistent/page.html"))
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err, GreenlightError::Fetch { .. }));
    }

    #[test]
    fn edited_dump_gets_fresh_identities() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("showings.json");

        let start = chrono::DateTime::parse_from_rfc3339("2026-03-01T19:00:00-05:00").unwrap();
        let end = start + chrono::Duration::hours(2);
        let mut edited = ShowingRecord::new("Alien", start, end);
        edited.film_title = "Aliens".to_string();
        dump::write_showings(Some(&path), &[edited]).unwrap();

        let showings = ShowingsFile(path).read().unwrap();
        assert_eq!(
            showings[0].source_identity,
            ShowingRecord::new("Aliens", start, end).source_identity
        );
    }
}
