//! Google Calendar v3 over REST.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, SecondsFormat, Utc};
use greenlight_core::calendar::{AclRole, AclRule, AclScope, CalendarInfo};
use greenlight_core::client::{BoxFuture, CalendarClient};
use greenlight_core::error::{GreenlightError, GreenlightResult};
use greenlight_core::event::CalendarEvent;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::auth::TokenProvider;
use crate::convert::{FromGoogle, to_google_acl, to_google_event};
use crate::credentials::ServiceAccountKey;
use crate::types::{
    AclPage, CalendarListPage, ErrorBody, EventsPage, GoogleAclRule, GoogleCalendarResource,
    GoogleEvent,
};

const API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const MAX_RESULTS: &str = "2500";

/// A [`CalendarClient`] acting as a Google service account.
pub struct GoogleCalendar {
    http: reqwest::Client,
    auth: TokenProvider,
}

impl GoogleCalendar {
    pub fn new(key: ServiceAccountKey, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        let auth = TokenProvider::new(key, http.clone());
        Ok(Self { http, auth })
    }

    /// Build a client from the text of a service account key file.
    pub fn from_key_json(json: &str, timeout: Duration) -> Result<Self> {
        Self::new(ServiceAccountKey::from_json(json)?, timeout)
    }

    pub fn account(&self) -> &str {
        self.auth.client_email()
    }

    async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let token = self.auth.access_token().await?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T> {
        let response = self.request(Method::GET, url).await?.query(query).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<T> {
        let response = self.request(method, url).await?.json(body).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn delete(&self, url: Url) -> Result<StatusCode> {
        let response = self.request(Method::DELETE, url).await?.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Ok(status);
        }
        check(response).await?;
        Ok(status)
    }

    async fn fetch_calendars(&self) -> Result<Vec<CalendarInfo>> {
        let url = endpoint(&["users", "me", "calendarList"])?;
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = Vec::new();
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }
            let page: CalendarListPage = self.get_json(url.clone(), &query).await?;
            for entry in page.items {
                calendars.push(CalendarInfo::from_google(entry)?);
            }
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(calendars)
    }

    async fn insert_calendar(&self, name: &str, time_zone: &str) -> Result<CalendarInfo> {
        let body = GoogleCalendarResource {
            id: None,
            summary: name.to_string(),
            time_zone: Some(time_zone.to_string()),
        };
        let created: GoogleCalendarResource = self
            .send_json(Method::POST, endpoint(&["calendars"])?, &body)
            .await?;
        let id = created
            .id
            .ok_or_else(|| anyhow!("Created calendar has no id"))?;

        Ok(CalendarInfo {
            id,
            name: created.summary,
            primary: false,
            access_role: Some(AclRole::Owner.as_str().to_string()),
        })
    }

    async fn fetch_acl(&self, calendar_id: &str) -> Result<Vec<AclRule>> {
        let url = endpoint(&["calendars", calendar_id, "acl"])?;
        let mut rules = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = Vec::new();
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }
            let page: AclPage = self.get_json(url.clone(), &query).await?;
            for rule in page.items {
                match AclRule::from_google(rule) {
                    Ok(rule) => rules.push(rule),
                    Err(e) => warn!("Skipping ACL rule: {:#}", e),
                }
            }
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(rules)
    }

    async fn insert_acl(&self, calendar_id: &str, role: AclRole, scope: &AclScope) -> Result<AclRule> {
        let url = endpoint(&["calendars", calendar_id, "acl"])?;
        let created: GoogleAclRule = self
            .send_json(Method::POST, url, &to_google_acl(role, scope))
            .await?;
        AclRule::from_google(created)
    }

    async fn fetch_events(
        &self,
        calendar_id: &str,
        time_min: Option<DateTime<Utc>>,
    ) -> Result<Vec<CalendarEvent>> {
        let url = endpoint(&["calendars", calendar_id, "events"])?;
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
                ("maxResults", MAX_RESULTS.to_string()),
            ];
            if let Some(min) = time_min {
                query.push(("timeMin", min.to_rfc3339_opts(SecondsFormat::Secs, true)));
            }
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let page: EventsPage = self.get_json(url.clone(), &query).await?;
            for event in page.items {
                if event.status.as_deref() == Some("cancelled") {
                    continue;
                }
                events.push(CalendarEvent::from_google(event)?);
            }
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(calendar = calendar_id, count = events.len(), "Fetched events");
        Ok(events)
    }

    async fn insert_event(&self, calendar_id: &str, event: &CalendarEvent) -> Result<CalendarEvent> {
        let url = endpoint(&["calendars", calendar_id, "events"])?;
        let created: GoogleEvent = self
            .send_json(Method::POST, url, &to_google_event(event))
            .await
            .with_context(|| format!("Failed to create event: {}", event.summary))?;
        CalendarEvent::from_google(created)
    }

    /// Replace the event. Fields missing from `event` are cleared.
    async fn replace_event(&self, calendar_id: &str, event: &CalendarEvent) -> Result<CalendarEvent> {
        let event_id = event
            .id
            .as_deref()
            .ok_or_else(|| anyhow!("Event has no id: {}", event.summary))?;
        let url = endpoint(&["calendars", calendar_id, "events", event_id])?;
        let updated: GoogleEvent = self
            .send_json(Method::PUT, url, &to_google_event(event))
            .await
            .with_context(|| format!("Failed to update event: {}", event.summary))?;
        CalendarEvent::from_google(updated)
    }
}

/// `API_BASE` plus percent-encoded path segments.
fn endpoint(segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(API_BASE)?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("Invalid API base URL"))?
        .extend(segments);
    Ok(url)
}

/// Turn a non-2xx response into an error carrying Google's message.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    bail!("HTTP {}: {}", status, message.trim())
}

fn api_error(operation: &str, e: anyhow::Error) -> GreenlightError {
    GreenlightError::api(operation, format!("{:#}", e))
}

impl CalendarClient for GoogleCalendar {
    fn list_calendars(&self) -> BoxFuture<'_, GreenlightResult<Vec<CalendarInfo>>> {
        Box::pin(async move {
            self.fetch_calendars()
                .await
                .map_err(|e| api_error("list calendars", e))
        })
    }

    fn create_calendar<'a>(
        &'a self,
        name: &'a str,
        time_zone: &'a str,
    ) -> BoxFuture<'a, GreenlightResult<CalendarInfo>> {
        Box::pin(async move {
            self.insert_calendar(name, time_zone)
                .await
                .map_err(|e| api_error("create calendar", e))
        })
    }

    fn delete_calendar<'a>(&'a self, calendar_id: &'a str) -> BoxFuture<'a, GreenlightResult<()>> {
        Box::pin(async move {
            let url = endpoint(&["calendars", calendar_id]).map_err(|e| api_error("delete calendar", e))?;
            let status = self
                .delete(url)
                .await
                .map_err(|e| api_error("delete calendar", e))?;
            if !status.is_success() {
                return Err(GreenlightError::api(
                    "delete calendar",
                    format!("calendar {} not found", calendar_id),
                ));
            }
            Ok(())
        })
    }

    fn list_acl<'a>(&'a self, calendar_id: &'a str) -> BoxFuture<'a, GreenlightResult<Vec<AclRule>>> {
        Box::pin(async move {
            self.fetch_acl(calendar_id)
                .await
                .map_err(|e| api_error("list ACL", e))
        })
    }

    fn grant_access<'a>(
        &'a self,
        calendar_id: &'a str,
        role: AclRole,
        scope: &'a AclScope,
    ) -> BoxFuture<'a, GreenlightResult<AclRule>> {
        Box::pin(async move {
            self.insert_acl(calendar_id, role, scope)
                .await
                .map_err(|e| api_error("grant access", e))
        })
    }

    fn revoke_access<'a>(
        &'a self,
        calendar_id: &'a str,
        rule_id: &'a str,
    ) -> BoxFuture<'a, GreenlightResult<()>> {
        Box::pin(async move {
            let url = endpoint(&["calendars", calendar_id, "acl", rule_id])
                .map_err(|e| api_error("revoke access", e))?;
            self.delete(url)
                .await
                .map_err(|e| api_error("revoke access", e))?;
            Ok(())
        })
    }

    fn list_events<'a>(
        &'a self,
        calendar_id: &'a str,
        time_min: Option<DateTime<Utc>>,
    ) -> BoxFuture<'a, GreenlightResult<Vec<CalendarEvent>>> {
        Box::pin(async move {
            self.fetch_events(calendar_id, time_min)
                .await
                .map_err(|e| api_error("list events", e))
        })
    }

    fn create_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event: &'a CalendarEvent,
    ) -> BoxFuture<'a, GreenlightResult<CalendarEvent>> {
        Box::pin(async move {
            self.insert_event(calendar_id, event)
                .await
                .map_err(|e| api_error("create event", e))
        })
    }

    fn update_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event: &'a CalendarEvent,
    ) -> BoxFuture<'a, GreenlightResult<CalendarEvent>> {
        Box::pin(async move {
            self.replace_event(calendar_id, event)
                .await
                .map_err(|e| api_error("update event", e))
        })
    }

    fn delete_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, GreenlightResult<()>> {
        Box::pin(async move {
            let url = endpoint(&["calendars", calendar_id, "events", event_id])
                .map_err(|e| api_error("delete event", e))?;
            let status = self
                .delete(url)
                .await
                .with_context(|| format!("Failed to delete event: {}", event_id))
                .map_err(|e| api_error("delete event", e))?;
            if !status.is_success() {
                debug!(event_id, "Event was already gone");
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_encodes_calendar_ids() {
        let url = endpoint(&["calendars", "c_abc#holiday@group.calendar.google.com", "events"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/c_abc%23holiday@group.calendar.google.com/events"
        );
    }

    #[test]
    fn endpoint_keeps_slashes_inside_segments() {
        let url = endpoint(&["calendars", "a/b", "acl", "user:x@example.com"]).unwrap();
        assert!(url.as_str().ends_with("/calendars/a%2Fb/acl/user:x@example.com"));
    }
}
