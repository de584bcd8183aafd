use std::collections::HashSet;
use std::future;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::calendar::{AclRole, AclRule, AclScope, CalendarInfo};
use crate::client::{BoxFuture, CalendarClient};
use crate::dump;
use crate::error::{GreenlightError, GreenlightResult};
use crate::event::CalendarEvent;

/// A call made against a [`MemoryCalendar`], recorded in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCall {
    ListCalendars,
    CreateCalendar(String),
    DeleteCalendar(String),
    ListAcl,
    GrantAccess(String),
    RevokeAccess(String),
    ListEvents,
    /// Summary of the event being created.
    CreateEvent(String),
    UpdateEvent(String),
    DeleteEvent(String),
}

/// A single calendar held in memory.
///
/// Backs offline runs against a JSON file of events, and stands in for the
/// remote service in tests. Calls targeting an event listed through
/// [`MemoryCalendar::with_failing_event`] fail without changing anything.
#[derive(Debug, Default)]
pub struct MemoryCalendar {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    calendars: Vec<CalendarInfo>,
    events: Vec<CalendarEvent>,
    acl: Vec<AclRule>,
    calls: Vec<ClientCall>,
    failing: HashSet<String>,
    next_id: u64,
}

impl MemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        let next_id = events.len() as u64;
        Self {
            state: Mutex::new(State {
                events,
                next_id,
                ..State::default()
            }),
        }
    }

    /// Load events from a JSON file. A missing file is an empty calendar.
    pub fn load(path: &Path) -> GreenlightResult<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        Ok(Self::with_events(dump::read_events(path)?))
    }

    pub fn save(&self, path: &Path) -> GreenlightResult<()> {
        dump::write_events(path, &self.events())
    }

    /// Make every call touching this event id or identity tag fail.
    pub fn with_failing_event(self, key: impl Into<String>) -> Self {
        self.lock().failing.insert(key.into());
        self
    }

    pub fn events(&self) -> Vec<CalendarEvent> {
        self.lock().events.clone()
    }

    pub fn calls(&self) -> Vec<ClientCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock leaves plain data behind.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        loop {
            self.next_id += 1;
            let id = format!("{}-{}", prefix, self.next_id);
            let taken = self.events.iter().any(|e| e.id.as_deref() == Some(id.as_str()))
                || self.calendars.iter().any(|c| c.id == id);
            if !taken {
                return id;
            }
        }
    }

    fn fails(&self, event: &CalendarEvent) -> bool {
        event.id.as_ref().is_some_and(|id| self.failing.contains(id))
            || event.identity.as_ref().is_some_and(|id| self.failing.contains(id))
    }
}

fn injected(operation: &str, label: impl std::fmt::Display) -> GreenlightError {
    GreenlightError::api(operation, format!("injected failure for {}", label))
}

fn ready<'a, T: Send + 'a>(value: T) -> BoxFuture<'a, T> {
    Box::pin(future::ready(value))
}

impl CalendarClient for MemoryCalendar {
    fn list_calendars(&self) -> BoxFuture<'_, GreenlightResult<Vec<CalendarInfo>>> {
        let mut state = self.lock();
        state.calls.push(ClientCall::ListCalendars);
        ready(Ok(state.calendars.clone()))
    }

    fn create_calendar<'a>(
        &'a self,
        name: &'a str,
        _time_zone: &'a str,
    ) -> BoxFuture<'a, GreenlightResult<CalendarInfo>> {
        let mut state = self.lock();
        state.calls.push(ClientCall::CreateCalendar(name.to_string()));
        let calendar = CalendarInfo {
            id: state.next_id("calendar"),
            name: name.to_string(),
            primary: false,
            access_role: Some("owner".to_string()),
        };
        state.calendars.push(calendar.clone());
        ready(Ok(calendar))
    }

    fn delete_calendar<'a>(&'a self, calendar_id: &'a str) -> BoxFuture<'a, GreenlightResult<()>> {
        let mut state = self.lock();
        state
            .calls
            .push(ClientCall::DeleteCalendar(calendar_id.to_string()));
        state.calendars.retain(|c| c.id != calendar_id);
        ready(Ok(()))
    }

    fn list_acl<'a>(&'a self, _calendar_id: &'a str) -> BoxFuture<'a, GreenlightResult<Vec<AclRule>>> {
        let mut state = self.lock();
        state.calls.push(ClientCall::ListAcl);
        ready(Ok(state.acl.clone()))
    }

    fn grant_access<'a>(
        &'a self,
        _calendar_id: &'a str,
        role: AclRole,
        scope: &'a AclScope,
    ) -> BoxFuture<'a, GreenlightResult<AclRule>> {
        let mut state = self.lock();
        let id = match scope.value() {
            Some(value) => format!("{}:{}", scope.scope_type(), value),
            None => scope.scope_type().to_string(),
        };
        state.calls.push(ClientCall::GrantAccess(id.clone()));
        let rule = AclRule {
            id: id.clone(),
            role,
            scope: scope.clone(),
        };
        state.acl.retain(|r| r.id != id);
        state.acl.push(rule.clone());
        ready(Ok(rule))
    }

    fn revoke_access<'a>(
        &'a self,
        _calendar_id: &'a str,
        rule_id: &'a str,
    ) -> BoxFuture<'a, GreenlightResult<()>> {
        let mut state = self.lock();
        state
            .calls
            .push(ClientCall::RevokeAccess(rule_id.to_string()));
        let before = state.acl.len();
        state.acl.retain(|r| r.id != rule_id);
        if state.acl.len() == before {
            return ready(Err(GreenlightError::api(
                "revoke access",
                format!("no ACL rule {}", rule_id),
            )));
        }
        ready(Ok(()))
    }

    fn list_events<'a>(
        &'a self,
        _calendar_id: &'a str,
        time_min: Option<DateTime<Utc>>,
    ) -> BoxFuture<'a, GreenlightResult<Vec<CalendarEvent>>> {
        let mut state = self.lock();
        state.calls.push(ClientCall::ListEvents);
        let mut events: Vec<CalendarEvent> = state
            .events
            .iter()
            .filter(|e| time_min.is_none_or(|min| e.end > min))
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start);
        ready(Ok(events))
    }

    fn create_event<'a>(
        &'a self,
        _calendar_id: &'a str,
        event: &'a CalendarEvent,
    ) -> BoxFuture<'a, GreenlightResult<CalendarEvent>> {
        let mut state = self.lock();
        state
            .calls
            .push(ClientCall::CreateEvent(event.summary.clone()));
        if state.fails(event) {
            return ready(Err(injected("create event", event)));
        }
        let mut created = event.clone();
        created.id = Some(state.next_id("event"));
        state.events.push(created.clone());
        ready(Ok(created))
    }

    fn update_event<'a>(
        &'a self,
        _calendar_id: &'a str,
        event: &'a CalendarEvent,
    ) -> BoxFuture<'a, GreenlightResult<CalendarEvent>> {
        let mut state = self.lock();
        let Some(id) = event.id.clone() else {
            return ready(Err(GreenlightError::api(
                "update event",
                format!("{} has no event id", event),
            )));
        };
        state.calls.push(ClientCall::UpdateEvent(id.clone()));
        if state.fails(event) {
            return ready(Err(injected("update event", &id)));
        }
        let Some(stored) = state.events.iter_mut().find(|e| e.id.as_deref() == Some(&id)) else {
            return ready(Err(GreenlightError::api(
                "update event",
                format!("no event {}", id),
            )));
        };
        *stored = event.clone();
        ready(Ok(event.clone()))
    }

    fn delete_event<'a>(
        &'a self,
        _calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, GreenlightResult<()>> {
        let mut state = self.lock();
        state
            .calls
            .push(ClientCall::DeleteEvent(event_id.to_string()));
        let target = state
            .events
            .iter()
            .find(|e| e.id.as_deref() == Some(event_id))
            .cloned();
        if state.failing.contains(event_id) || target.is_some_and(|e| state.fails(&e)) {
            return ready(Err(injected("delete event", event_id)));
        }
        state.events.retain(|e| e.id.as_deref() != Some(event_id));
        ready(Ok(()))
    }
}
