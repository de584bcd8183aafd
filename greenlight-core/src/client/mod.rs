//! The boundary between the synchronizer and a calendar service.

mod memory;

pub use memory::{ClientCall, MemoryCalendar};

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};

use crate::calendar::{AclRole, AclRule, AclScope, CalendarInfo};
use crate::error::GreenlightResult;
use crate::event::CalendarEvent;

/// A boxed future, so `CalendarClient` stays object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Operations the CLI and the synchronizer need from a calendar service.
///
/// Every call is independent: a failure is reported for that call only and
/// leaves the client usable.
pub trait CalendarClient: Send + Sync {
    fn list_calendars(&self) -> BoxFuture<'_, GreenlightResult<Vec<CalendarInfo>>>;

    fn create_calendar<'a>(
        &'a self,
        name: &'a str,
        time_zone: &'a str,
    ) -> BoxFuture<'a, GreenlightResult<CalendarInfo>>;

    fn delete_calendar<'a>(&'a self, calendar_id: &'a str) -> BoxFuture<'a, GreenlightResult<()>>;

    fn list_acl<'a>(&'a self, calendar_id: &'a str) -> BoxFuture<'a, GreenlightResult<Vec<AclRule>>>;

    fn grant_access<'a>(
        &'a self,
        calendar_id: &'a str,
        role: AclRole,
        scope: &'a AclScope,
    ) -> BoxFuture<'a, GreenlightResult<AclRule>>;

    fn revoke_access<'a>(
        &'a self,
        calendar_id: &'a str,
        rule_id: &'a str,
    ) -> BoxFuture<'a, GreenlightResult<()>>;

    /// Events on the calendar, optionally only those ending after `time_min`.
    fn list_events<'a>(
        &'a self,
        calendar_id: &'a str,
        time_min: Option<DateTime<Utc>>,
    ) -> BoxFuture<'a, GreenlightResult<Vec<CalendarEvent>>>;

    /// Create an event and return it as stored, with its new id.
    fn create_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event: &'a CalendarEvent,
    ) -> BoxFuture<'a, GreenlightResult<CalendarEvent>>;

    /// Overwrite the visible fields of the event with `event.id`.
    fn update_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event: &'a CalendarEvent,
    ) -> BoxFuture<'a, GreenlightResult<CalendarEvent>>;

    /// Delete an event. Deleting an event that is already gone succeeds.
    fn delete_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, GreenlightResult<()>>;
}
