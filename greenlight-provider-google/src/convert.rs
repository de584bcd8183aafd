//! Conversion between core types and Calendar v3 resources.

use anyhow::{Result, anyhow};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use greenlight_core::calendar::{AclRole, AclRule, AclScope, CalendarInfo};
use greenlight_core::constants::{IDENTITY_PROPERTY, MANAGED_PROPERTY};
use greenlight_core::event::CalendarEvent;

use crate::types::{
    CalendarListEntry, EventDateTime, ExtendedProperties, GoogleAclRule, GoogleAclScope,
    GoogleEvent,
};

pub trait FromGoogle<T> {
    fn from_google(value: T) -> Result<Self>
    where
        Self: Sized;
}

impl FromGoogle<GoogleEvent> for CalendarEvent {
    fn from_google(event: GoogleEvent) -> Result<Self> {
        let id = event.id.clone().unwrap_or_default();
        let start = event
            .start
            .as_ref()
            .and_then(to_datetime)
            .ok_or_else(|| anyhow!("Event {} has no start time", id))?;
        let end = event
            .end
            .as_ref()
            .and_then(to_datetime)
            .ok_or_else(|| anyhow!("Event {} has no end time", id))?;

        let private = event
            .extended_properties
            .map(|props| props.private)
            .unwrap_or_default();

        Ok(CalendarEvent {
            id: event.id,
            summary: event.summary.unwrap_or_default(),
            description: event.description,
            location: event.location,
            start,
            end,
            html_link: event.html_link,
            identity: private.get(IDENTITY_PROPERTY).cloned(),
            managed: private.get(MANAGED_PROPERTY).is_some_and(|v| v == "true"),
        })
    }
}

impl FromGoogle<CalendarListEntry> for CalendarInfo {
    fn from_google(entry: CalendarListEntry) -> Result<Self> {
        let name = entry
            .summary_override
            .or(entry.summary)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "(unnamed)".to_string());

        Ok(CalendarInfo {
            id: entry.id,
            name,
            primary: entry.primary,
            access_role: entry.access_role,
        })
    }
}

impl FromGoogle<GoogleAclRule> for AclRule {
    fn from_google(rule: GoogleAclRule) -> Result<Self> {
        let role = AclRole::from_api(&rule.role)
            .ok_or_else(|| anyhow!("Unknown ACL role '{}'", rule.role))?;
        let scope = AclScope::from_api(&rule.scope.scope_type, rule.scope.value)
            .ok_or_else(|| anyhow!("Unknown ACL scope '{}'", rule.scope.scope_type))?;

        Ok(AclRule {
            id: rule.id.unwrap_or_default(),
            role,
            scope,
        })
    }
}

/// All-day events start at midnight UTC on their date.
fn to_datetime(time: &EventDateTime) -> Option<DateTime<FixedOffset>> {
    if let Some(dt) = time.date_time {
        return Some(dt);
    }
    time.date.and_then(midnight_utc)
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<FixedOffset>> {
    let utc = FixedOffset::east_opt(0)?;
    utc.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).single()
}

/// The request body for inserting or replacing `event`.
///
/// Managed events carry their identity tag in private extended properties,
/// which only this service account can see.
pub fn to_google_event(event: &CalendarEvent) -> GoogleEvent {
    let extended_properties = if event.managed {
        let mut props = ExtendedProperties::default();
        props
            .private
            .insert(MANAGED_PROPERTY.to_string(), "true".to_string());
        if let Some(identity) = &event.identity {
            props
                .private
                .insert(IDENTITY_PROPERTY.to_string(), identity.clone());
        }
        Some(props)
    } else {
        None
    };

    GoogleEvent {
        id: None,
        status: None,
        summary: Some(event.summary.clone()),
        description: event.description.clone(),
        location: event.location.clone(),
        html_link: None,
        start: Some(EventDateTime {
            date_time: Some(event.start),
            ..EventDateTime::default()
        }),
        end: Some(EventDateTime {
            date_time: Some(event.end),
            ..EventDateTime::default()
        }),
        extended_properties,
    }
}

pub fn to_google_acl(role: AclRole, scope: &AclScope) -> GoogleAclRule {
    GoogleAclRule {
        id: None,
        role: role.as_str().to_string(),
        scope: GoogleAclScope {
            scope_type: scope.scope_type().to_string(),
            value: scope.value().map(str::to_string),
        },
    }
}
