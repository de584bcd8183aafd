//! Google Calendar backend for greenlight-cal.
//!
//! Authenticates as a service account and talks to the Calendar v3 REST
//! API. The calendar must be shared with the service account's email.

mod api;
mod auth;
mod convert;
mod credentials;
mod types;

pub use api::GoogleCalendar;
pub use credentials::ServiceAccountKey;
