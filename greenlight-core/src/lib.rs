//! Core types and logic for greenlight-cal.
//!
//! This crate is shared by the CLI and the calendar providers:
//! - `extract` turns the showtimes page into `ShowingRecord`s
//! - `sync` diffs those records against a calendar and applies the changes
//! - `client` defines the `CalendarClient` capability providers implement

pub mod access;
pub mod calendar;
pub mod client;
pub mod config;
pub mod constants;
pub mod dump;
pub mod error;
pub mod event;
pub mod extract;
pub mod logging;
pub mod showing;
pub mod source;
pub mod sync;

pub use calendar::{AclRole, AclRule, AclScope, CalendarInfo};
pub use client::{BoxFuture, CalendarClient};
pub use error::{GreenlightError, GreenlightResult};
pub use event::CalendarEvent;
pub use showing::ShowingRecord;
