//! Error types for greenlight-cal.

use thiserror::Error;

/// Errors that can occur while scraping showtimes or syncing the calendar.
#[derive(Error, Debug)]
pub enum GreenlightError {
    /// The showtimes page could not be retrieved. Fatal for a sync run.
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// A single showing could not be parsed. The entry is skipped.
    #[error("Could not parse showing: {0}")]
    Parse(String),

    /// A calendar service call failed.
    #[error("Calendar API error ({operation}): {message}")]
    CalendarApi { operation: String, message: String },

    /// Missing or invalid configuration (credentials, calendar id, ...).
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Refusing to sync: {0}")]
    Refused(String),
}

impl GreenlightError {
    pub fn api(operation: impl Into<String>, message: impl Into<String>) -> Self {
        GreenlightError::CalendarApi {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for GreenlightError {
    fn from(e: serde_json::Error) -> Self {
        GreenlightError::Serialization(e.to_string())
    }
}

/// Result type alias for greenlight operations.
pub type GreenlightResult<T> = Result<T, GreenlightError>;
