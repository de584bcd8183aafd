/// Veezi sessions page for Green Light Cinema.
pub const DEFAULT_SOURCE_URL: &str =
    "https://ticketing.useast.veezi.com/sessions/?siteToken=kegxkyy004b7bm6apwhtgcm274";

/// The cinema is in St. Petersburg, Florida.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Runtime assumed when the page publishes neither an end time nor a duration.
pub const DEFAULT_RUNTIME_MINUTES: i64 = 120;

pub const DEFAULT_CALENDAR_NAME: &str = "Green Light Cinema Showtimes";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Private extended property keys stored on every event this tool creates.
pub const MANAGED_PROPERTY: &str = "greenlight-managed";
pub const IDENTITY_PROPERTY: &str = "greenlight-identity";
