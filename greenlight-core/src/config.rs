//! Settings and credential resolution.
//!
//! Values are resolved once, up front, and handed to the rest of the crate
//! as plain structs. The environment is passed in as a lookup function so
//! precedence can be tested without touching the process environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_CALENDAR_NAME, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RUNTIME_MINUTES, DEFAULT_SOURCE_URL,
    DEFAULT_TIMEZONE,
};
use crate::error::{GreenlightError, GreenlightResult};
use crate::extract::ExtractOptions;

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_runtime() -> String {
    format!("{}m", DEFAULT_RUNTIME_MINUTES)
}

fn default_calendar_name() -> String {
    DEFAULT_CALENDAR_NAME.to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Optional settings file at ~/.config/greenlight-cal/config.toml,
/// overridable with `GREENLIGHT_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(default = "default_source_url")]
    pub source_url: String,

    /// IANA zone for showtimes printed without an offset.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Runtime for showings without an end or duration, e.g. "2h" or "1h 45m".
    #[serde(default = "default_runtime")]
    pub default_runtime: String,

    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub calendar_id: Option<String>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            timezone: default_timezone(),
            default_runtime: default_runtime(),
            calendar_name: default_calendar_name(),
            request_timeout_secs: default_request_timeout(),
            calendar_id: None,
        }
    }
}

impl FileConfig {
    pub fn default_path() -> GreenlightResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| GreenlightError::Config("Could not determine config directory".into()))?
            .join("greenlight-cal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load settings. An explicitly given file must exist; the default one
    /// is optional.
    pub fn load(path: Option<&Path>) -> GreenlightResult<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::default_path()?, false),
        };

        Config::builder()
            .add_source(File::from(path).required(required))
            .add_source(Environment::with_prefix("GREENLIGHT").try_parsing(true))
            .build()
            .map_err(|e| GreenlightError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| GreenlightError::Config(e.to_string()))
    }

    pub fn extract_options(&self) -> GreenlightResult<ExtractOptions> {
        let timezone: Tz = self.timezone.parse().map_err(|_| {
            GreenlightError::Config(format!("Unknown time zone '{}'", self.timezone))
        })?;
        let runtime = humantime::parse_duration(&self.default_runtime).map_err(|e| {
            GreenlightError::Config(format!(
                "Invalid default_runtime '{}': {}",
                self.default_runtime, e
            ))
        })?;
        let default_runtime = chrono::Duration::from_std(runtime)
            .map_err(|e| GreenlightError::Config(format!("default_runtime out of range: {}", e)))?;

        Ok(ExtractOptions {
            timezone,
            default_runtime,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Everything a sync run needs.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub calendar_id: String,
    pub source_url: String,
    pub extract: ExtractOptions,
    pub request_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            calendar_id: String::new(),
            source_url: default_source_url(),
            extract: ExtractOptions::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl SyncConfig {
    pub fn new(file: &FileConfig, calendar_id: String) -> GreenlightResult<Self> {
        Ok(Self {
            calendar_id,
            source_url: file.source_url.clone(),
            extract: file.extract_options()?,
            request_timeout: file.request_timeout(),
        })
    }
}

/// Variables read from a `.env` file.
///
/// Kept apart from the process environment, which always takes precedence.
#[derive(Debug, Clone, Default)]
pub struct DotEnv(HashMap<String, String>);

impl DotEnv {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

impl FromIterator<(String, String)> for DotEnv {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        DotEnv(iter.into_iter().collect())
    }
}

/// The process environment followed by `.env`.
pub struct EnvLookup<'a> {
    process: &'a dyn Fn(&str) -> Option<String>,
    dotenv: &'a DotEnv,
}

impl<'a> EnvLookup<'a> {
    pub fn new(process: &'a dyn Fn(&str) -> Option<String>, dotenv: &'a DotEnv) -> Self {
        Self { process, dotenv }
    }

    fn process(&self, key: &str) -> Option<String> {
        (self.process)(key).and_then(non_empty)
    }

    fn dotenv(&self, key: &str) -> Option<String> {
        self.dotenv.get(key).map(str::to_string).and_then(non_empty)
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// `--calendar-id`, then `CALENDAR_ID` from the environment, then from
/// `.env`, then the config file.
pub fn resolve_calendar_id(
    flag: Option<&str>,
    env: &EnvLookup<'_>,
    file: &FileConfig,
) -> GreenlightResult<String> {
    flag.map(str::to_string)
        .and_then(non_empty)
        .or_else(|| env.process("CALENDAR_ID"))
        .or_else(|| env.dotenv("CALENDAR_ID"))
        .or_else(|| file.calendar_id.clone().and_then(non_empty))
        .ok_or_else(|| {
            GreenlightError::Config(
                "No calendar id. Pass --calendar-id, set CALENDAR_ID, or add calendar_id to the config file"
                    .into(),
            )
        })
}

/// Where the service-account key comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialSource {
    File(PathBuf),
    Inline(String),
}

impl CredentialSource {
    /// The key's JSON text.
    pub fn read(&self) -> GreenlightResult<String> {
        match self {
            CredentialSource::File(path) => std::fs::read_to_string(path).map_err(|e| {
                GreenlightError::Config(format!(
                    "Could not read credentials file {}: {}",
                    path.display(),
                    e
                ))
            }),
            CredentialSource::Inline(json) => Ok(json.clone()),
        }
    }
}

/// `--credentials-file` or `CREDENTIALS_FILE`, then inline `CREDENTIALS_JSON`,
/// then the same two keys from `.env`.
pub fn resolve_credentials(
    flag: Option<&Path>,
    env: &EnvLookup<'_>,
) -> GreenlightResult<CredentialSource> {
    if let Some(path) = flag {
        return Ok(CredentialSource::File(expand_path(&path.to_string_lossy())));
    }
    if let Some(path) = env.process("CREDENTIALS_FILE") {
        return Ok(CredentialSource::File(expand_path(&path)));
    }
    if let Some(json) = env.process("CREDENTIALS_JSON") {
        return Ok(CredentialSource::Inline(json));
    }
    if let Some(path) = env.dotenv("CREDENTIALS_FILE") {
        return Ok(CredentialSource::File(expand_path(&path)));
    }
    if let Some(json) = env.dotenv("CREDENTIALS_JSON") {
        return Ok(CredentialSource::Inline(json));
    }
    Err(GreenlightError::Config(
        "No credentials. Pass --credentials-file, or set CREDENTIALS_FILE or CREDENTIALS_JSON".into(),
    ))
}

pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}
