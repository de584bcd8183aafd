pub mod calendar;
pub mod events;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use greenlight_core::CalendarClient;
use greenlight_core::client::MemoryCalendar;
use greenlight_core::config::{
    DotEnv, EnvLookup, FileConfig, SyncConfig, resolve_calendar_id, resolve_credentials,
};
use greenlight_provider_google::GoogleCalendar;
use tracing::debug;

use crate::GlobalArgs;

/// Settings shared by every command, loaded once at startup.
///
/// Nothing here touches the network; credentials and the calendar id are
/// only resolved by the commands that need them.
pub struct Context {
    pub file: FileConfig,
    pub verbose: bool,
    dotenv: DotEnv,
    calendar_id: Option<String>,
    credentials_file: Option<PathBuf>,
}

impl Context {
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let file = FileConfig::load(args.config.as_deref())?;

        Ok(Self {
            file,
            verbose: args.verbose,
            dotenv: load_dotenv(),
            calendar_id: args.calendar_id.clone(),
            credentials_file: args.credentials_file.clone(),
        })
    }

    pub fn calendar_id(&self) -> Result<String> {
        let process = |key: &str| std::env::var(key).ok();
        let env = EnvLookup::new(&process, &self.dotenv);
        Ok(resolve_calendar_id(
            self.calendar_id.as_deref(),
            &env,
            &self.file,
        )?)
    }

    pub fn google(&self) -> Result<GoogleCalendar> {
        let process = |key: &str| std::env::var(key).ok();
        let env = EnvLookup::new(&process, &self.dotenv);
        let source = resolve_credentials(self.credentials_file.as_deref(), &env)?;
        let json = source.read()?;
        let client = GoogleCalendar::from_key_json(&json, self.file.request_timeout())
            .context("Could not load service account credentials")?;
        debug!(account = client.account(), "Using service account");
        Ok(client)
    }

    pub fn sync_config(&self, calendar_id: String) -> Result<SyncConfig> {
        Ok(SyncConfig::new(&self.file, calendar_id)?)
    }

    /// Google Calendar, or a local JSON file when one is given.
    pub fn backend(&self, calendar_file: Option<&Path>) -> Result<Backend> {
        match calendar_file {
            Some(path) => Ok(Backend::File {
                calendar: MemoryCalendar::load(path)?,
                path: path.to_path_buf(),
            }),
            None => Ok(Backend::Google(self.google()?)),
        }
    }

    /// The calendar id to use with `backend`. A file calendar does not need one.
    pub fn calendar_id_for(&self, backend: &Backend) -> Result<String> {
        match backend {
            Backend::Google(_) => self.calendar_id(),
            Backend::File { .. } => Ok(self.calendar_id().unwrap_or_else(|_| "local".to_string())),
        }
    }
}

pub enum Backend {
    Google(GoogleCalendar),
    File {
        calendar: MemoryCalendar,
        path: PathBuf,
    },
}

impl Backend {
    pub fn client(&self) -> &dyn CalendarClient {
        match self {
            Backend::Google(client) => client,
            Backend::File { calendar, .. } => calendar,
        }
    }

    /// Persist changes made to a file calendar.
    pub fn finish(&self) -> Result<()> {
        if let Backend::File { calendar, path } = self {
            calendar
                .save(path)
                .with_context(|| format!("Could not write {}", path.display()))?;
        }
        Ok(())
    }
}

/// Variables from `./.env`, if there is one. They never override the
/// process environment.
fn load_dotenv() -> DotEnv {
    match dotenvy::dotenv_iter() {
        Ok(iter) => iter.filter_map(|item| item.ok()).collect(),
        Err(_) => DotEnv::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use greenlight_core::CalendarEvent;

    #[tokio::test]
    async fn file_backend_persists_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calendar.json");

        let backend = Backend::File {
            calendar: MemoryCalendar::load(&path).unwrap(),
            path: path.clone(),
        };
        let event = CalendarEvent {
            id: None,
            summary: "Alien".into(),
            description: None,
            location: None,
            start: DateTime::parse_from_rfc3339("2026-03-01T19:00:00-05:00").unwrap(),
            end: DateTime::parse_from_rfc3339("2026-03-01T21:00:00-05:00").unwrap(),
            html_link: None,
            identity: None,
            managed: false,
        };
        backend.client().create_event("local", &event).await.unwrap();
        backend.finish().unwrap();

        let reloaded = MemoryCalendar::load(&path).unwrap();
        assert_eq!(reloaded.events().len(), 1);
        assert_eq!(reloaded.events()[0].summary, "Alien");
    }
}
