//! Tracing setup shared by the CLI and the providers.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const CRATES: &[&str] = &["greenlight_cal", "greenlight_core", "greenlight_provider_google"];

#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for our own crates when RUST_LOG is not set.
    pub default_level: Level,
    /// Show module paths; useful with debug output.
    pub include_target: bool,
    /// Custom filter directive, overriding both RUST_LOG and `default_level`.
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::INFO,
            include_target: false,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Settings for `-v`.
    #[must_use]
    pub fn verbose() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_target: true,
            env_filter: None,
        }
    }

    fn default_directives(&self) -> String {
        let level = self.default_level.as_str().to_lowercase();
        CRATES
            .iter()
            .map(|krate| format!("{}={}", krate, level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Install a compact stderr logger. Call once, at startup.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = match &config.env_filter {
        Some(filter) => EnvFilter::try_new(filter)?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.default_directives())),
    };

    let layer = fmt::layer()
        .compact()
        .without_time()
        .with_target(config.include_target)
        .with_writer(std::io::stderr);

    let subscriber = tracing_subscriber::registry().with(env_filter).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_cover_every_crate() {
        let directives = TracingConfig::default().default_directives();
        assert_eq!(
            directives,
            "greenlight_cal=info,greenlight_core=info,greenlight_provider_google=info"
        );
    }

    #[test]
    fn verbose_selects_debug() {
        let config = TracingConfig::verbose();
        assert_eq!(config.default_level, Level::DEBUG);
        assert!(config.default_directives().contains("greenlight_core=debug"));
    }
}
