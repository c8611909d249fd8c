//! services/app/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use novaread_core::Theme;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub log_level: Level,
    /// How long a notification stays queued before it removes itself.
    pub notification_timeout: Duration,
    /// Reader scroll percentage above which progress is recorded.
    pub progress_threshold_pct: f64,
    /// Minimum spacing between two progress writes from one reader page.
    pub progress_flush_interval: Duration,
    pub remember_session: chrono::Duration,
    pub default_session: chrono::Duration,
    pub catalog_seed_path: Option<PathBuf>,
    pub default_theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            notification_timeout: Duration::from_millis(3000),
            progress_threshold_pct: 20.0,
            progress_flush_interval: Duration::from_millis(500),
            remember_session: chrono::Duration::days(30),
            default_session: chrono::Duration::hours(24),
            catalog_seed_path: None,
            default_theme: Theme::Light,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        let defaults = Config::default();

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let notification_timeout = env_parsed::<u64>("NOTIFICATION_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.notification_timeout);

        let progress_threshold_pct = match env_parsed::<f64>("PROGRESS_THRESHOLD_PCT")? {
            Some(pct) if !(0.0..=100.0).contains(&pct) => {
                return Err(ConfigError::InvalidValue(
                    "PROGRESS_THRESHOLD_PCT".to_string(),
                    format!("{} is outside 0..=100", pct),
                ))
            }
            Some(pct) => pct,
            None => defaults.progress_threshold_pct,
        };

        let progress_flush_interval = env_parsed::<u64>("PROGRESS_FLUSH_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.progress_flush_interval);

        let remember_session = env_parsed::<i64>("REMEMBER_SESSION_DAYS")?
            .map(chrono::Duration::days)
            .unwrap_or(defaults.remember_session);
        let default_session = env_parsed::<i64>("SESSION_HOURS")?
            .map(chrono::Duration::hours)
            .unwrap_or(defaults.default_session);

        let catalog_seed_path = std::env::var("CATALOG_SEED_PATH").ok().map(PathBuf::from);

        let default_theme = env_parsed::<Theme>("DEFAULT_THEME")?.unwrap_or(defaults.default_theme);

        Ok(Self {
            log_level,
            notification_timeout,
            progress_threshold_pct,
            progress_flush_interval,
            remember_session,
            default_session,
            catalog_seed_path,
            default_theme,
        })
    }
}

fn env_parsed<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.notification_timeout, Duration::from_secs(3));
        assert_eq!(config.progress_threshold_pct, 20.0);
        assert_eq!(config.default_theme, Theme::Light);
        assert!(config.catalog_seed_path.is_none());
    }

    #[test]
    fn unparsable_values_are_reported_with_their_variable() {
        std::env::set_var("NOVAREAD_TEST_NUMBER", "soon");
        let err = env_parsed::<u64>("NOVAREAD_TEST_NUMBER").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref name, _) if name == "NOVAREAD_TEST_NUMBER"));
        std::env::remove_var("NOVAREAD_TEST_NUMBER");

        assert!(env_parsed::<u64>("NOVAREAD_TEST_UNSET").unwrap().is_none());
    }
}
