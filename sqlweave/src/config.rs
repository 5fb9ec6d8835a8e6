//! Driver configuration

use crate::{Error, Result};
use std::time::Duration;

/// Environment variable read by [`SqliteConfig::from_env`]
pub const DATABASE_URL_ENV: &str = "SQLWEAVE_DATABASE_URL";

/// Connection settings for the SQLite driver
#[derive(Debug, Clone, PartialEq)]
pub struct SqliteConfig {
    /// Database URL, e.g. `sqlite://app.db` or `sqlite::memory:`
    pub url: String,
    /// Create the database file when it does not exist
    pub create_if_missing: bool,
    /// How long to wait on a locked database before failing
    pub busy_timeout: Duration,
    /// Enforce foreign key constraints
    pub foreign_keys: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            create_if_missing: true,
            busy_timeout: Duration::from_secs(5),
            foreign_keys: true,
        }
    }
}

impl SqliteConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// A private in-memory database
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Read the URL from `SQLWEAVE_DATABASE_URL`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(DATABASE_URL_ENV) {
            Some(url) if !url.trim().is_empty() => Ok(Self::new(url.trim())),
            _ => Err(Error::config(format!("{} is not set", DATABASE_URL_ENV))),
        }
    }

    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn with_foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::config("database url is empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SqliteConfig::default();
        assert_eq!(config.url, "sqlite::memory:");
        assert!(config.create_if_missing);
        assert!(config.foreign_keys);
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = SqliteConfig::new("sqlite://app.db")
            .with_create_if_missing(false)
            .with_busy_timeout(Duration::from_millis(250))
            .with_foreign_keys(false);
        assert_eq!(config.url, "sqlite://app.db");
        assert!(!config.create_if_missing);
        assert!(!config.foreign_keys);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_from_lookup() {
        let config = SqliteConfig::from_lookup(|key| {
            assert_eq!(key, DATABASE_URL_ENV);
            Some(" sqlite://data.db ".to_string())
        })
        .unwrap();
        assert_eq!(config.url, "sqlite://data.db");

        let missing = SqliteConfig::from_lookup(|_| None);
        assert!(matches!(missing, Err(Error::Config { .. })));

        let blank = SqliteConfig::from_lookup(|_| Some("  ".to_string()));
        assert!(matches!(blank, Err(Error::Config { .. })));
    }

    #[test]
    fn test_empty_url_is_invalid() {
        assert!(matches!(
            SqliteConfig::new("").validate(),
            Err(Error::Config { .. })
        ));
    }
}
