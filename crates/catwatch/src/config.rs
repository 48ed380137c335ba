//! Application configuration loaded from TOML and the environment.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Formula used when no scoring project is configured.
pub const DEFAULT_SCORING_FORMULA: &str =
    "starsCount * 3 + forksCount * 2 + contributorsCount * 5 + commitsCount / 10";

/// Splits a comma-separated organization list, dropping blanks.
pub fn split_organizations(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", into)]
pub struct AppConfig {
    /// Path of the SQLite database file.
    #[serde(default = "default_database_url")]
    database_url: String,

    /// Address the HTTP server binds to.
    #[serde(default = "default_host")]
    host: String,

    /// Port the HTTP server binds to.
    #[serde(default = "default_port")]
    port: u16,

    /// Comma-separated organizations served when a request names none.
    #[serde(default = "default_organizations")]
    organizations: String,

    /// Scoring formula used when a rescoring request carries none.
    #[serde(default = "default_scoring_project")]
    scoring_project: String,

    /// Tracing filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    log_filter: String,
}

fn default_database_url() -> String {
    "catwatch.db".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_organizations() -> String {
    "zalando".to_string()
}

fn default_scoring_project() -> String {
    DEFAULT_SCORING_FORMULA.to_string()
}

fn default_log_filter() -> String {
    "info,catwatch=debug".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            host: default_host(),
            port: default_port(),
            organizations: default_organizations(),
            scoring_project: default_scoring_project(),
            log_filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(database_url = %config.database_url, "Config loaded successfully");
        Ok(config)
    }

    /// Loads the file at `path` if it exists, falling back to defaults, then
    /// applies `CATWATCH_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an existing file is invalid or an override
    /// cannot be parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            info!("Config file not found, using defaults");
            Self::default()
        };

        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up by environment variable name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `CATWATCH_PORT` is not a valid port.
    #[instrument(skip(self, lookup))]
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("CATWATCH_DATABASE_URL") {
            debug!(url = %url, "Overriding database url");
            self.database_url = url;
        }
        if let Some(host) = lookup("CATWATCH_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("CATWATCH_PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid CATWATCH_PORT '{}': {}", port, e)))?;
        }
        if let Some(organizations) = lookup("CATWATCH_ORGANIZATIONS") {
            self.organizations = organizations;
        }
        if let Some(formula) = lookup("CATWATCH_SCORING_PROJECT") {
            self.scoring_project = formula;
        }
        Ok(self)
    }

    /// Returns the configured organizations as a list.
    pub fn organization_list(&self) -> Vec<String> {
        split_organizations(&self.organizations)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
