//! Configuration management for ClosePulse

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `CLOSEPULSE_SESSION__LOGIN_DELAY_MS`
pub const ENV_PREFIX: &str = "CLOSEPULSE";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Session persistence and simulated latency
    #[serde(default)]
    pub session: SessionConfig,

    /// Accepted credential
    #[serde(default)]
    pub auth: AuthConfig,

    /// Call and pattern data sources
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Navigation targets
    #[serde(default)]
    pub routes: RouteConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Key of the single persisted-session slot
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Directory for the file-backed store
    #[serde(default)]
    pub store_dir: Option<PathBuf>,

    /// Simulated latency of login in milliseconds
    #[serde(default = "default_latency_ms")]
    pub login_delay_ms: u64,

    /// Simulated latency of forgot-password in milliseconds
    #[serde(default = "default_latency_ms")]
    pub forgot_password_delay_ms: u64,
}

/// Accepted credential and the identity it maps to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Accepted email
    #[serde(default = "default_email")]
    pub email: String,

    /// Accepted password
    #[serde(default = "default_password")]
    pub password: String,

    /// User id of the resulting session
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Display name of the resulting session
    #[serde(default = "default_user_name")]
    pub user_name: String,
}

/// Dataset configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatasetConfig {
    /// JSON file of call records, replaces the embedded sample
    #[serde(default)]
    pub calls_path: Option<PathBuf>,

    /// JSON file of pattern groups, replaces the embedded snapshot
    #[serde(default)]
    pub patterns_path: Option<PathBuf>,

    /// Derive patterns from the dataset instead of the snapshot
    #[serde(default)]
    pub live_patterns: bool,
}

/// Route configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Where anonymous users are sent
    #[serde(default = "default_entry_route")]
    pub entry: String,

    /// Where users land after login
    #[serde(default = "default_dashboard_route")]
    pub dashboard: String,

    /// Pause between a successful login and the redirect
    #[serde(default = "default_redirect_delay_ms")]
    pub redirect_delay_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or pretty)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log to file
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_storage_key() -> String {
    "closepulse_user".to_string()
}

const fn default_latency_ms() -> u64 {
    1000
}

fn default_email() -> String {
    "demo@closepulse.com".to_string()
}

fn default_password() -> String {
    "password".to_string()
}

fn default_user_id() -> String {
    "user-1".to_string()
}

fn default_user_name() -> String {
    "Demo User".to_string()
}

fn default_entry_route() -> String {
    "/".to_string()
}

fn default_dashboard_route() -> String {
    "/dashboard".to_string()
}

const fn default_redirect_delay_ms() -> u64 {
    1500
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            store_dir: None,
            login_delay_ms: default_latency_ms(),
            forgot_password_delay_ms: default_latency_ms(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            email: default_email(),
            password: default_password(),
            user_id: default_user_id(),
            user_name: default_user_name(),
        }
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            entry: default_entry_route(),
            dashboard: default_dashboard_route(),
            redirect_delay_ms: default_redirect_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from an optional `closepulse.*` file and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, parsed or validated.
    pub fn load() -> crate::Result<Self> {
        Self::build(config::File::with_name("closepulse").required(false))
    }

    /// Load configuration from an explicit file, still honouring the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or the result does not validate.
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        Self::build(config::File::from(path).required(true))
    }

    fn build<S>(file: S) -> crate::Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let loaded: Self = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| crate::Error::Configuration {
                message: e.to_string(),
            })?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Check invariants that serde defaults cannot express
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first offending field.
    pub fn validate(&self) -> crate::Result<()> {
        if self.session.storage_key.trim().is_empty() {
            return Err(crate::Error::configuration("session.storage_key is empty"));
        }
        if self.auth.email.is_empty() || self.auth.password.is_empty() {
            return Err(crate::Error::configuration(
                "auth.email and auth.password must both be set",
            ));
        }
        if self.auth.user_id.is_empty() {
            return Err(crate::Error::configuration("auth.user_id is empty"));
        }
        for (name, route) in [
            ("routes.entry", &self.routes.entry),
            ("routes.dashboard", &self.routes.dashboard),
        ] {
            if !route.starts_with('/') {
                return Err(crate::Error::configuration(format!(
                    "{name} must start with '/', got '{route}'"
                )));
            }
        }
        Ok(())
    }
}
