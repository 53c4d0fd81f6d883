//! Application configuration loading from config.toml
//!
//! The file names the listen address, the database and the users allowed to
//! call the service. `DATABASE_URL` and `STOCK_LEDGER_BIND` override the file
//! so deployments can keep secrets and addresses out of it.

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use crate::models::Role;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "STOCK_LEDGER_CONFIG";
/// Environment variable overriding `[server] bind`
pub const BIND_ENV: &str = "STOCK_LEDGER_BIND";
/// Environment variable overriding `[database] url`
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerSettings,
    /// Database settings
    #[serde(default)]
    pub database: DatabaseSettings,
    /// Users and their bearer credentials
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

/// `[server]` section
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    /// Socket address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7500".to_string()
}

/// `[database]` section
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    /// `SeaORM` connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Pool size; keep at 1 for `SQLite`
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

const fn default_max_connections() -> u32 {
    1
}

/// One `[[users]]` entry
#[derive(Debug, Deserialize, Clone)]
pub struct UserConfig {
    /// Display name stamped into `addedBy` / `soldBy`
    pub name: String,
    /// `"admin"` or anything else for staff
    pub role: Role,
    /// Bearer credential presented by this user
    pub token: String,
}

impl AppConfig {
    /// Applies `DATABASE_URL` and `STOCK_LEDGER_BIND` when they are set.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            self.database.url = url;
        }
        if let Ok(bind) = std::env::var(BIND_ENV) {
            self.server.bind = bind;
        }
        self
    }

    /// Rejects configurations the service cannot run with.
    ///
    /// # Errors
    /// Returns an error if a user has an empty name or token, or two users share a token.
    pub fn validate(&self) -> Result<()> {
        if self.database.max_connections == 0 {
            return Err(Error::Config {
                message: "database.max_connections must be at least 1".to_string(),
            });
        }

        let mut tokens = HashSet::new();
        for user in &self.users {
            if user.name.trim().is_empty() {
                return Err(Error::Config {
                    message: "User name cannot be empty".to_string(),
                });
            }
            if user.token.trim().is_empty() {
                return Err(Error::Config {
                    message: format!("User '{}' has an empty token", user.name),
                });
            }
            if !tokens.insert(user.token.as_str()) {
                return Err(Error::Config {
                    message: format!("User '{}' reuses another user's token", user.name),
                });
            }
        }

        Ok(())
    }
}

/// Loads application configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration from `STOCK_LEDGER_CONFIG` or `./config.toml`, then
/// applies environment overrides.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());
    let config = load_config(&path)?.with_env_overrides();
    config.validate()?;
    tracing::info!(
        path = %path,
        users = config.users.len(),
        bind = %config.server.bind,
        "Loaded application configuration"
    );
    Ok(config)
}
