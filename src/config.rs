//! Configuration management for Invent server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. `sqlite://data/invent.db` or `sqlite::memory:`
    pub url: String,
    pub max_connections: u32,
    /// How long a connection waits on a locked database before giving up
    pub busy_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
    /// Account seeded at startup when no admin with this name exists
    pub admin_username: String,
    pub admin_password: String,
}

/// Log output format
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// When set, logs are also written to daily rolling files in this directory
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UploadsConfig {
    pub directory: PathBuf,
    pub max_file_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackupConfig {
    /// Where database copies are written
    pub directory: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub backup: BackupConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix INVENT_)
            .add_source(
                Environment::with_prefix("INVENT")
                    .separator("_")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("auth.jwt_secret", env::var("JWT_SECRET").ok())?
            .set_override_option("auth.admin_username", env::var("ADMIN_USERNAME").ok())?
            .set_override_option("auth.admin_password", env::var("ADMIN_PASSWORD").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/invent.db".to_string(),
            max_connections: 5,
            busy_timeout_secs: 5,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-this-secret-in-production".to_string(),
            jwt_expiration_hours: 12,
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            directory: None,
        }
    }
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data/uploads"),
            max_file_size: 5 * 1024 * 1024,
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data/backups"),
        }
    }
}
