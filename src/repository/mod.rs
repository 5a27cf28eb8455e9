//! Repository layer for database operations

pub mod admins;
pub mod credentials;
pub mod employees;
pub mod equipment;
pub mod equipment_types;
pub mod events;

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};

use crate::{
    config::DatabaseConfig,
    error::{AppError, AppResult},
};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Sqlite>,
    pub types: equipment_types::EquipmentTypesRepository,
    pub employees: employees::EmployeesRepository,
    pub equipment: equipment::EquipmentRepository,
    pub credentials: credentials::CredentialsRepository,
    pub events: events::EventsRepository,
    pub admins: admins::AdminsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self {
            types: equipment_types::EquipmentTypesRepository::new(pool.clone()),
            employees: employees::EmployeesRepository::new(pool.clone()),
            equipment: equipment::EquipmentRepository::new(pool.clone()),
            credentials: credentials::CredentialsRepository::new(pool.clone()),
            events: events::EventsRepository::new(pool.clone()),
            admins: admins::AdminsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Open the SQLite store and apply pending migrations
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let in_memory = config.url.contains(":memory:") || config.url.contains("mode=memory");
        let busy_timeout = Duration::from_secs(config.busy_timeout_secs);

        let mut options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| AppError::Internal(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(busy_timeout);

        if !in_memory {
            let filename = options.clone().get_filename().to_path_buf();
            if let Some(parent) = filename.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
        }

        // Every connection to `:memory:` opens its own database, so keep exactly one alive
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections.max(1))
        };

        let pool = pool_options
            .acquire_timeout(busy_timeout)
            .connect_with(options)
            .await?;

        tracing::info!(
            "Database connection established (SQLite, busy_timeout={}s)",
            config.busy_timeout_secs
        );

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to apply migrations: {}", e)))?;

        tracing::info!("Database migrations applied");

        Ok(Self::new(pool))
    }

    /// Cheap round trip used by the readiness probe
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Write a consistent copy of the whole database to `path`, which must not exist
    pub async fn backup_into(&self, path: &Path) -> AppResult<()> {
        sqlx::query("VACUUM INTO ?")
            .bind(path.to_string_lossy().into_owned())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
