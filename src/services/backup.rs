//! Database backups

use std::path::PathBuf;

use chrono::{Local, Utc};

use crate::{
    api::backup::BackupInfo,
    config::BackupConfig,
    error::{AppError, AppResult},
    repository::Repository,
};

#[derive(Clone)]
pub struct BackupService {
    repository: Repository,
    directory: PathBuf,
}

impl BackupService {
    pub fn new(repository: Repository, config: BackupConfig) -> Self {
        Self {
            repository,
            directory: config.directory,
        }
    }

    /// Copy the database to `invent-backup-YYYYMMDD-HHMMSS.db` in the backup directory
    pub async fn create(&self) -> AppResult<BackupInfo> {
        tokio::fs::create_dir_all(&self.directory).await?;

        let file_name = format!("invent-backup-{}.db", Local::now().format("%Y%m%d-%H%M%S"));
        let path = self.directory.join(&file_name);
        if tokio::fs::try_exists(&path).await? {
            return Err(AppError::Conflict(format!("Backup {} already exists", file_name)));
        }

        self.repository.backup_into(&path).await.map_err(|e| {
            tracing::error!("Backup to {} failed: {}", path.display(), e);
            e
        })?;

        let size_bytes = tokio::fs::metadata(&path).await?.len();
        tracing::info!("Database backed up to {} ({} bytes)", path.display(), size_bytes);

        Ok(BackupInfo {
            file_name,
            path: path.display().to_string(),
            size_bytes,
            created_at: Utc::now(),
        })
    }
}
