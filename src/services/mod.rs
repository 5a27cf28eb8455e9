//! Business logic services

pub mod auth;
pub mod backup;
pub mod employees;
pub mod equipment;
pub mod equipment_types;
pub mod events;
pub mod export;
pub mod files;
pub mod stats;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

use files::FileStore;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub backup: backup::BackupService,
    pub types: equipment_types::EquipmentTypesService,
    pub employees: employees::EmployeesService,
    pub equipment: equipment::EquipmentService,
    pub events: events::EventsService,
    pub stats: stats::StatsService,
    pub export: export::ExportService,
    pub files: Arc<dyn FileStore>,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository and file store
    pub fn new(repository: Repository, config: &AppConfig, files: Arc<dyn FileStore>) -> Self {
        let max_file_size = config.uploads.max_file_size;
        let stats = stats::StatsService::new(repository.clone());

        Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone()),
            backup: backup::BackupService::new(repository.clone(), config.backup.clone()),
            types: equipment_types::EquipmentTypesService::new(repository.clone()),
            employees: employees::EmployeesService::new(repository.clone()),
            equipment: equipment::EquipmentService::new(repository.clone(), files.clone(), max_file_size),
            events: events::EventsService::new(repository.clone(), files.clone(), max_file_size),
            export: export::ExportService::new(repository.clone(), stats.clone()),
            stats,
            files,
            repository,
        }
    }

    /// Check that the store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
