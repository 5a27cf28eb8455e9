//! Shared fixtures for unit tests: an in-memory store and seeded records

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;

use crate::{
    config::{AppConfig, DatabaseConfig},
    error::{AppError, AppResult},
    models::{
        employee::{Employee, EmployeeInput},
        equipment::{Equipment, EquipmentInput},
        equipment_type::{EquipmentType, EquipmentTypeInput},
        fields::FieldValue,
    },
    repository::Repository,
    services::{files::FileStore, Services},
};

/// Attachments kept in memory
#[derive(Default)]
pub struct MemoryFileStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    saved: AtomicUsize,
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn save(&self, suggested_name: &str, bytes: &[u8]) -> AppResult<String> {
        let serial = self.saved.fetch_add(1, Ordering::SeqCst) + 1;
        let file_ref = format!("{}-{}", serial, suggested_name);
        self.files.lock().unwrap().insert(file_ref.clone(), bytes.to_vec());
        Ok(file_ref)
    }

    async fn open(&self, file_ref: &str) -> AppResult<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(file_ref)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", file_ref)))
    }

    async fn delete(&self, file_ref: &str) -> AppResult<()> {
        self.files.lock().unwrap().remove(file_ref);
        Ok(())
    }
}

pub async fn repository() -> Repository {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        ..Default::default()
    };
    Repository::connect(&config).await.unwrap()
}

/// Services over a fresh in-memory database and file store
pub async fn services() -> Services {
    services_with_files(Arc::new(MemoryFileStore::default())).await
}

pub async fn services_with_files(files: Arc<dyn FileStore>) -> Services {
    Services::new(repository().await, &AppConfig::default(), files)
}

pub async fn create_type(services: &Services, name: &str) -> EquipmentType {
    let input = EquipmentTypeInput {
        name: Some(name.to_string()),
        description: None,
    };
    services.types.create(input).await.unwrap()
}

/// Employee with a `first.last@example.com` address
pub async fn create_employee(services: &Services, first: &str, last: &str, territory: &str) -> Employee {
    let input = EmployeeInput {
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        email: Some(format!("{}.{}@example.com", first, last).to_lowercase()),
        territory: Some(territory.to_string()),
        ..Default::default()
    };
    services.employees.create(input).await.unwrap()
}

/// Minimal valid equipment request, state `Available`
pub fn equipment_input(type_id: i64, brand: &str, model: &str, employee_id: Option<i64>) -> EquipmentInput {
    EquipmentInput {
        type_id: Some(FieldValue::from(type_id)),
        brand: Some(brand.to_string()),
        model: Some(model.to_string()),
        state: Some("Available".to_string()),
        employee_id: employee_id.map(FieldValue::from),
        ..Default::default()
    }
}

pub async fn create_equipment(
    services: &Services,
    type_id: i64,
    brand: &str,
    model: &str,
    employee_id: Option<i64>,
) -> Equipment {
    let input = equipment_input(type_id, brand, model, employee_id);
    services.equipment.create(input, None).await.unwrap()
}
