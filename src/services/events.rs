//! Equipment event log service
//!
//! Attribution and state change events also move the owning equipment's
//! assignment or state, in the same transaction as the event write.
//! Deleting an event leaves the equipment as it is.

use std::sync::Arc;

use sqlx::SqliteConnection;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::EventCategory,
        event::{Event, EventDraft, EventInput},
    },
    repository::Repository,
    services::files::{discard, FileStore, Upload},
};

#[derive(Clone)]
pub struct EventsService {
    repository: Repository,
    files: Arc<dyn FileStore>,
    max_file_size: usize,
}

impl EventsService {
    pub fn new(repository: Repository, files: Arc<dyn FileStore>, max_file_size: usize) -> Self {
        Self {
            repository,
            files,
            max_file_size,
        }
    }

    /// Events of one equipment, most recent first
    pub async fn list(&self, equipment_id: i64) -> AppResult<Vec<Event>> {
        self.repository.equipment.get_by_id(equipment_id).await?;
        self.repository.events.list(equipment_id).await
    }

    pub async fn get(&self, equipment_id: i64, event_id: i64) -> AppResult<Event> {
        self.repository.events.get(equipment_id, event_id).await
    }

    async fn check(&self, input: EventInput, document: Option<&Upload>) -> AppResult<EventDraft> {
        let mut errors = Vec::new();
        let draft = match input.into_draft() {
            Ok(draft) => Some(draft),
            Err(messages) => {
                errors.extend(messages);
                None
            }
        };

        if let Some(employee_id) = draft.as_ref().and_then(|d| d.target_employee_id) {
            if !self.repository.employees.exists(employee_id).await? {
                errors.push("Selected employee does not exist.".to_string());
            }
        }

        if let Some(upload) = document {
            upload.check("Document", self.max_file_size, &mut errors);
        }

        match draft {
            Some(draft) if errors.is_empty() => Ok(draft),
            _ => Err(AppError::Validation(errors)),
        }
    }

    /// Carry the event's effect over to the equipment
    async fn apply(&self, conn: &mut SqliteConnection, equipment_id: i64, draft: &EventDraft) -> AppResult<()> {
        match draft.category {
            EventCategory::Attribution => {
                self.repository
                    .equipment
                    .assign_employee(conn, equipment_id, draft.target_employee_id)
                    .await
            }
            EventCategory::StateChange => match draft.target_state {
                Some(state) => self.repository.equipment.set_state(conn, equipment_id, state).await,
                None => Ok(()),
            },
            EventCategory::Observation => Ok(()),
        }
    }

    async fn store_upload(&self, upload: Option<&Upload>) -> AppResult<Option<String>> {
        match upload {
            Some(upload) => Ok(Some(self.files.save(&upload.file_name, &upload.bytes).await?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, equipment_id: i64, input: EventInput, document: Option<Upload>) -> AppResult<Event> {
        self.repository.equipment.get_by_id(equipment_id).await?;
        let draft = self.check(input, document.as_ref()).await?;
        let document_ref = self.store_upload(document.as_ref()).await?;

        let written = async {
            let mut tx = self.repository.pool.begin().await?;
            let id = self
                .repository
                .events
                .create(&mut tx, equipment_id, &draft, document_ref.as_deref())
                .await?;
            self.apply(&mut tx, equipment_id, &draft).await?;
            tx.commit().await?;
            Ok::<_, AppError>(id)
        }
        .await;

        let id = match written {
            Ok(id) => id,
            Err(e) => {
                discard(self.files.as_ref(), document_ref).await;
                return Err(e);
            }
        };

        tracing::info!("Recorded {} event {} on equipment {}", draft.category, id, equipment_id);
        self.repository.events.get(equipment_id, id).await
    }

    pub async fn update(
        &self,
        equipment_id: i64,
        event_id: i64,
        input: EventInput,
        document: Option<Upload>,
    ) -> AppResult<Event> {
        let current = self.repository.events.get(equipment_id, event_id).await?;
        let draft = self.check(input, document.as_ref()).await?;
        let new_ref = self.store_upload(document.as_ref()).await?;

        let document_file = match &new_ref {
            Some(file_ref) => Some(file_ref.clone()),
            None if draft.remove_document => None,
            None => current.document.clone(),
        };

        let written = async {
            let mut tx = self.repository.pool.begin().await?;
            self.repository
                .events
                .update(&mut tx, event_id, &draft, document_file.as_deref())
                .await?;
            self.apply(&mut tx, equipment_id, &draft).await?;
            tx.commit().await?;
            Ok::<_, AppError>(())
        }
        .await;

        if let Err(e) = written {
            discard(self.files.as_ref(), new_ref).await;
            return Err(e);
        }

        if current.document != document_file {
            discard(self.files.as_ref(), current.document).await;
        }

        self.repository.events.get(equipment_id, event_id).await
    }

    /// Remove an event and its document; the equipment keeps its current fields
    pub async fn delete(&self, equipment_id: i64, event_id: i64) -> AppResult<()> {
        let current = self.repository.events.get(equipment_id, event_id).await?;
        self.repository.events.delete(event_id).await?;
        tracing::info!("Deleted event {} of equipment {}", event_id, equipment_id);

        discard(self.files.as_ref(), current.document).await;
        Ok(())
    }

    /// Stored document reference and bytes
    pub async fn document(&self, equipment_id: i64, event_id: i64) -> AppResult<(String, Vec<u8>)> {
        let event = self.repository.events.get(equipment_id, event_id).await?;
        let file_ref = event
            .document
            .ok_or_else(|| AppError::NotFound(format!("Event {} has no document", event_id)))?;
        let bytes = self.files.open(&file_ref).await?;
        Ok((file_ref, bytes))
    }
}
