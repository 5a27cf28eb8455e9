//! Equipment events repository

use chrono::Utc;
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::{
    error::{AppError, AppResult},
    models::event::{Event, EventDraft},
};

const SELECT_EVENTS: &str = r#"
    SELECT ev.id, ev.equipment_id, ev.category, ev.description, ev.event_date,
           ev.document, ev.target_employee_id, ev.target_state,
           emp.first_name AS target_employee_first_name,
           emp.last_name AS target_employee_last_name,
           emp.role AS target_employee_role,
           emp.territory AS target_employee_territory,
           ev.created_at, ev.updated_at
    FROM equipment_events ev
    LEFT JOIN employees emp ON emp.id = ev.target_employee_id
"#;

#[derive(Clone)]
pub struct EventsRepository {
    pool: Pool<Sqlite>,
}

impl EventsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Events of one equipment, most recent first
    pub async fn list(&self, equipment_id: i64) -> AppResult<Vec<Event>> {
        let query = format!(
            "{} WHERE ev.equipment_id = ? ORDER BY ev.event_date DESC, ev.created_at DESC, ev.id DESC",
            SELECT_EVENTS
        );
        let rows = sqlx::query_as::<_, Event>(&query)
            .bind(equipment_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get an event that belongs to the given equipment
    pub async fn get(&self, equipment_id: i64, event_id: i64) -> AppResult<Event> {
        let query = format!("{} WHERE ev.id = ? AND ev.equipment_id = ?", SELECT_EVENTS);
        sqlx::query_as::<_, Event>(&query)
            .bind(event_id)
            .bind(equipment_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Event {} not found for equipment {}",
                    event_id, equipment_id
                ))
            })
    }

    /// Insert an event
    pub async fn create(
        &self,
        conn: &mut SqliteConnection,
        equipment_id: i64,
        data: &EventDraft,
        document: Option<&str>,
    ) -> AppResult<i64> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO equipment_events (
                equipment_id, category, description, event_date, document,
                target_employee_id, target_state, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(equipment_id)
        .bind(data.category)
        .bind(&data.description)
        .bind(data.event_date)
        .bind(document)
        .bind(data.target_employee_id)
        .bind(data.target_state)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Overwrite an event's fields
    pub async fn update(
        &self,
        conn: &mut SqliteConnection,
        event_id: i64,
        data: &EventDraft,
        document: Option<&str>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE equipment_events
            SET category = ?, description = ?, event_date = ?, document = ?,
                target_employee_id = ?, target_state = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(data.category)
        .bind(&data.description)
        .bind(data.event_date)
        .bind(document)
        .bind(data.target_employee_id)
        .bind(data.target_state)
        .bind(Utc::now())
        .bind(event_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Event {} not found", event_id)));
        }
        Ok(())
    }

    pub async fn delete(&self, event_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment_events WHERE id = ?")
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Event {} not found", event_id)));
        }
        Ok(())
    }

    /// Stored document references of one equipment's events
    pub async fn documents(&self, equipment_id: i64) -> AppResult<Vec<String>> {
        let rows: Vec<String> = sqlx::query_scalar(
            "SELECT document FROM equipment_events WHERE equipment_id = ? AND document IS NOT NULL",
        )
        .bind(equipment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
