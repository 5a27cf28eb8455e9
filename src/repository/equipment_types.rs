//! Equipment types repository

use chrono::Utc;
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::{
    error::{AppError, AppResult},
    models::equipment_type::{EquipmentType, EquipmentTypeDraft},
};

const SELECT_TYPES: &str = r#"
    SELECT t.id, t.name, t.description,
           (SELECT COUNT(*) FROM equipment e WHERE e.type_id = t.id) AS equipment_count,
           t.created_at, t.updated_at
    FROM equipment_types t
"#;

const DUPLICATE_NAME: &str = "An equipment type with this name already exists.";

#[derive(Clone)]
pub struct EquipmentTypesRepository {
    pool: Pool<Sqlite>,
}

impl EquipmentTypesRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// List all types, ordered by name
    pub async fn list(&self) -> AppResult<Vec<EquipmentType>> {
        let query = format!("{} ORDER BY t.name COLLATE NOCASE ASC, t.id ASC", SELECT_TYPES);
        let rows = sqlx::query_as::<_, EquipmentType>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get type by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<EquipmentType> {
        let query = format!("{} WHERE t.id = ?", SELECT_TYPES);
        sqlx::query_as::<_, EquipmentType>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment type {} not found", id)))
    }

    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM equipment_types WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// Create a type
    pub async fn create(&self, data: &EquipmentTypeDraft) -> AppResult<i64> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO equipment_types (name, description, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, DUPLICATE_NAME))?;
        Ok(result.last_insert_rowid())
    }

    /// Update a type's fields
    pub async fn update(&self, conn: &mut SqliteConnection, id: i64, data: &EquipmentTypeDraft) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE equipment_types SET name = ?, description = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, DUPLICATE_NAME))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment type {} not found", id)));
        }
        Ok(())
    }

    /// Delete a type; callers detach equipment first
    pub async fn delete(&self, conn: &mut SqliteConnection, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment_types WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment type {} not found", id)));
        }
        Ok(())
    }

    /// Number of types (for stats)
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM equipment_types")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
