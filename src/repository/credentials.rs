//! Equipment credentials repository

use chrono::Utc;
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::{
    error::AppResult,
    models::credential::{Credential, CredentialDraft},
};

#[derive(Clone)]
pub struct CredentialsRepository {
    pool: Pool<Sqlite>,
}

impl CredentialsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Credentials of one equipment, ordered by name
    pub async fn list(&self, equipment_id: i64) -> AppResult<Vec<Credential>> {
        let rows = sqlx::query_as::<_, Credential>(
            r#"
            SELECT id, equipment_id, name, secret, created_at, updated_at
            FROM equipment_credentials
            WHERE equipment_id = ?
            ORDER BY name COLLATE NOCASE ASC, id ASC
            "#,
        )
        .bind(equipment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Delete the current set and insert the given one
    pub async fn replace_all(
        &self,
        conn: &mut SqliteConnection,
        equipment_id: i64,
        entries: &[CredentialDraft],
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM equipment_credentials WHERE equipment_id = ?")
            .bind(equipment_id)
            .execute(&mut *conn)
            .await?;

        let now = Utc::now();
        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO equipment_credentials (equipment_id, name, secret, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(equipment_id)
            .bind(&entry.name)
            .bind(&entry.secret)
            .bind(now)
            .bind(now)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }
}
