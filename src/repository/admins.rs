//! Admin accounts repository

use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::admin::Admin,
};

#[derive(Clone)]
pub struct AdminsRepository {
    pool: Pool<Sqlite>,
}

impl AdminsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<Admin>> {
        let row = sqlx::query_as::<_, Admin>(
            "SELECT id, username, password_hash FROM admins WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Admin> {
        sqlx::query_as::<_, Admin>("SELECT id, username, password_hash FROM admins WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Admin {} not found", id)))
    }

    pub async fn create(&self, username: &str, password_hash: &str) -> AppResult<i64> {
        let result = sqlx::query("INSERT INTO admins (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::conflict_on_unique(e, "Admin account already exists."))?;
        Ok(result.last_insert_rowid())
    }
}
