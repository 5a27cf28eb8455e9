//! Employees repository

use chrono::Utc;
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::{
    error::{AppError, AppResult},
    models::employee::{Employee, EmployeeDraft},
};

/// SQL for an employee's display name over the `employees` columns
pub const DISPLAY_NAME_SQL: &str = "TRIM(first_name || ' ' || last_name)";

const SELECT_EMPLOYEES: &str = r#"
    SELECT emp.id, emp.first_name, emp.last_name,
           TRIM(emp.first_name || ' ' || emp.last_name) AS display_name,
           emp.email, emp.phone, emp.role, emp.territory, emp.comment,
           (SELECT COUNT(*) FROM equipment e WHERE e.employee_id = emp.id) AS equipment_count,
           emp.created_at, emp.updated_at
    FROM employees emp
"#;

const DUPLICATE_EMAIL: &str = "An employee with this email address already exists.";

#[derive(Clone)]
pub struct EmployeesRepository {
    pool: Pool<Sqlite>,
}

impl EmployeesRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// List employees ordered by territory, then last and first name
    pub async fn list(&self) -> AppResult<Vec<Employee>> {
        let query = format!(
            "{} ORDER BY emp.territory ASC, emp.last_name COLLATE NOCASE ASC, emp.first_name COLLATE NOCASE ASC, emp.id ASC",
            SELECT_EMPLOYEES
        );
        let rows = sqlx::query_as::<_, Employee>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get employee by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Employee> {
        let query = format!("{} WHERE emp.id = ?", SELECT_EMPLOYEES);
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", id)))
    }

    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM employees WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// Create an employee
    pub async fn create(&self, data: &EmployeeDraft) -> AppResult<i64> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO employees (
                first_name, last_name, email, phone, role, territory, comment,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.role)
        .bind(data.territory)
        .bind(&data.comment)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, DUPLICATE_EMAIL))?;
        Ok(result.last_insert_rowid())
    }

    /// Update an employee's fields
    pub async fn update(&self, conn: &mut SqliteConnection, id: i64, data: &EmployeeDraft) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE employees
            SET first_name = ?, last_name = ?, email = ?, phone = ?, role = ?,
                territory = ?, comment = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.role)
        .bind(data.territory)
        .bind(&data.comment)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, DUPLICATE_EMAIL))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Employee {} not found", id)));
        }
        Ok(())
    }

    /// Delete an employee; callers detach equipment first
    pub async fn delete(&self, conn: &mut SqliteConnection, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Employee {} not found", id)));
        }
        Ok(())
    }

    /// Number of employees (for stats)
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
