//! Equipment repository
//!
//! `type_label`, `employee_id` and `employee_label` are only ever written by
//! the link routines at the bottom of this file.

use chrono::Utc;
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::EquipmentState,
        equipment::{EmployeeOption, Equipment, EquipmentDraft, EquipmentFilter},
    },
};

use super::employees::DISPLAY_NAME_SQL;

const SELECT_EQUIPMENT: &str = r#"
    SELECT e.id, e.type_id, COALESCE(t.name, e.type_label) AS type_label,
           e.brand, e.model, e.serial_number, e.state,
           e.purchase_date, e.purchase_place, e.price, e.warranty_years,
           e.employee_id, e.employee_label,
           emp.first_name AS employee_first_name,
           emp.last_name AS employee_last_name,
           emp.email AS employee_email,
           emp.phone AS employee_phone,
           emp.role AS employee_role,
           emp.territory AS employee_territory,
           e.comment, e.invoice_file, e.created_at, e.updated_at
    FROM equipment e
    LEFT JOIN equipment_types t ON t.id = e.type_id
    LEFT JOIN employees emp ON emp.id = e.employee_id
"#;

/// Undated equipment last, then most recent purchase, then most recent record
const ORDER_EQUIPMENT: &str = r#"
    ORDER BY CASE WHEN e.purchase_date IS NULL THEN 1 ELSE 0 END,
             e.purchase_date DESC, e.created_at DESC, e.id DESC
"#;

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Sqlite>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// List equipment matching the filter
    pub async fn list(&self, filter: &EquipmentFilter) -> AppResult<Vec<Equipment>> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_EQUIPMENT);
        qb.push(" WHERE 1 = 1");
        filter.push_predicates(&mut qb);
        qb.push(ORDER_EQUIPMENT);

        let rows = qb
            .build_query_as::<Equipment>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get equipment by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Equipment> {
        let query = format!("{} WHERE e.id = ?", SELECT_EQUIPMENT);
        sqlx::query_as::<_, Equipment>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Insert a new record and link it to its type and assignee
    pub async fn create(
        &self,
        conn: &mut SqliteConnection,
        data: &EquipmentDraft,
        invoice_file: Option<&str>,
    ) -> AppResult<i64> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO equipment (
                type_label, brand, model, serial_number, state, purchase_date,
                purchase_place, price, warranty_years, comment, invoice_file,
                created_at, updated_at
            ) VALUES ('', ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&data.brand)
        .bind(&data.model)
        .bind(&data.serial_number)
        .bind(data.state)
        .bind(data.purchase_date)
        .bind(&data.purchase_place)
        .bind(data.price)
        .bind(data.warranty_years)
        .bind(&data.comment)
        .bind(invoice_file)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        let id = result.last_insert_rowid();
        self.link_type(conn, id, data.type_id).await?;
        self.assign_employee(conn, id, data.employee_id).await?;
        Ok(id)
    }

    /// Overwrite a record's fields and links
    pub async fn update(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        data: &EquipmentDraft,
        invoice_file: Option<&str>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE equipment
            SET brand = ?, model = ?, serial_number = ?, state = ?, purchase_date = ?,
                purchase_place = ?, price = ?, warranty_years = ?, comment = ?,
                invoice_file = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&data.brand)
        .bind(&data.model)
        .bind(&data.serial_number)
        .bind(data.state)
        .bind(data.purchase_date)
        .bind(&data.purchase_place)
        .bind(data.price)
        .bind(data.warranty_years)
        .bind(&data.comment)
        .bind(invoice_file)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }

        self.link_type(conn, id, data.type_id).await?;
        self.assign_employee(conn, id, data.employee_id).await?;
        Ok(())
    }

    pub async fn set_state(&self, conn: &mut SqliteConnection, id: i64, state: EquipmentState) -> AppResult<()> {
        let result = sqlx::query("UPDATE equipment SET state = ?, updated_at = ? WHERE id = ?")
            .bind(state)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }

    /// Delete a record; credentials and events go with it
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }

    /// Equipment assigned to one employee, in list order
    pub async fn list_by_employee(&self, employee_id: i64) -> AppResult<Vec<Equipment>> {
        self.list(&EquipmentFilter {
            employee_id: Some(employee_id),
            ..Default::default()
        })
        .await
    }

    /// Resolved type labels in use
    pub async fn distinct_type_labels(&self) -> AppResult<Vec<String>> {
        let rows: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT COALESCE(t.name, e.type_label) AS label
            FROM equipment e
            LEFT JOIN equipment_types t ON t.id = e.type_id
            WHERE TRIM(COALESCE(t.name, e.type_label, '')) <> ''
            ORDER BY label COLLATE NOCASE ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn distinct_brands(&self) -> AppResult<Vec<String>> {
        let rows: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT brand FROM equipment
            WHERE TRIM(COALESCE(brand, '')) <> ''
            ORDER BY brand COLLATE NOCASE ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Purchase years, most recent first
    pub async fn distinct_purchase_years(&self) -> AppResult<Vec<i32>> {
        let rows: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT CAST(strftime('%Y', purchase_date) AS INTEGER) AS year
            FROM equipment
            WHERE strftime('%Y', purchase_date) IS NOT NULL
            ORDER BY year DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().filter_map(|y| i32::try_from(y).ok()).collect())
    }

    /// Employees currently holding equipment
    pub async fn holders(&self) -> AppResult<Vec<EmployeeOption>> {
        let rows = sqlx::query_as::<_, EmployeeOption>(
            r#"
            SELECT DISTINCT emp.id AS id,
                   COALESCE(NULLIF(TRIM(emp.first_name || ' ' || emp.last_name), ''),
                            'Employee #' || emp.id) AS label
            FROM employees emp
            JOIN equipment e ON e.employee_id = emp.id
            ORDER BY label COLLATE NOCASE ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Links and their cached labels

    /// Point a record at a type and cache the type's name
    async fn link_type(&self, conn: &mut SqliteConnection, id: i64, type_id: i64) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE equipment
            SET type_id = ?,
                type_label = COALESCE((SELECT name FROM equipment_types WHERE id = ?), type_label)
            WHERE id = ?
            "#,
        )
        .bind(type_id)
        .bind(type_id)
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Assign a record to an employee (or nobody) and cache the display name
    pub async fn assign_employee(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        employee_id: Option<i64>,
    ) -> AppResult<()> {
        let query = format!(
            r#"
            UPDATE equipment
            SET employee_id = ?,
                employee_label = (SELECT {} FROM employees WHERE id = ?),
                updated_at = ?
            WHERE id = ?
            "#,
            DISPLAY_NAME_SQL
        );
        let result = sqlx::query(&query)
            .bind(employee_id)
            .bind(employee_id)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }

    /// Re-cache the display name on everything assigned to an employee
    pub async fn refresh_employee_labels(&self, conn: &mut SqliteConnection, employee_id: i64) -> AppResult<u64> {
        let query = format!(
            r#"
            UPDATE equipment
            SET employee_label = (SELECT {} FROM employees WHERE employees.id = equipment.employee_id)
            WHERE employee_id = ?
            "#,
            DISPLAY_NAME_SQL
        );
        let result = sqlx::query(&query)
            .bind(employee_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Re-cache the type name on everything linked to a type
    pub async fn refresh_type_labels(&self, conn: &mut SqliteConnection, type_id: i64) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE equipment
            SET type_label = (SELECT name FROM equipment_types WHERE id = equipment.type_id)
            WHERE type_id = ?
            "#,
        )
        .bind(type_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Unassign everything held by an employee
    pub async fn detach_employee(&self, conn: &mut SqliteConnection, employee_id: i64) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE equipment
            SET employee_id = NULL, employee_label = NULL, updated_at = ?
            WHERE employee_id = ?
            "#,
        )
        .bind(Utc::now())
        .bind(employee_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Unlink everything from a type; the cached label stays as the legacy label
    pub async fn detach_type(&self, conn: &mut SqliteConnection, type_id: i64) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE equipment SET type_id = NULL, updated_at = ? WHERE type_id = ?",
        )
        .bind(Utc::now())
        .bind(type_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }
}
