//! Statistics service

use sqlx::{sqlite::SqliteRow, Row};

use crate::{
    api::stats::{StatEntry, StatsResponse},
    error::AppResult,
    models::enums::{EquipmentState, Territory},
    repository::Repository,
};

/// Territory key for equipment without an assignee
pub const UNASSIGNED: &str = "unassigned";

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Compute every counter and breakdown in one pass over the store
    pub async fn get_stats(&self) -> AppResult<StatsResponse> {
        let pool = &self.repository.pool;

        let totals = sqlx::query(
            r#"
            SELECT COUNT(*) AS total_count,
                   TOTAL(price) AS total_value,
                   COUNT(CASE WHEN state = ? THEN 1 END) AS broken_count,
                   COUNT(CASE WHEN state = ? THEN 1 END) AS available_count,
                   COUNT(CASE WHEN state = ? THEN 1 END) AS in_service_count,
                   COUNT(CASE WHEN state = ? THEN 1 END) AS unavailable_count
            FROM equipment
            "#,
        )
        .bind(EquipmentState::Broken)
        .bind(EquipmentState::Available)
        .bind(EquipmentState::InService)
        .bind(EquipmentState::Unavailable)
        .fetch_one(pool)
        .await?;

        let employee_count = self.repository.employees.count().await?;
        let type_count = self.repository.types.count().await?;

        let by_state = self.by_state().await?;
        let by_territory = self.by_territory().await?;

        let by_type = self
            .grouped(
                r#"
                SELECT COALESCE(t.name, e.type_label) AS label,
                       COUNT(*) AS count, TOTAL(e.price) AS value
                FROM equipment e
                LEFT JOIN equipment_types t ON t.id = e.type_id
                WHERE TRIM(COALESCE(t.name, e.type_label)) <> ''
                GROUP BY label
                ORDER BY label COLLATE NOCASE
                "#,
            )
            .await?;

        let by_brand = self
            .grouped(
                r#"
                SELECT brand AS label, COUNT(*) AS count, TOTAL(price) AS value
                FROM equipment
                WHERE TRIM(brand) <> ''
                GROUP BY brand
                ORDER BY brand COLLATE NOCASE
                "#,
            )
            .await?;

        let by_vendor = self
            .grouped(
                r#"
                SELECT TRIM(purchase_place) AS label, COUNT(*) AS count, TOTAL(price) AS value
                FROM equipment
                WHERE TRIM(COALESCE(purchase_place, '')) <> ''
                GROUP BY label
                ORDER BY label COLLATE NOCASE
                "#,
            )
            .await?;

        Ok(StatsResponse {
            total_count: totals.get("total_count"),
            total_value: totals.get("total_value"),
            broken_count: totals.get("broken_count"),
            available_count: totals.get("available_count"),
            in_service_count: totals.get("in_service_count"),
            unavailable_count: totals.get("unavailable_count"),
            employee_count,
            type_count,
            by_state,
            by_territory,
            top_types_by_value: rank_by_value(&by_type),
            top_brands_by_value: rank_by_value(&by_brand),
            by_type,
            by_brand,
            by_vendor,
        })
    }

    async fn grouped(&self, query: &str) -> AppResult<Vec<StatEntry>> {
        let rows = sqlx::query(query).fetch_all(&self.repository.pool).await?;
        Ok(rows.iter().map(stat_entry).collect())
    }

    /// One entry per state, zero-filled
    async fn by_state(&self) -> AppResult<Vec<StatEntry>> {
        let rows = sqlx::query(
            "SELECT state, COUNT(*) AS count, TOTAL(price) AS value FROM equipment GROUP BY state",
        )
        .fetch_all(&self.repository.pool)
        .await?;

        let counted: Vec<(EquipmentState, i64, f64)> = rows
            .iter()
            .map(|row| (row.get("state"), row.get("count"), row.get("value")))
            .collect();

        Ok(EquipmentState::ALL
            .iter()
            .map(|state| {
                let (count, value) = counted
                    .iter()
                    .find(|(s, _, _)| s == state)
                    .map(|(_, count, value)| (*count, *value))
                    .unwrap_or((0, 0.0));
                StatEntry {
                    label: state.as_str().to_string(),
                    count,
                    value,
                }
            })
            .collect())
    }

    /// Every known territory plus the unassigned bucket, ordered by key
    async fn by_territory(&self) -> AppResult<Vec<StatEntry>> {
        let query = format!(
            r#"
            SELECT COALESCE(NULLIF(LOWER(TRIM(emp.territory)), ''), '{}') AS label,
                   COUNT(*) AS count, TOTAL(e.price) AS value
            FROM equipment e
            LEFT JOIN employees emp ON emp.id = e.employee_id
            GROUP BY label
            "#,
            UNASSIGNED
        );
        let mut entries = self.grouped(&query).await?;

        for territory in Territory::ALL {
            if !entries.iter().any(|entry| entry.label == territory.as_db()) {
                entries.push(zero(territory.as_db()));
            }
        }
        if !entries.iter().any(|entry| entry.label == UNASSIGNED) {
            entries.push(zero(UNASSIGNED));
        }

        entries.sort_by_cached_key(|entry| entry.label.to_lowercase());
        Ok(entries)
    }
}

fn stat_entry(row: &SqliteRow) -> StatEntry {
    StatEntry {
        label: row.get("label"),
        count: row.get("count"),
        value: row.get("value"),
    }
}

fn zero(label: &str) -> StatEntry {
    StatEntry {
        label: label.to_string(),
        count: 0,
        value: 0.0,
    }
}

/// Highest value first, key as tie-break
fn rank_by_value(entries: &[StatEntry]) -> Vec<StatEntry> {
    let mut ranked = entries.to_vec();
    ranked.sort_by(|a, b| {
        b.value
            .total_cmp(&a.value)
            .then_with(|| a.label.to_lowercase().cmp(&b.label.to_lowercase()))
    });
    ranked
}
