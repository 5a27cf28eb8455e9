//! Export read models

use std::collections::HashMap;

use chrono::Utc;

use crate::{
    api::export::{EmployeeExportRow, EquipmentExportRow, StatsExport},
    error::AppResult,
    models::equipment::{Equipment, EquipmentFilter},
    repository::Repository,
    services::stats::StatsService,
};

#[derive(Clone)]
pub struct ExportService {
    repository: Repository,
    stats: StatsService,
}

impl ExportService {
    pub fn new(repository: Repository, stats: StatsService) -> Self {
        Self { repository, stats }
    }

    /// All equipment, oldest purchase first, undated last
    pub async fn equipment(&self) -> AppResult<Vec<EquipmentExportRow>> {
        let mut equipment = self.repository.equipment.list(&EquipmentFilter::default()).await?;
        equipment.sort_by_key(|e| (e.purchase_date.is_none(), e.purchase_date, e.id));
        Ok(equipment.into_iter().map(equipment_row).collect())
    }

    /// All employees with the equipment they hold
    pub async fn employees(&self) -> AppResult<Vec<EmployeeExportRow>> {
        let employees = self.repository.employees.list().await?;
        let equipment = self.repository.equipment.list(&EquipmentFilter::default()).await?;

        let mut held: HashMap<i64, Vec<String>> = HashMap::new();
        for item in &equipment {
            if let Some(employee_id) = item.employee_id {
                held.entry(employee_id).or_default().push(summary_entry(item));
            }
        }

        Ok(employees
            .into_iter()
            .map(|employee| EmployeeExportRow {
                equipment_summary: held
                    .remove(&employee.id)
                    .map(|entries| entries.join(" | "))
                    .unwrap_or_default(),
                id: employee.id,
                first_name: employee.first_name,
                last_name: employee.last_name,
                email: employee.email,
                phone: employee.phone,
                role: employee.role,
                territory: employee.territory,
                comment: employee.comment,
                equipment_count: employee.equipment_count,
            })
            .collect())
    }

    pub async fn stats(&self) -> AppResult<StatsExport> {
        let stats = self.stats.get_stats().await?;
        let average_value = if stats.total_count > 0 {
            stats.total_value / stats.total_count as f64
        } else {
            0.0
        };
        Ok(StatsExport {
            generated_at: Utc::now(),
            average_value,
            stats,
        })
    }
}

fn equipment_row(item: Equipment) -> EquipmentExportRow {
    EquipmentExportRow {
        id: item.id,
        type_label: item.type_label,
        brand: item.brand,
        model: item.model,
        serial_number: item.serial_number,
        state: item.state,
        purchase_date: item.purchase_date,
        purchase_place: item.purchase_place,
        price: item.price,
        warranty_years: item.warranty_years,
        employee: item.employee_label,
        employee_email: item.employee_email,
        employee_phone: item.employee_phone,
        employee_role: item.employee_role,
        employee_territory: item.employee_territory,
        comment: item.comment,
        created_at: item.created_at,
        updated_at: item.updated_at,
    }
}

/// "type - brand model", skipping blank parts
fn summary_entry(item: &Equipment) -> String {
    let name = format!("{} {}", item.brand, item.model).trim().to_string();
    match item.type_label.trim() {
        "" => name,
        label => format!("{} - {}", label, name),
    }
}
