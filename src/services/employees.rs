//! Employee directory service

use indexmap::IndexMap;

use crate::{
    error::{AppError, AppResult},
    models::{
        employee::{Employee, EmployeeInput, EmployeeProfile, StateCount, TerritoryGroup},
        enums::{EquipmentState, Territory},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct EmployeesService {
    repository: Repository,
}

impl EmployeesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All employees, by territory then name
    pub async fn list(&self) -> AppResult<Vec<Employee>> {
        self.repository.employees.list().await
    }

    /// Employees grouped by territory; every territory is present
    pub async fn directory(&self) -> AppResult<Vec<TerritoryGroup>> {
        let mut groups: IndexMap<Territory, Vec<Employee>> =
            Territory::ALL.iter().map(|t| (*t, Vec::new())).collect();

        for employee in self.repository.employees.list().await? {
            groups.entry(employee.territory).or_default().push(employee);
        }

        Ok(groups
            .into_iter()
            .map(|(territory, mut employees)| {
                employees.sort_by_cached_key(|e| (e.display_name.to_lowercase(), e.id));
                TerritoryGroup {
                    territory,
                    label: territory.label().to_string(),
                    employees,
                }
            })
            .collect())
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Employee> {
        self.repository.employees.get_by_id(id).await
    }

    /// Employee with assigned equipment and per-state counts
    pub async fn profile(&self, id: i64) -> AppResult<EmployeeProfile> {
        let employee = self.repository.employees.get_by_id(id).await?;
        let equipment = self.repository.equipment.list_by_employee(id).await?;

        let state_counts = EquipmentState::ALL
            .iter()
            .map(|state| StateCount {
                state: *state,
                count: equipment.iter().filter(|e| e.state == *state).count() as i64,
            })
            .collect();

        Ok(EmployeeProfile {
            employee,
            equipment,
            state_counts,
        })
    }

    pub async fn create(&self, input: EmployeeInput) -> AppResult<Employee> {
        let draft = input.into_draft().map_err(AppError::Validation)?;
        let id = self.repository.employees.create(&draft).await?;
        tracing::info!("Created employee {} ({} {})", id, draft.first_name, draft.last_name);
        self.repository.employees.get_by_id(id).await
    }

    /// Update an employee; assigned equipment picks up the new display name
    pub async fn update(&self, id: i64, input: EmployeeInput) -> AppResult<Employee> {
        let draft = input.into_draft().map_err(AppError::Validation)?;

        let mut tx = self.repository.pool.begin().await?;
        self.repository.employees.update(&mut tx, id, &draft).await?;
        self.repository.equipment.refresh_employee_labels(&mut tx, id).await?;
        tx.commit().await?;

        self.repository.employees.get_by_id(id).await
    }

    /// Unassign the employee's equipment, then delete the employee
    pub async fn retire(&self, id: i64) -> AppResult<()> {
        let mut tx = self.repository.pool.begin().await?;
        let detached = self.repository.equipment.detach_employee(&mut tx, id).await?;
        self.repository.employees.delete(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!("Deleted employee {} ({} equipment unassigned)", id, detached);
        Ok(())
    }
}
