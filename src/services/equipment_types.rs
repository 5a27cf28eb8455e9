//! Equipment types service

use crate::{
    error::{AppError, AppResult},
    models::equipment_type::{EquipmentType, EquipmentTypeInput},
    repository::Repository,
};

#[derive(Clone)]
pub struct EquipmentTypesService {
    repository: Repository,
}

impl EquipmentTypesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<EquipmentType>> {
        self.repository.types.list().await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<EquipmentType> {
        self.repository.types.get_by_id(id).await
    }

    pub async fn create(&self, input: EquipmentTypeInput) -> AppResult<EquipmentType> {
        let draft = input.into_draft().map_err(AppError::Validation)?;
        let id = self.repository.types.create(&draft).await?;
        tracing::info!("Created equipment type {} ({})", id, draft.name);
        self.repository.types.get_by_id(id).await
    }

    /// Update a type; linked equipment picks up the new name
    pub async fn update(&self, id: i64, input: EquipmentTypeInput) -> AppResult<EquipmentType> {
        let draft = input.into_draft().map_err(AppError::Validation)?;

        let mut tx = self.repository.pool.begin().await?;
        self.repository.types.update(&mut tx, id, &draft).await?;
        self.repository.equipment.refresh_type_labels(&mut tx, id).await?;
        tx.commit().await?;

        self.repository.types.get_by_id(id).await
    }

    /// Unlink the type from all equipment, then delete it
    pub async fn retire(&self, id: i64) -> AppResult<()> {
        let mut tx = self.repository.pool.begin().await?;
        let detached = self.repository.equipment.detach_type(&mut tx, id).await?;
        self.repository.types.delete(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!("Deleted equipment type {} ({} equipment detached)", id, detached);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn input(name: &str) -> EquipmentTypeInput {
        EquipmentTypeInput {
            name: Some(name.to_string()),
            description: None,
        }
    }

    #[tokio::test]
    async fn list_is_case_insensitive_with_counts() {
        let services = test_support::services().await;
        services.types.create(input("phone")).await.unwrap();
        let laptop = services.types.create(input("Laptop")).await.unwrap();
        test_support::create_equipment(&services, laptop.id, "Dell", "XPS13", None).await;

        let types = services.types.list().await.unwrap();
        let names: Vec<_> = types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Laptop", "phone"]);
        assert_eq!(types[0].equipment_count, 1);
        assert_eq!(types[1].equipment_count, 0);
    }

    #[tokio::test]
    async fn duplicate_name_conflicts() {
        let services = test_support::services().await;
        services.types.create(input("Laptop")).await.unwrap();
        let result = services.types.create(input("Laptop")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn rename_refreshes_equipment_label() {
        let services = test_support::services().await;
        let laptop = services.types.create(input("Laptop")).await.unwrap();
        let equipment = test_support::create_equipment(&services, laptop.id, "Dell", "XPS13", None).await;

        services.types.update(laptop.id, input("Notebook")).await.unwrap();
        services.types.retire(laptop.id).await.unwrap();

        // the cached label keeps the last linked name
        let equipment = services.equipment.get_by_id(equipment.id).await.unwrap();
        assert_eq!(equipment.type_id, None);
        assert_eq!(equipment.type_label, "Notebook");
    }

    #[tokio::test]
    async fn retiring_unknown_type_is_not_found() {
        let services = test_support::services().await;
        let result = services.types.retire(42).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
