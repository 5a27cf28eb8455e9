//! Equipment service

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{
        credential::{normalize_credentials, Credential, CredentialInput},
        enums::EquipmentState,
        equipment::{Equipment, EquipmentDetail, EquipmentDraft, EquipmentFilter, EquipmentInput, FilterOptions},
    },
    repository::Repository,
    services::files::{discard, FileStore, Upload},
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
    files: Arc<dyn FileStore>,
    max_file_size: usize,
}

impl EquipmentService {
    pub fn new(repository: Repository, files: Arc<dyn FileStore>, max_file_size: usize) -> Self {
        Self {
            repository,
            files,
            max_file_size,
        }
    }

    pub async fn list(&self, filter: &EquipmentFilter) -> AppResult<Vec<Equipment>> {
        self.repository.equipment.list(filter).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Equipment> {
        self.repository.equipment.get_by_id(id).await
    }

    /// Equipment with its credentials and event history
    pub async fn detail(&self, id: i64) -> AppResult<EquipmentDetail> {
        let equipment = self.repository.equipment.get_by_id(id).await?;
        let credentials = self.repository.credentials.list(id).await?;
        let events = self.repository.events.list(id).await?;
        Ok(EquipmentDetail {
            equipment,
            credentials,
            events,
        })
    }

    /// Distinct live values for the list filters
    pub async fn filter_options(&self) -> AppResult<FilterOptions> {
        Ok(FilterOptions {
            states: EquipmentState::ALL.to_vec(),
            types: self.repository.equipment.distinct_type_labels().await?,
            brands: self.repository.equipment.distinct_brands().await?,
            years: self.repository.equipment.distinct_purchase_years().await?,
            employees: self.repository.equipment.holders().await?,
        })
    }

    /// Validate the input, the references it names and the invoice
    async fn check(&self, input: EquipmentInput, invoice: Option<&Upload>) -> AppResult<EquipmentDraft> {
        let mut errors = Vec::new();
        let draft = match input.into_draft() {
            Ok(draft) => Some(draft),
            Err(messages) => {
                errors.extend(messages);
                None
            }
        };

        if let Some(draft) = &draft {
            if !self.repository.types.exists(draft.type_id).await? {
                errors.push("Selected type does not exist.".to_string());
            }
            if let Some(employee_id) = draft.employee_id {
                if !self.repository.employees.exists(employee_id).await? {
                    errors.push("Assigned employee does not exist.".to_string());
                }
            }
        }

        if let Some(upload) = invoice {
            upload.check("Invoice", self.max_file_size, &mut errors);
        }

        match draft {
            Some(draft) if errors.is_empty() => Ok(draft),
            _ => Err(AppError::Validation(errors)),
        }
    }

    async fn store_upload(&self, upload: Option<&Upload>) -> AppResult<Option<String>> {
        match upload {
            Some(upload) => Ok(Some(self.files.save(&upload.file_name, &upload.bytes).await?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, input: EquipmentInput, invoice: Option<Upload>) -> AppResult<Equipment> {
        let draft = self.check(input, invoice.as_ref()).await?;
        let invoice_ref = self.store_upload(invoice.as_ref()).await?;

        let written = async {
            let mut tx = self.repository.pool.begin().await?;
            let id = self
                .repository
                .equipment
                .create(&mut tx, &draft, invoice_ref.as_deref())
                .await?;
            self.repository
                .credentials
                .replace_all(&mut tx, id, &draft.credentials)
                .await?;
            tx.commit().await?;
            Ok::<_, AppError>(id)
        }
        .await;

        let id = match written {
            Ok(id) => id,
            Err(e) => {
                discard(self.files.as_ref(), invoice_ref).await;
                return Err(e);
            }
        };

        tracing::info!("Created equipment {} ({} {})", id, draft.brand, draft.model);
        self.repository.equipment.get_by_id(id).await
    }

    pub async fn update(&self, id: i64, input: EquipmentInput, invoice: Option<Upload>) -> AppResult<Equipment> {
        let current = self.repository.equipment.get_by_id(id).await?;
        let draft = self.check(input, invoice.as_ref()).await?;
        let new_ref = self.store_upload(invoice.as_ref()).await?;

        let invoice_file = match &new_ref {
            Some(file_ref) => Some(file_ref.clone()),
            None if draft.remove_invoice => None,
            None => current.invoice_file.clone(),
        };

        let written = async {
            let mut tx = self.repository.pool.begin().await?;
            self.repository
                .equipment
                .update(&mut tx, id, &draft, invoice_file.as_deref())
                .await?;
            self.repository
                .credentials
                .replace_all(&mut tx, id, &draft.credentials)
                .await?;
            tx.commit().await?;
            Ok::<_, AppError>(())
        }
        .await;

        if let Err(e) = written {
            discard(self.files.as_ref(), new_ref).await;
            return Err(e);
        }

        if current.invoice_file != invoice_file {
            discard(self.files.as_ref(), current.invoice_file).await;
        }

        self.repository.equipment.get_by_id(id).await
    }

    /// Delete the record with its credentials, events and attachments
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let current = self.repository.equipment.get_by_id(id).await?;
        let documents = self.repository.events.documents(id).await?;

        self.repository.equipment.delete(id).await?;
        tracing::info!("Deleted equipment {}", id);

        discard(
            self.files.as_ref(),
            current.invoice_file.into_iter().chain(documents),
        )
        .await;
        Ok(())
    }

    pub async fn credentials(&self, id: i64) -> AppResult<Vec<Credential>> {
        self.repository.equipment.get_by_id(id).await?;
        self.repository.credentials.list(id).await
    }

    /// Replace the whole credential set of one equipment
    pub async fn replace_credentials(&self, id: i64, entries: Vec<CredentialInput>) -> AppResult<Vec<Credential>> {
        self.repository.equipment.get_by_id(id).await?;
        let drafts = normalize_credentials(entries).map_err(AppError::Validation)?;

        let mut tx = self.repository.pool.begin().await?;
        self.repository.credentials.replace_all(&mut tx, id, &drafts).await?;
        tx.commit().await?;

        self.repository.credentials.list(id).await
    }

    /// Stored invoice reference and bytes
    pub async fn invoice(&self, id: i64) -> AppResult<(String, Vec<u8>)> {
        let equipment = self.repository.equipment.get_by_id(id).await?;
        let file_ref = equipment
            .invoice_file
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} has no invoice", id)))?;
        let bytes = self.files.open(&file_ref).await?;
        Ok((file_ref, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{equipment::EquipmentQuery, fields::FieldValue},
        services::files::MockFileStore,
        test_support,
    };
    use axum::body::Bytes;

    fn pdf(len: usize) -> Upload {
        Upload {
            file_name: "invoice.pdf".into(),
            content_type: "application/pdf".into(),
            bytes: Bytes::from(vec![b'x'; len]),
        }
    }

    #[tokio::test]
    async fn unknown_type_and_employee_are_reported_together() {
        let services = test_support::services().await;
        let input = test_support::equipment_input(99, "Dell", "XPS13", Some(77));

        let errors = match services.equipment.create(input, None).await {
            Err(AppError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other.map(|e| e.id)),
        };
        assert_eq!(
            errors,
            vec!["Selected type does not exist.", "Assigned employee does not exist."]
        );
    }

    #[tokio::test]
    async fn search_keeps_accented_capitals() {
        let services = test_support::services().await;
        let screen = test_support::create_type(&services, "Écran").await;
        let mut input = test_support::equipment_input(screen.id, "Dell", "P2422H", None);
        input.comment = Some("Écran cassé".into());
        let broken = services.equipment.create(input, None).await.unwrap();
        test_support::create_equipment(&services, screen.id, "HP", "E24", None).await;

        let found = services
            .equipment
            .list(&EquipmentFilter {
                search: Some("Écran cassé".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.iter().map(|e| e.id).collect::<Vec<_>>(), vec![broken.id]);

        let found = services
            .equipment
            .list(&EquipmentFilter {
                search: Some("Écran".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 2);

        // ASCII letters match regardless of case
        let found = services
            .equipment
            .list(&EquipmentFilter {
                search: Some("p2422".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn unparseable_filter_values_return_nothing() {
        let services = test_support::services().await;
        let laptop = test_support::create_type(&services, "Laptop").await;
        test_support::create_equipment(&services, laptop.id, "Dell", "XPS13", None).await;

        for pair in [("employe", "abc"), ("etat", "Perdu"), ("annee", "20x4")] {
            let query: EquipmentQuery =
                serde_json::from_value(serde_json::json!({ pair.0: pair.1 })).unwrap();
            let found = services.equipment.list(&EquipmentFilter::from(query)).await.unwrap();
            assert!(found.is_empty(), "{:?} matched {} rows", pair, found.len());
        }

        let all = services.equipment.list(&EquipmentFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn negative_price_creates_nothing() {
        let services = test_support::services().await;
        let laptop = test_support::create_type(&services, "Laptop").await;
        let mut input = test_support::equipment_input(laptop.id, "Dell", "XPS13", None);
        input.price = Some(FieldValue::from("-5"));

        assert!(matches!(
            services.equipment.create(input, None).await,
            Err(AppError::Validation(_))
        ));
        let all = services.equipment.list(&EquipmentFilter::default()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn credentials_are_replaced_as_a_set() {
        let services = test_support::services().await;
        let laptop = test_support::create_type(&services, "Laptop").await;
        let mut input = test_support::equipment_input(laptop.id, "Dell", "XPS13", None);
        input.credentials = vec![
            CredentialInput {
                name: Some("wifi".into()),
                secret: Some("pass".into()),
            },
            CredentialInput {
                name: Some(" ".into()),
                secret: None,
            },
        ];
        let equipment = services.equipment.create(input, None).await.unwrap();
        assert_eq!(services.equipment.credentials(equipment.id).await.unwrap().len(), 1);

        let half = vec![CredentialInput {
            name: Some("admin".into()),
            secret: Some("".into()),
        }];
        let result = services.equipment.replace_credentials(equipment.id, half).await;
        match result {
            Err(AppError::Validation(errors)) => {
                assert!(errors[0].to_lowercase().contains("login name and a password"))
            }
            other => panic!("expected validation error, got {:?}", other.map(|c| c.len())),
        }
        // the rejected replace left the old set alone
        assert_eq!(services.equipment.credentials(equipment.id).await.unwrap().len(), 1);

        let remaining = services
            .equipment
            .replace_credentials(equipment.id, Vec::new())
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn oversized_invoice_is_rejected_before_storage() {
        let mut store = MockFileStore::new();
        store.expect_save().never();
        let services = test_support::services_with_files(Arc::new(store)).await;
        let laptop = test_support::create_type(&services, "Laptop").await;

        let input = test_support::equipment_input(laptop.id, "Dell", "XPS13", None);
        let upload = Upload {
            content_type: "text/plain".into(),
            ..pdf(6 * 1024 * 1024)
        };
        match services.equipment.create(input, Some(upload)).await {
            Err(AppError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {:?}", other.map(|e| e.id)),
        }
    }

    #[tokio::test]
    async fn failed_file_write_leaves_no_record() {
        let mut store = MockFileStore::new();
        store
            .expect_save()
            .times(1)
            .returning(|_, _| Err(AppError::Internal("disk full".into())));
        let services = test_support::services_with_files(Arc::new(store)).await;
        let laptop = test_support::create_type(&services, "Laptop").await;

        let input = test_support::equipment_input(laptop.id, "Dell", "XPS13", None);
        let result = services.equipment.create(input, Some(pdf(10))).await;
        assert!(matches!(result, Err(AppError::Internal(_))));

        let all = services.equipment.list(&EquipmentFilter::default()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn replaced_invoice_is_removed_after_commit() {
        let services = test_support::services().await;
        let laptop = test_support::create_type(&services, "Laptop").await;

        let input = test_support::equipment_input(laptop.id, "Dell", "XPS13", None);
        let created = services.equipment.create(input, Some(pdf(10))).await.unwrap();
        let first_ref = created.invoice_file.clone().unwrap();

        let input = test_support::equipment_input(laptop.id, "Dell", "XPS15", None);
        let updated = services
            .equipment
            .update(created.id, input, Some(pdf(20)))
            .await
            .unwrap();
        let second_ref = updated.invoice_file.clone().unwrap();
        assert_ne!(first_ref, second_ref);
        assert!(services.files.open(&first_ref).await.is_err());

        let (_, bytes) = services.equipment.invoice(created.id).await.unwrap();
        assert_eq!(bytes.len(), 20);

        // keeping the invoice when none is sent
        let input = test_support::equipment_input(laptop.id, "Dell", "XPS15", None);
        let kept = services.equipment.update(created.id, input, None).await.unwrap();
        assert_eq!(kept.invoice_file.as_deref(), Some(second_ref.as_str()));

        services.equipment.delete(created.id).await.unwrap();
        assert!(services.files.open(&second_ref).await.is_err());
    }

    #[tokio::test]
    async fn filter_options_skip_blank_values() {
        let services = test_support::services().await;
        let laptop = test_support::create_type(&services, "Laptop").await;
        let jane = test_support::create_employee(&services, "Jane", "Doe", "martinique").await;
        let mut input = test_support::equipment_input(laptop.id, "Dell", "XPS13", Some(jane.id));
        input.purchase_date = Some("2022-05-01".into());
        services.equipment.create(input, None).await.unwrap();
        let mut input = test_support::equipment_input(laptop.id, "HP", "Elite", None);
        input.purchase_date = Some("2024-01-10".into());
        services.equipment.create(input, None).await.unwrap();

        let options = services.equipment.filter_options().await.unwrap();
        assert_eq!(options.types, vec!["Laptop"]);
        assert_eq!(options.brands, vec!["Dell", "HP"]);
        assert_eq!(options.years, vec![2024, 2022]);
        assert_eq!(options.employees.len(), 1);
        assert_eq!(options.employees[0].label, "Jane Doe");
        assert_eq!(options.states.len(), 4);
    }
}
