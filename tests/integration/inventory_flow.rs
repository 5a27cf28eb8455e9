//! End-to-end scenarios through the service layer

use std::sync::Arc;

use axum::body::Bytes;
use tempfile::TempDir;

use invent_server::{
    config::{AppConfig, DatabaseConfig},
    models::{
        credential::CredentialInput,
        employee::EmployeeInput,
        enums::{EquipmentState, Territory},
        equipment::{EquipmentFilter, EquipmentInput, EquipmentQuery},
        equipment_type::EquipmentTypeInput,
        event::EventInput,
        fields::FieldValue,
    },
    repository::Repository,
    services::{
        files::{LocalFileStore, Upload},
        Services,
    },
    AppError,
};

struct Inventory {
    services: Services,
    uploads: TempDir,
}

async fn inventory() -> Inventory {
    let uploads = tempfile::tempdir().unwrap();
    let database = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        ..Default::default()
    };
    let repository = Repository::connect(&database).await.unwrap();
    let files = LocalFileStore::new(uploads.path()).await.unwrap();
    let services = Services::new(repository, &AppConfig::default(), Arc::new(files));
    Inventory {
        services,
        uploads,
    }
}

async fn laptop_and_jane(services: &Services) -> (i64, i64) {
    let laptop = services
        .types
        .create(EquipmentTypeInput {
            name: Some("Laptop".into()),
            description: None,
        })
        .await
        .unwrap();
    let jane = services
        .employees
        .create(EmployeeInput {
            first_name: Some("Jane".into()),
            last_name: Some("Doe".into()),
            email: Some("jane.doe@example.com".into()),
            territory: Some("Guadeloupe".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    (laptop.id, jane.id)
}

fn dell(type_id: i64, price: &str) -> EquipmentInput {
    EquipmentInput {
        type_id: Some(FieldValue::from(type_id)),
        brand: Some("Dell".into()),
        model: Some("XPS13".into()),
        state: Some("Disponible".into()),
        price: Some(FieldValue::from(price)),
        ..Default::default()
    }
}

#[tokio::test]
async fn available_laptop_is_filtered_and_counted() {
    let inventory = inventory().await;
    let services = &inventory.services;
    let (laptop, _) = laptop_and_jane(services).await;
    let created = services.equipment.create(dell(laptop, "1200"), None).await.unwrap();

    let query = EquipmentQuery {
        state: Some("Disponible".into()),
        ..Default::default()
    };
    let found = services.equipment.list(&EquipmentFilter::from(query)).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, created.id);

    let stats = services.stats.get_stats().await.unwrap();
    assert_eq!(stats.total_count, 1);
    assert_eq!(stats.total_value, 1200.0);
    assert_eq!(stats.available_count, 1);
}

#[tokio::test]
async fn attribution_moves_value_to_the_territory() {
    let inventory = inventory().await;
    let services = &inventory.services;
    let (laptop, jane) = laptop_and_jane(services).await;
    let equipment = services.equipment.create(dell(laptop, "1200"), None).await.unwrap();

    let attribution = EventInput {
        category: Some("Attribution".into()),
        event_date: Some("2024-04-02".into()),
        target_employee_id: Some(FieldValue::from(jane)),
        ..Default::default()
    };
    services.events.create(equipment.id, attribution, None).await.unwrap();

    let after = services.equipment.get_by_id(equipment.id).await.unwrap();
    assert_eq!(after.employee_id, Some(jane));
    assert_eq!(after.employee_label.as_deref(), Some("Jane Doe"));
    assert_eq!(after.employee_territory, Some(Territory::Guadeloupe));
    assert_eq!(after.state, EquipmentState::Available);

    let stats = services.stats.get_stats().await.unwrap();
    let guadeloupe = stats
        .by_territory
        .iter()
        .find(|entry| entry.label == "guadeloupe")
        .unwrap();
    assert_eq!((guadeloupe.count, guadeloupe.value), (1, 1200.0));
}

#[tokio::test]
async fn decimal_comma_is_accepted_and_negative_price_rejected() {
    let inventory = inventory().await;
    let services = &inventory.services;
    let (laptop, _) = laptop_and_jane(services).await;

    let created = services.equipment.create(dell(laptop, "12,50"), None).await.unwrap();
    assert_eq!(created.price, Some(12.5));

    let rejected = services.equipment.create(dell(laptop, "-5"), None).await;
    assert!(matches!(rejected, Err(AppError::Validation(_))));
    let all = services.equipment.list(&EquipmentFilter::default()).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn half_filled_credentials_are_rejected_and_blank_ones_dropped() {
    let inventory = inventory().await;
    let services = &inventory.services;
    let (laptop, _) = laptop_and_jane(services).await;

    let mut input = dell(laptop, "100");
    input.credentials = vec![CredentialInput {
        name: Some("admin".into()),
        secret: Some("  ".into()),
    }];
    assert!(matches!(
        services.equipment.create(input, None).await,
        Err(AppError::Validation(_))
    ));

    let mut input = dell(laptop, "100");
    input.credentials = vec![CredentialInput {
        name: Some("".into()),
        secret: Some("".into()),
    }];
    let created = services.equipment.create(input, None).await.unwrap();
    assert!(services.equipment.credentials(created.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn retiring_references_keeps_equipment() {
    let inventory = inventory().await;
    let services = &inventory.services;
    let (laptop, jane) = laptop_and_jane(services).await;

    let mut input = dell(laptop, "800");
    input.employee_id = Some(FieldValue::from(jane));
    let equipment = services.equipment.create(input, None).await.unwrap();

    services.types.retire(laptop).await.unwrap();
    services.employees.retire(jane).await.unwrap();

    let kept = services.equipment.get_by_id(equipment.id).await.unwrap();
    assert_eq!(kept.type_id, None);
    assert_eq!(kept.type_label, "Laptop");
    assert_eq!(kept.employee_id, None);
    assert_eq!(kept.employee_label, None);

    let options = services.equipment.filter_options().await.unwrap();
    assert_eq!(options.types, vec!["Laptop"]);
    assert!(options.employees.is_empty());
}

#[tokio::test]
async fn invoice_lives_on_disk_until_equipment_is_deleted() {
    let inventory = inventory().await;
    let services = &inventory.services;
    let (laptop, _) = laptop_and_jane(services).await;

    let invoice = Upload {
        file_name: "Facture été.pdf".into(),
        content_type: "application/pdf".into(),
        bytes: Bytes::from_static(b"%PDF-1.4 test"),
    };
    let created = services
        .equipment
        .create(dell(laptop, "1200"), Some(invoice))
        .await
        .unwrap();
    let file_ref = created.invoice_file.clone().unwrap();
    assert!(file_ref.ends_with("-Facture_ete.pdf"));
    assert!(inventory.uploads.path().join(&file_ref).exists());

    let state_change = EventInput {
        category: Some("État".into()),
        event_date: Some("2024-05-01".into()),
        target_state: Some("En panne".into()),
        ..Default::default()
    };
    services.events.create(created.id, state_change, None).await.unwrap();
    assert_eq!(
        services.equipment.get_by_id(created.id).await.unwrap().state,
        EquipmentState::Broken
    );

    services.equipment.delete(created.id).await.unwrap();
    assert!(!inventory.uploads.path().join(&file_ref).exists());
    assert!(matches!(
        services.events.list(created.id).await,
        Err(AppError::NotFound(_))
    ));
}
