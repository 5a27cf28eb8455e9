//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, backup, employees, equipment, equipment_types, events, export, health, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Invent API",
        version = "1.0.0",
        description = "Equipment Inventory Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Types
        equipment_types::list_types,
        equipment_types::get_type,
        equipment_types::create_type,
        equipment_types::update_type,
        equipment_types::delete_type,
        // Employees
        employees::list_employees,
        employees::directory,
        employees::get_employee,
        employees::create_employee,
        employees::update_employee,
        employees::delete_employee,
        // Equipment
        equipment::list_equipment,
        equipment::filter_options,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        equipment::download_invoice,
        equipment::list_credentials,
        equipment::replace_credentials,
        // Events
        events::list_events,
        events::create_event,
        events::update_event,
        events::delete_event,
        events::download_document,
        // Stats
        stats::get_stats,
        // Backup
        backup::create_backup,
        // Export
        export::export_equipment,
        export::export_employees,
        export::export_stats,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::AdminInfo,
            // Enumerations
            crate::models::enums::EquipmentState,
            crate::models::enums::EventCategory,
            crate::models::enums::Territory,
            // Types
            crate::models::equipment_type::EquipmentType,
            crate::models::equipment_type::EquipmentTypeInput,
            // Employees
            crate::models::employee::Employee,
            crate::models::employee::EmployeeInput,
            crate::models::employee::EmployeeProfile,
            crate::models::employee::TerritoryGroup,
            crate::models::employee::StateCount,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::EquipmentDetail,
            crate::models::equipment::EquipmentInput,
            crate::models::equipment::FilterOptions,
            crate::models::equipment::EmployeeOption,
            crate::models::credential::Credential,
            crate::models::credential::CredentialInput,
            crate::models::credential::CredentialsUpdate,
            // Events
            crate::models::event::Event,
            crate::models::event::EventInput,
            // Stats
            stats::StatsResponse,
            stats::StatEntry,
            // Backup
            backup::BackupInfo,
            // Export
            export::EquipmentExportRow,
            export::EmployeeExportRow,
            export::StatsExport,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "types", description = "Equipment type registry"),
        (name = "employees", description = "Employee directory"),
        (name = "equipment", description = "Equipment registry and credentials"),
        (name = "events", description = "Equipment event log"),
        (name = "stats", description = "Statistics"),
        (name = "backup", description = "Database backups"),
        (name = "export", description = "Spreadsheet export rows")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
