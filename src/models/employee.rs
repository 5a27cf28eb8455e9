//! Employee model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{
    enums::{EquipmentState, Territory},
    equipment::Equipment,
    fields::{clean_text, field_messages, is_valid_phone, EMAIL_PATTERN},
};

/// Employee record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// "First Last", trimmed
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub territory: Territory,
    pub comment: Option<String>,
    /// Number of equipment records currently assigned
    pub equipment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Employees of one territory
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TerritoryGroup {
    pub territory: Territory,
    pub label: String,
    pub employees: Vec<Employee>,
}

/// Per-state equipment count
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StateCount {
    pub state: EquipmentState,
    pub count: i64,
}

/// Employee with the equipment assigned to them
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeProfile {
    pub employee: Employee,
    pub equipment: Vec<Equipment>,
    /// Assigned equipment counted by state, every state listed
    pub state_counts: Vec<StateCount>,
}

/// Create or update employee request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct EmployeeInput {
    #[serde(alias = "prenom")]
    #[validate(
        required(message = "First name is required."),
        length(max = 100, message = "First name must be at most 100 characters.")
    )]
    pub first_name: Option<String>,
    #[serde(alias = "nom")]
    #[validate(
        required(message = "Last name is required."),
        length(max = 100, message = "Last name must be at most 100 characters.")
    )]
    pub last_name: Option<String>,
    #[validate(regex(path = *EMAIL_PATTERN, message = "Email address is invalid."))]
    pub email: Option<String>,
    #[serde(alias = "telephone")]
    pub phone: Option<String>,
    #[serde(alias = "poste")]
    pub role: Option<String>,
    #[serde(alias = "territoire")]
    #[validate(required(message = "Territory is required."))]
    pub territory: Option<String>,
    #[serde(alias = "commentaire")]
    pub comment: Option<String>,
}

/// Validated employee fields
#[derive(Debug, Clone)]
pub struct EmployeeDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub territory: Territory,
    pub comment: Option<String>,
}

impl EmployeeInput {
    /// Trim every field and check the rules, collecting all violations
    pub fn into_draft(self) -> Result<EmployeeDraft, Vec<String>> {
        let input = EmployeeInput {
            first_name: clean_text(self.first_name),
            last_name: clean_text(self.last_name),
            email: clean_text(self.email),
            phone: clean_text(self.phone),
            role: clean_text(self.role),
            territory: clean_text(self.territory).map(|t| t.to_lowercase()),
            comment: clean_text(self.comment),
        };

        let derived = input.validate().err().unwrap_or_default();
        let mut messages = Vec::new();
        for field in ["first_name", "last_name", "email"] {
            messages.extend(field_messages(&derived, field));
        }

        if let Some(phone) = &input.phone {
            if !is_valid_phone(phone) {
                messages.push("Phone number is invalid.".to_string());
            }
        }

        messages.extend(field_messages(&derived, "territory"));
        let territory = input
            .territory
            .as_deref()
            .map(|t| t.parse::<Territory>());
        if let Some(Err(_)) = territory {
            messages.push("Territory must be Martinique or Guadeloupe.".to_string());
        }

        match territory {
            Some(Ok(territory)) if messages.is_empty() => Ok(EmployeeDraft {
                first_name: input.first_name.unwrap_or_default(),
                last_name: input.last_name.unwrap_or_default(),
                email: input.email,
                phone: input.phone,
                role: input.role,
                territory,
                comment: input.comment,
            }),
            _ => Err(messages),
        }
    }
}
