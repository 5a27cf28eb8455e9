//! Equipment type model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::fields::{clean_text, field_messages};

/// Equipment category (Laptop, Phone, ...)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EquipmentType {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Number of equipment records linked to this type
    pub equipment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create or update type request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct EquipmentTypeInput {
    #[serde(alias = "nom")]
    #[validate(
        required(message = "Type name is required."),
        length(max = 100, message = "Type name must be at most 100 characters.")
    )]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "Description must be at most 500 characters."))]
    pub description: Option<String>,
}

/// Validated type fields
#[derive(Debug, Clone)]
pub struct EquipmentTypeDraft {
    pub name: String,
    pub description: Option<String>,
}

impl EquipmentTypeInput {
    /// Trim every field and check the rules, collecting all violations
    pub fn into_draft(self) -> Result<EquipmentTypeDraft, Vec<String>> {
        let input = EquipmentTypeInput {
            name: clean_text(self.name),
            description: clean_text(self.description),
        };

        if let Err(errors) = input.validate() {
            let mut messages = field_messages(&errors, "name");
            messages.extend(field_messages(&errors, "description"));
            return Err(messages);
        }

        Ok(EquipmentTypeDraft {
            name: input.name.unwrap_or_default(),
            description: input.description,
        })
    }
}
