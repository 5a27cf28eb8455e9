//! Equipment lifecycle event model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::{
    enums::{EquipmentState, EventCategory, Territory},
    fields::{clean_text, parse_date, parse_id, FieldValue},
};

/// Event record with the target employee joined
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub id: i64,
    pub equipment_id: i64,
    pub category: EventCategory,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    /// Stored document reference
    pub document: Option<String>,
    /// Set on attribution events
    pub target_employee_id: Option<i64>,
    /// Set on state change events
    pub target_state: Option<EquipmentState>,
    pub target_employee_first_name: Option<String>,
    pub target_employee_last_name: Option<String>,
    pub target_employee_role: Option<String>,
    pub target_employee_territory: Option<Territory>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create or update event request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EventInput {
    #[serde(alias = "categorie")]
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "date_evenement")]
    pub event_date: Option<String>,
    #[serde(alias = "nouvel_employe_id", alias = "employee_id")]
    #[schema(value_type = Option<i64>)]
    pub target_employee_id: Option<FieldValue>,
    #[serde(alias = "nouvel_etat")]
    pub target_state: Option<String>,
    /// Drop the stored document (update only)
    #[serde(default, alias = "supprimer_document")]
    pub remove_document: bool,
}

/// Validated event fields; fields that do not belong to the category are `None`
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub category: EventCategory,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub target_employee_id: Option<i64>,
    pub target_state: Option<EquipmentState>,
    pub remove_document: bool,
}

impl EventInput {
    /// Check the category rules, collecting all violations.
    /// Whether the target employee exists is checked by the caller.
    pub fn into_draft(self) -> Result<EventDraft, Vec<String>> {
        let mut messages = Vec::new();

        let category = match clean_text(self.category) {
            None => {
                messages.push("Event category is required.".to_string());
                None
            }
            Some(raw) => {
                let category = raw.parse::<EventCategory>().ok();
                if category.is_none() {
                    messages.push("Event category is invalid.".to_string());
                }
                category
            }
        };

        let event_date = match clean_text(self.event_date) {
            None => {
                messages.push("Event date is required.".to_string());
                None
            }
            Some(raw) => {
                let date = parse_date(&raw);
                if date.is_none() {
                    messages.push("Event date must be a valid date (YYYY-MM-DD).".to_string());
                }
                date
            }
        };

        let description = clean_text(self.description);
        let mut target_employee_id = None;
        let mut target_state = None;

        match category {
            Some(EventCategory::Attribution) => {
                target_employee_id = self
                    .target_employee_id
                    .as_ref()
                    .and_then(FieldValue::as_text)
                    .and_then(|raw| parse_id(&raw));
                if target_employee_id.is_none() {
                    messages.push("An attribution must name a valid employee.".to_string());
                }
            }
            Some(EventCategory::StateChange) => {
                target_state = clean_text(self.target_state)
                    .and_then(|raw| raw.parse::<EquipmentState>().ok());
                if target_state.is_none() {
                    messages.push("A state change must name a valid state.".to_string());
                }
            }
            Some(EventCategory::Observation) => {
                if description.is_none() {
                    messages.push("An observation requires a description.".to_string());
                }
            }
            None => {}
        }

        match (category, event_date) {
            (Some(category), Some(event_date)) if messages.is_empty() => Ok(EventDraft {
                category,
                description,
                event_date,
                target_employee_id,
                target_state,
                remove_document: self.remove_document,
            }),
            _ => Err(messages),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_change_ignores_employee_field() {
        let input = EventInput {
            category: Some("État".into()),
            event_date: Some("2024-02-01".into()),
            target_state: Some("En panne".into()),
            target_employee_id: Some(FieldValue::from(4)),
            ..Default::default()
        };
        let draft = input.into_draft().unwrap();
        assert_eq!(draft.category, EventCategory::StateChange);
        assert_eq!(draft.target_state, Some(EquipmentState::Broken));
        assert_eq!(draft.target_employee_id, None);
    }

    #[test]
    fn attribution_requires_employee() {
        let input = EventInput {
            category: Some("Attribution".into()),
            event_date: Some("2024-02-01".into()),
            target_employee_id: Some(FieldValue::from("abc")),
            ..Default::default()
        };
        let errors = input.into_draft().unwrap_err();
        assert_eq!(errors, vec!["An attribution must name a valid employee."]);
    }

    #[test]
    fn observation_requires_description() {
        let input = EventInput {
            category: Some("Observation".into()),
            event_date: Some("2024-02-01".into()),
            description: Some("   ".into()),
            ..Default::default()
        };
        assert!(input.into_draft().is_err());
    }

    #[test]
    fn every_violation_is_collected() {
        let input = EventInput {
            category: Some("Repair".into()),
            event_date: Some("01/02/2024".into()),
            ..Default::default()
        };
        let errors = input.into_draft().unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Event category is invalid.",
                "Event date must be a valid date (YYYY-MM-DD).",
            ]
        );
    }
}
