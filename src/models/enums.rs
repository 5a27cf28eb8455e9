//! Enumerations shared by the inventory models
//!
//! Enum values are stored in SQLite as the labels the inventory has always
//! used ("En service", "État", ...). The JSON API speaks the variant names and
//! also accepts the stored labels on input.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Store enum values in TEXT columns through their `as_db` label
macro_rules! sqlite_text_enum {
    ($ty:ty) => {
        impl sqlx::Type<sqlx::Sqlite> for $ty {
            fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
                <str as sqlx::Type<sqlx::Sqlite>>::type_info()
            }

            fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
                <str as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for $ty {
            fn decode(
                value: sqlx::sqlite::SqliteValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
            ) -> sqlx::encode::IsNull {
                <String as sqlx::Encode<sqlx::Sqlite>>::encode(self.as_db().to_string(), buf)
            }
        }
    };
}

/// Operational state of a piece of equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum EquipmentState {
    #[serde(alias = "En service", alias = "in_service")]
    InService,
    #[serde(alias = "Disponible", alias = "available")]
    Available,
    #[serde(alias = "En panne", alias = "broken")]
    Broken,
    #[serde(alias = "Indisponible", alias = "unavailable")]
    Unavailable,
}

impl EquipmentState {
    pub const ALL: [EquipmentState; 4] = [
        EquipmentState::InService,
        EquipmentState::Available,
        EquipmentState::Broken,
        EquipmentState::Unavailable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentState::InService => "InService",
            EquipmentState::Available => "Available",
            EquipmentState::Broken => "Broken",
            EquipmentState::Unavailable => "Unavailable",
        }
    }

    /// Label stored in the database
    pub fn as_db(&self) -> &'static str {
        match self {
            EquipmentState::InService => "En service",
            EquipmentState::Available => "Disponible",
            EquipmentState::Broken => "En panne",
            EquipmentState::Unavailable => "Indisponible",
        }
    }
}

impl std::fmt::Display for EquipmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EquipmentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        EquipmentState::ALL
            .into_iter()
            .find(|state| {
                state.as_str().eq_ignore_ascii_case(value) || state.as_db().eq_ignore_ascii_case(value)
            })
            .ok_or_else(|| format!("Invalid equipment state: {}", s))
    }
}

sqlite_text_enum!(EquipmentState);

/// Kind of lifecycle event recorded against a piece of equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum EventCategory {
    /// Equipment handed to an employee
    #[serde(alias = "attribution")]
    Attribution,
    /// Equipment state changed
    #[serde(alias = "État", alias = "Etat", alias = "state_change")]
    StateChange,
    /// Free-form note
    #[serde(alias = "observation")]
    Observation,
}

impl EventCategory {
    pub const ALL: [EventCategory; 3] = [
        EventCategory::Attribution,
        EventCategory::StateChange,
        EventCategory::Observation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Attribution => "Attribution",
            EventCategory::StateChange => "StateChange",
            EventCategory::Observation => "Observation",
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            EventCategory::Attribution => "Attribution",
            EventCategory::StateChange => "État",
            EventCategory::Observation => "Observation",
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        if value == "etat" || value == "état" {
            return Ok(EventCategory::StateChange);
        }
        EventCategory::ALL
            .into_iter()
            .find(|category| category.as_str().to_lowercase() == value)
            .ok_or_else(|| format!("Invalid event category: {}", s))
    }
}

sqlite_text_enum!(EventCategory);

/// Geographic grouping of employees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Territory {
    Martinique,
    Guadeloupe,
}

impl Territory {
    /// Reporting order
    pub const ALL: [Territory; 2] = [Territory::Martinique, Territory::Guadeloupe];

    pub fn as_str(&self) -> &'static str {
        match self {
            Territory::Martinique => "martinique",
            Territory::Guadeloupe => "guadeloupe",
        }
    }

    pub fn as_db(&self) -> &'static str {
        self.as_str()
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Territory::Martinique => "Martinique",
            Territory::Guadeloupe => "Guadeloupe",
        }
    }
}

impl std::fmt::Display for Territory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Territory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "martinique" => Ok(Territory::Martinique),
            "guadeloupe" => Ok(Territory::Guadeloupe),
            _ => Err(format!("Invalid territory: {}", s)),
        }
    }
}

sqlite_text_enum!(Territory);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_parses_api_names_and_stored_labels() {
        assert_eq!("Available".parse::<EquipmentState>(), Ok(EquipmentState::Available));
        assert_eq!("Disponible".parse::<EquipmentState>(), Ok(EquipmentState::Available));
        assert_eq!("en panne".parse::<EquipmentState>(), Ok(EquipmentState::Broken));
        assert!("Lost".parse::<EquipmentState>().is_err());
    }

    #[test]
    fn state_json_accepts_stored_label() {
        let state: EquipmentState = serde_json::from_str("\"En service\"").unwrap();
        assert_eq!(state, EquipmentState::InService);
        assert_eq!(serde_json::to_string(&state).unwrap(), "\"InService\"");
    }

    #[test]
    fn category_parses_both_spellings() {
        assert_eq!("État".parse::<EventCategory>(), Ok(EventCategory::StateChange));
        assert_eq!("Etat".parse::<EventCategory>(), Ok(EventCategory::StateChange));
        assert_eq!("StateChange".parse::<EventCategory>(), Ok(EventCategory::StateChange));
        assert_eq!("observation".parse::<EventCategory>(), Ok(EventCategory::Observation));
        assert!("Repair".parse::<EventCategory>().is_err());
    }

    #[test]
    fn territory_is_case_insensitive() {
        assert_eq!(" Guadeloupe ".parse::<Territory>(), Ok(Territory::Guadeloupe));
        assert_eq!(Territory::Martinique.to_string(), "martinique");
        assert!("north".parse::<Territory>().is_err());
    }
}
