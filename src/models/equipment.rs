//! Equipment model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use sqlx::{FromRow, QueryBuilder, Sqlite};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{
    credential::{normalize_credentials, Credential, CredentialDraft, CredentialInput},
    enums::{EquipmentState, Territory},
    event::Event,
    fields::{clean_text, field_messages, parse_date, parse_id, parse_price, parse_warranty, FieldValue},
};

/// Equipment record with its type and assignee resolved
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i64,
    pub type_id: Option<i64>,
    /// Linked type name, or the stored label when the type is gone
    pub type_label: String,
    pub brand: String,
    pub model: String,
    pub serial_number: Option<String>,
    pub state: EquipmentState,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_place: Option<String>,
    pub price: Option<f64>,
    pub warranty_years: Option<i64>,
    pub employee_id: Option<i64>,
    /// Display name of the assignee, kept in step with `employee_id`
    pub employee_label: Option<String>,
    pub employee_first_name: Option<String>,
    pub employee_last_name: Option<String>,
    pub employee_email: Option<String>,
    pub employee_phone: Option<String>,
    pub employee_role: Option<String>,
    pub employee_territory: Option<Territory>,
    pub comment: Option<String>,
    /// Stored invoice file reference
    pub invoice_file: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Equipment with credentials and event history
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EquipmentDetail {
    #[serde(flatten)]
    pub equipment: Equipment,
    pub credentials: Vec<Credential>,
    pub events: Vec<Event>,
}

/// Create or update equipment request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct EquipmentInput {
    #[schema(value_type = Option<i64>)]
    pub type_id: Option<FieldValue>,
    #[serde(alias = "marque")]
    #[validate(
        required(message = "Brand is required."),
        length(max = 100, message = "Brand must be at most 100 characters.")
    )]
    pub brand: Option<String>,
    #[serde(alias = "modele")]
    #[validate(
        required(message = "Model is required."),
        length(max = 100, message = "Model must be at most 100 characters.")
    )]
    pub model: Option<String>,
    #[serde(alias = "numero_serie")]
    pub serial_number: Option<String>,
    #[serde(alias = "etat")]
    #[validate(required(message = "State is required."))]
    pub state: Option<String>,
    #[serde(alias = "date_achat")]
    pub purchase_date: Option<String>,
    #[serde(alias = "lieu_achat")]
    pub purchase_place: Option<String>,
    #[serde(alias = "prix")]
    #[schema(value_type = Option<String>)]
    pub price: Option<FieldValue>,
    #[serde(alias = "garantie_annees")]
    #[schema(value_type = Option<i64>)]
    pub warranty_years: Option<FieldValue>,
    #[serde(alias = "employe_id")]
    #[schema(value_type = Option<i64>)]
    pub employee_id: Option<FieldValue>,
    #[serde(alias = "commentaire")]
    pub comment: Option<String>,
    /// Replaces the whole credential list
    #[serde(default, alias = "identifiants")]
    pub credentials: Vec<CredentialInput>,
    /// Drop the stored invoice without uploading a new one
    #[serde(default)]
    pub remove_invoice: bool,
}

/// Validated equipment fields
#[derive(Debug, Clone)]
pub struct EquipmentDraft {
    pub type_id: i64,
    pub brand: String,
    pub model: String,
    pub serial_number: Option<String>,
    pub state: EquipmentState,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_place: Option<String>,
    pub price: Option<f64>,
    pub warranty_years: Option<i64>,
    pub employee_id: Option<i64>,
    pub comment: Option<String>,
    pub credentials: Vec<CredentialDraft>,
    pub remove_invoice: bool,
}

impl EquipmentInput {
    /// Trim every field and check the rules, collecting all violations.
    /// Whether the referenced type and employee exist is checked by the caller.
    pub fn into_draft(self) -> Result<EquipmentDraft, Vec<String>> {
        let mut messages = Vec::new();

        let type_id = match self.type_id.as_ref().and_then(FieldValue::as_text) {
            None => {
                messages.push("Type is required.".to_string());
                None
            }
            Some(raw) => {
                let id = parse_id(&raw);
                if id.is_none() {
                    messages.push("Type is invalid.".to_string());
                }
                id
            }
        };

        let text = EquipmentInput {
            brand: clean_text(self.brand),
            model: clean_text(self.model),
            state: clean_text(self.state),
            ..Default::default()
        };
        let derived = text.validate().err().unwrap_or_default();
        messages.extend(field_messages(&derived, "brand"));
        messages.extend(field_messages(&derived, "model"));
        messages.extend(field_messages(&derived, "state"));

        let state = text.state.as_deref().and_then(|s| s.parse::<EquipmentState>().ok());
        if text.state.is_some() && state.is_none() {
            messages.push("State is invalid.".to_string());
        }

        let purchase_date = match clean_text(self.purchase_date) {
            None => None,
            Some(raw) => {
                let date = parse_date(&raw);
                if date.is_none() {
                    messages.push("Purchase date must be a valid date (YYYY-MM-DD).".to_string());
                }
                date
            }
        };

        let price = match self.price.as_ref().and_then(FieldValue::as_text) {
            None => None,
            Some(raw) => {
                let price = parse_price(&raw);
                if price.is_none() {
                    messages.push("Price must be a number greater than or equal to 0.".to_string());
                }
                price
            }
        };

        let warranty_years = match self.warranty_years.as_ref().and_then(FieldValue::as_text) {
            None => None,
            Some(raw) => {
                let years = parse_warranty(&raw);
                if years.is_none() {
                    messages.push("Warranty must be a whole number of years (0 or more).".to_string());
                }
                years
            }
        };

        let employee_id = match self.employee_id.as_ref().and_then(FieldValue::as_text) {
            None => None,
            Some(raw) => {
                let id = parse_id(&raw);
                if id.is_none() {
                    messages.push("Assigned employee is invalid.".to_string());
                }
                id
            }
        };

        let credentials = match normalize_credentials(self.credentials) {
            Ok(credentials) => credentials,
            Err(errors) => {
                messages.extend(errors);
                Vec::new()
            }
        };

        match (type_id, state) {
            (Some(type_id), Some(state)) if messages.is_empty() => Ok(EquipmentDraft {
                type_id,
                brand: text.brand.unwrap_or_default(),
                model: text.model.unwrap_or_default(),
                serial_number: clean_text(self.serial_number),
                state,
                purchase_date,
                purchase_place: clean_text(self.purchase_place),
                price,
                warranty_years,
                employee_id,
                comment: clean_text(self.comment),
                credentials,
                remove_invoice: self.remove_invoice,
            }),
            _ => Err(messages),
        }
    }
}

/// Equipment list query parameters, as sent by the list page
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct EquipmentQuery {
    /// Free-text search
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub search: Option<String>,
    /// State name or stored label; `tous` or `all` disables the filter
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default, alias = "etat")]
    pub state: Option<String>,
    /// Resolved type label
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default, rename = "type")]
    pub type_label: Option<String>,
    /// Assigned employee id
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default, alias = "employe")]
    pub employee: Option<String>,
    /// Purchase year
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default, alias = "annee")]
    pub year: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default, alias = "marque")]
    pub brand: Option<String>,
}

/// Typed equipment filter; every field is optional and they combine with AND
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquipmentFilter {
    pub search: Option<String>,
    pub state: Option<EquipmentState>,
    pub type_label: Option<String>,
    pub employee_id: Option<i64>,
    pub year: Option<i32>,
    pub brand: Option<String>,
    /// Set when a state, employee or year value cannot match any record
    pub unmatched: bool,
}

/// Values meaning "no filter"
const ANY_VALUE: [&str; 3] = ["tous", "toutes", "all"];

fn filter_value(value: Option<String>) -> Option<String> {
    clean_text(value).filter(|v| !ANY_VALUE.iter().any(|any| v.eq_ignore_ascii_case(any)))
}

impl From<EquipmentQuery> for EquipmentFilter {
    /// Unparseable state, employee or year values match nothing
    fn from(query: EquipmentQuery) -> Self {
        let state = filter_value(query.state);
        let employee = filter_value(query.employee);
        let year = filter_value(query.year);

        let parsed_state = state.as_deref().and_then(|s| s.parse::<EquipmentState>().ok());
        let employee_id = employee.as_deref().and_then(parse_id);
        let parsed_year = year
            .as_deref()
            .and_then(|s| s.parse::<i32>().ok())
            .filter(|y| (1000..=9999).contains(y));

        let unmatched = (state.is_some() && parsed_state.is_none())
            || (employee.is_some() && employee_id.is_none())
            || (year.is_some() && parsed_year.is_none());

        EquipmentFilter {
            search: clean_text(query.search),
            state: parsed_state,
            type_label: filter_value(query.type_label),
            employee_id,
            year: parsed_year,
            brand: filter_value(query.brand),
            unmatched,
        }
    }
}

/// Columns searched by the free-text filter
const SEARCH_COLUMNS: [&str; 11] = [
    "e.type_label",
    "t.name",
    "e.brand",
    "e.model",
    "e.serial_number",
    "e.purchase_place",
    "e.comment",
    "emp.first_name",
    "emp.last_name",
    "TRIM(emp.first_name || ' ' || emp.last_name)",
    "emp.territory",
];

/// SQLite's LIKE folds ASCII case only, so the term keeps its own case
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl EquipmentFilter {
    /// Append the filter predicates to a query that already has a WHERE clause.
    /// Expects the `e`, `t` and `emp` aliases of the equipment listing query.
    pub fn push_predicates(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        if self.unmatched {
            qb.push(" AND 0");
        }
        if let Some(search) = &self.search {
            let pattern = like_pattern(search);
            qb.push(" AND (");
            for (i, column) in SEARCH_COLUMNS.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push(format!("COALESCE({}, '') LIKE ", column));
                qb.push_bind(pattern.clone());
                qb.push(" ESCAPE '\\'");
            }
            qb.push(")");
        }
        if let Some(state) = self.state {
            qb.push(" AND e.state = ").push_bind(state);
        }
        if let Some(type_label) = &self.type_label {
            qb.push(" AND COALESCE(t.name, e.type_label) = ")
                .push_bind(type_label.clone());
        }
        if let Some(employee_id) = self.employee_id {
            qb.push(" AND e.employee_id = ").push_bind(employee_id);
        }
        if let Some(year) = self.year {
            qb.push(" AND strftime('%Y', e.purchase_date) = ")
                .push_bind(format!("{:04}", year));
        }
        if let Some(brand) = &self.brand {
            qb.push(" AND e.brand = ").push_bind(brand.clone());
        }
    }
}

/// Live values for the list page filters
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FilterOptions {
    pub states: Vec<EquipmentState>,
    pub types: Vec<String>,
    pub brands: Vec<String>,
    /// Purchase years, most recent first
    pub years: Vec<i32>,
    pub employees: Vec<EmployeeOption>,
}

/// Employee currently holding equipment
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct EmployeeOption {
    pub id: i64,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> EquipmentQuery {
        let params = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(params)).unwrap()
    }

    #[test]
    fn sentinels_mean_no_filter() {
        let filter = EquipmentFilter::from(query(&[
            ("etat", "tous"),
            ("type", "toutes"),
            ("employe", "all"),
            ("annee", "TOUS"),
            ("marque", "all"),
        ]));
        assert_eq!(filter, EquipmentFilter::default());
    }

    #[test]
    fn invalid_values_match_nothing() {
        for pair in [("employe", "abc"), ("etat", "Perdu"), ("annee", "20x4")] {
            let filter = EquipmentFilter::from(query(&[pair]));
            assert!(filter.unmatched, "{:?}", pair);

            let mut qb = QueryBuilder::<Sqlite>::new("SELECT 1 FROM equipment e WHERE 1 = 1");
            filter.push_predicates(&mut qb);
            assert!(qb.sql().contains(" AND 0"));
        }
        assert!(!EquipmentFilter::from(query(&[("etat", "Disponible")])).unmatched);
    }

    #[test]
    fn legacy_parameter_names_are_understood() {
        let filter = EquipmentFilter::from(query(&[
            ("etat", "Disponible"),
            ("type", "Laptop"),
            ("employe", "3"),
            ("annee", "2023"),
            ("marque", "Dell"),
            ("search", "  xps "),
        ]));
        assert_eq!(filter.state, Some(EquipmentState::Available));
        assert_eq!(filter.type_label.as_deref(), Some("Laptop"));
        assert_eq!(filter.employee_id, Some(3));
        assert_eq!(filter.year, Some(2023));
        assert_eq!(filter.brand.as_deref(), Some("Dell"));
        assert_eq!(filter.search.as_deref(), Some("xps"));
    }

    #[test]
    fn empty_query_values_mean_no_filter() {
        let filter = EquipmentFilter::from(query(&[("state", ""), ("search", "")]));
        assert_eq!(filter, EquipmentFilter::default());
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_Off"), "%50\\%\\_Off%");
    }

    #[test]
    fn predicates_are_bound_not_inlined() {
        let filter = EquipmentFilter {
            brand: Some("Dell'; DROP TABLE equipment; --".into()),
            year: Some(2023),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT 1 FROM equipment e WHERE 1 = 1");
        filter.push_predicates(&mut qb);
        let sql = qb.sql();
        assert!(!sql.contains("DROP"));
        assert!(sql.contains("strftime('%Y', e.purchase_date) = ?"));
        assert!(sql.contains("e.brand = ?"));
    }

    #[test]
    fn price_and_warranty_errors_are_collected() {
        let input = EquipmentInput {
            type_id: Some(FieldValue::from(1)),
            brand: Some("Dell".into()),
            model: Some("XPS13".into()),
            state: Some("Disponible".into()),
            price: Some(FieldValue::from("-5")),
            warranty_years: Some(FieldValue::from("1.5")),
            ..Default::default()
        };
        let errors = input.into_draft().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("Price"));
        assert!(errors[1].contains("Warranty"));
    }

    #[test]
    fn comma_price_is_normalized() {
        let input = EquipmentInput {
            type_id: Some(FieldValue::from("1")),
            brand: Some(" Dell ".into()),
            model: Some("XPS13".into()),
            state: Some("Available".into()),
            price: Some(FieldValue::from("12,50")),
            warranty_years: Some(FieldValue::from(2)),
            purchase_date: Some("2023-04-01".into()),
            ..Default::default()
        };
        let draft = input.into_draft().unwrap();
        assert_eq!(draft.price, Some(12.5));
        assert_eq!(draft.warranty_years, Some(2));
        assert_eq!(draft.brand, "Dell");
        assert_eq!(draft.state, EquipmentState::Available);
    }

    #[test]
    fn missing_required_fields_are_all_reported() {
        let errors = EquipmentInput::default().into_draft().unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Type is required.",
                "Brand is required.",
                "Model is required.",
                "State is required.",
            ]
        );
    }
}
