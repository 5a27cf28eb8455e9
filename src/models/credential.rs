//! Equipment credential model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::fields::clean_text;

pub const INCOMPLETE_CREDENTIAL: &str =
    "Each credential must include both a login name and a password.";

/// Stored login for one piece of equipment
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Credential {
    pub id: i64,
    pub equipment_id: i64,
    pub name: String,
    pub secret: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Credential entry as submitted
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CredentialInput {
    #[serde(alias = "nom", alias = "login")]
    pub name: Option<String>,
    #[serde(alias = "mot_de_passe", alias = "password")]
    pub secret: Option<String>,
}

/// Credential entry with both fields present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialDraft {
    pub name: String,
    pub secret: String,
}

/// Replace-all request body
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CredentialsUpdate {
    #[serde(default)]
    pub credentials: Vec<CredentialInput>,
}

/// Trim entries, drop the fully blank ones and reject half-filled ones
pub fn normalize_credentials(entries: Vec<CredentialInput>) -> Result<Vec<CredentialDraft>, Vec<String>> {
    let mut drafts = Vec::new();
    let mut messages = Vec::new();

    for entry in entries {
        match (clean_text(entry.name), clean_text(entry.secret)) {
            (None, None) => {}
            (Some(name), Some(secret)) => drafts.push(CredentialDraft { name, secret }),
            _ => messages.push(INCOMPLETE_CREDENTIAL.to_string()),
        }
    }

    if messages.is_empty() {
        Ok(drafts)
    } else {
        Err(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, secret: &str) -> CredentialInput {
        CredentialInput {
            name: Some(name.to_string()),
            secret: Some(secret.to_string()),
        }
    }

    #[test]
    fn blank_entries_are_dropped() {
        let drafts = normalize_credentials(vec![entry("  ", ""), entry(" admin ", " s3cret ")]).unwrap();
        assert_eq!(
            drafts,
            vec![CredentialDraft {
                name: "admin".into(),
                secret: "s3cret".into()
            }]
        );
    }

    #[test]
    fn half_filled_entry_is_rejected() {
        let errors = normalize_credentials(vec![entry("admin", "  ")]).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_lowercase().contains("both a login name and a password"));
    }

    #[test]
    fn legacy_field_names_deserialize() {
        let input: CredentialInput =
            serde_json::from_str(r#"{"nom": "wifi", "mot_de_passe": "pass"}"#).unwrap();
        assert_eq!(input.name.as_deref(), Some("wifi"));
        assert_eq!(input.secret.as_deref(), Some("pass"));
    }
}
