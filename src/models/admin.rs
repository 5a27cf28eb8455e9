//! Admin account and session token claims

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Operator account
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string
    pub password_hash: String,
}

/// JWT claims for an authenticated admin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub admin_id: i64,
    pub exp: i64,
    pub iat: i64,
}

impl AdminClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn claims(exp_offset: i64) -> AdminClaims {
        let now = Utc::now().timestamp();
        AdminClaims {
            sub: "admin".into(),
            admin_id: 1,
            exp: now + exp_offset,
            iat: now,
        }
    }

    #[test]
    fn token_round_trips_with_same_secret() {
        let token = claims(3600).create_token("secret").unwrap();
        let parsed = AdminClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.admin_id, 1);
        assert!(AdminClaims::from_token(&token, "other").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = claims(-3600).create_token("secret").unwrap();
        assert!(AdminClaims::from_token(&token, "secret").is_err());
    }
}
