//! Admin authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::admin::{Admin, AdminClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Create the configured admin account if it does not exist yet
    pub async fn ensure_admin(&self) -> AppResult<()> {
        let username = self.config.admin_username.trim();
        if username.is_empty() {
            return Err(AppError::Internal("Admin username must not be empty".to_string()));
        }
        if self.repository.admins.get_by_username(username).await?.is_some() {
            return Ok(());
        }

        let hash = hash_password(&self.config.admin_password)?;
        self.repository.admins.create(username, &hash).await?;
        tracing::info!("Created admin account '{}'", username);
        Ok(())
    }

    /// Check credentials and issue a JWT
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, Admin)> {
        let admin = self
            .repository
            .admins
            .get_by_username(username.trim())
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !verify_password(&admin.password_hash, password)? {
            tracing::warn!("Failed login for '{}'", admin.username);
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let now = Utc::now().timestamp();
        let claims = AdminClaims {
            sub: admin.username.clone(),
            admin_id: admin.id,
            exp: now + (self.config.jwt_expiration_hours as i64 * 3600),
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, admin))
    }

    /// Decode a bearer token
    pub fn verify_token(&self, token: &str) -> AppResult<AdminClaims> {
        AdminClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))
    }

    pub async fn get_admin(&self, id: i64) -> AppResult<Admin> {
        self.repository.admins.get_by_id(id).await
    }

    pub fn expires_in_secs(&self) -> i64 {
        self.config.jwt_expiration_hours as i64 * 3600
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
