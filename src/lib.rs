//! Invent Equipment Inventory Management
//!
//! Tracks equipment, the employees it is assigned to across territories, its
//! lifecycle events and stored credentials, through a REST JSON API.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

#[cfg(test)]
mod test_support;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
