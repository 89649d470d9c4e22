//! Bookstore Inventory Management
//!
//! A REST JSON API for managing a bookstore's book inventory and user
//! accounts, backed by MongoDB with bearer-token authentication.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}
