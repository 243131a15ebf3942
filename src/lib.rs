//! Liblend Library Lending Service
//!
//! A REST JSON API backend for a book-lending library: catalog of books,
//! borrowing transactions with inventory consistency, and ownership-based
//! access control.

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
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub repository: repository::Repository,
}
