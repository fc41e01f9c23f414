//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::uploads::UploadStore;
use crate::config::Config;
use crate::token::TokenService;
use bytegurukul_core::ports::DatabaseService;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub tokens: Arc<TokenService>,
    pub uploads: Arc<UploadStore>,
}

impl AppState {
    /// Wires the state from configuration and an already-connected database port.
    pub fn new(config: &Config, db: Arc<dyn DatabaseService>) -> Self {
        let tokens = TokenService::new(
            &config.jwt_secret,
            chrono::Duration::days(config.token_ttl_days),
        );
        let uploads = UploadStore::new(config.upload_dir.clone());
        Self {
            db,
            tokens: Arc::new(tokens),
            uploads: Arc::new(uploads),
        }
    }
}
