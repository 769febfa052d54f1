use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::credentials::AdminCredentials;
use crate::auth::session::SessionManager;
use crate::config::Config;

/// Shared application state available in all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub admin_credentials: AdminCredentials,
    pub user_sessions: SessionManager,
    pub admin_sessions: SessionManager,
}

pub mod admin;
pub mod auth;
