use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;
use utoipa::ToSchema;

use crate::error::{FieldError, SumiError};
use crate::extractors::{AdminUser, Json};
use crate::response::ApiResponse;

use super::auth::MessageResponse;
use super::AppState;

// ── Request / Response types ──

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginRequest {
    pub login_id: String,
    pub password: String,
}

/// The admin principal. There are no admin rows, just the configured id.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminPrincipal {
    pub login_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminAuthResponse {
    pub user: AdminPrincipal,
    /// Session expiry, epoch milliseconds.
    pub expires_at: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminSessionInfo {
    pub user: Option<AdminPrincipal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/session", get(session))
        .route("/me", get(me))
}

// ── Handlers ──

/// Log in to the admin console against the configured credential pair.
#[utoipa::path(
    post,
    path = "/api/admin/auth/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Authenticated; admin session cookie set", body = ApiResponse<AdminAuthResponse>),
        (status = 400, description = "Malformed input"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Admin credentials not configured")
    ),
    tag = "admin"
)]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<ApiResponse<AdminAuthResponse>, SumiError> {
    let mut errors = Vec::new();
    if payload.login_id.is_empty() {
        errors.push(FieldError::new("loginId", "is required"));
    }
    if payload.password.is_empty() {
        errors.push(FieldError::new("password", "is required"));
    }
    if !errors.is_empty() {
        return Err(SumiError::validation_fields(errors));
    }

    if !state
        .admin_credentials
        .validate(&payload.login_id, &payload.password)?
    {
        return Err(SumiError::Unauthorized(
            "Invalid login id or password".to_string(),
        ));
    }

    let session = state
        .admin_sessions
        .create(&cookies, &payload.login_id)
        .await?;

    Ok(ApiResponse::success(AdminAuthResponse {
        user: AdminPrincipal {
            login_id: payload.login_id,
        },
        expires_at: session.expires_at_ms,
    }))
}

/// Log out of the admin console. Always succeeds.
///
/// Admin sessions are stateless, so this only clears the cookie; a token
/// captured before logout stays valid until its natural expiry.
#[utoipa::path(
    post,
    path = "/api/admin/auth/logout",
    responses(
        (status = 200, description = "Cookie cleared", body = ApiResponse<MessageResponse>)
    ),
    tag = "admin"
)]
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<ApiResponse<MessageResponse>, SumiError> {
    state.admin_sessions.destroy(&cookies).await?;
    Ok(ApiResponse::success(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

/// The authenticated admin principal; 401 when unauthenticated.
#[utoipa::path(
    get,
    path = "/api/admin/auth/me",
    responses(
        (status = 200, description = "Authenticated admin", body = ApiResponse<AdminPrincipal>),
        (status = 401, description = "Not authenticated")
    ),
    tag = "admin",
    security(("admin_session_cookie" = []))
)]
pub async fn me(AdminUser(login_id): AdminUser) -> Result<ApiResponse<AdminPrincipal>, SumiError> {
    Ok(ApiResponse::success(AdminPrincipal { login_id }))
}

/// Introspect the current admin session.
#[utoipa::path(
    get,
    path = "/api/admin/auth/session",
    responses(
        (status = 200, description = "Current admin session, or user: null", body = ApiResponse<AdminSessionInfo>)
    ),
    tag = "admin"
)]
pub async fn session(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<ApiResponse<AdminSessionInfo>, SumiError> {
    match state.admin_sessions.resolve(&cookies).await? {
        Some(sess) => Ok(ApiResponse::success(AdminSessionInfo {
            user: Some(AdminPrincipal {
                login_id: sess.subject,
            }),
            expires_at: Some(sess.expires_at_ms),
        })),
        None => Ok(ApiResponse::success(AdminSessionInfo {
            user: None,
            expires_at: None,
        })),
    }
}
