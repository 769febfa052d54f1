use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;
use utoipa::ToSchema;

use crate::auth::{authenticate_user, signup_user};
use crate::error::{FieldError, SumiError};
use crate::extractors::{CurrentUser, Json};
use crate::models::user::{Entity as User, UserResponse};
use crate::response::ApiResponse;

use super::AppState;

// ── Request / Response types ──

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    Login,
    Signup,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Shown in the editor UI; only used at signup.
    pub display_name: Option<String>,
    pub mode: AuthMode,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserResponse,
    /// Session expiry, epoch milliseconds.
    pub expires_at: i64,
}

/// Introspection payload: `user` is null when unauthenticated.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user: Option<UserResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
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

/// Log in or sign up an editor account, depending on `mode`.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated; session cookie set", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Malformed input"),
        (status = 401, description = "Invalid credentials"),
        (status = 409, description = "Signup against an existing account")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<ApiResponse<AuthResponse>, SumiError> {
    let mut errors = Vec::new();
    if payload.email.is_empty() || !payload.email.contains('@') {
        errors.push(FieldError::new("email", "must be a valid email address"));
    }
    match payload.mode {
        AuthMode::Signup => {
            let min_len = state.config.min_password_length;
            if payload.password.len() < min_len {
                errors.push(FieldError::new(
                    "password",
                    format!("must be at least {} characters", min_len),
                ));
            }
        }
        AuthMode::Login => {
            if payload.password.is_empty() {
                errors.push(FieldError::new("password", "is required"));
            }
        }
    }
    if !errors.is_empty() {
        return Err(SumiError::validation_fields(errors));
    }

    let user_model = match payload.mode {
        AuthMode::Signup => {
            signup_user(
                &state.db,
                &payload.email,
                &payload.password,
                payload.display_name.as_deref(),
            )
            .await?
        }
        AuthMode::Login => authenticate_user(&state.db, &payload.email, &payload.password)
            .await?
            .ok_or_else(|| SumiError::Unauthorized("Invalid email or password".to_string()))?,
    };

    let session = state
        .user_sessions
        .create(&cookies, &user_model.id.to_string())
        .await?;

    Ok(ApiResponse::success(AuthResponse {
        user: UserResponse::from(user_model),
        expires_at: session.expires_at_ms,
    }))
}

/// Log out. Always succeeds, whether or not a session existed.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Cookie cleared", body = ApiResponse<MessageResponse>)
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<ApiResponse<MessageResponse>, SumiError> {
    state.user_sessions.destroy(&cookies).await?;
    Ok(ApiResponse::success(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

/// The authenticated user's profile. Unlike `/session`, this route sits
/// behind the access guard and 401s when unauthenticated.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Authenticated user", body = ApiResponse<UserResponse>),
        (status = 401, description = "Not authenticated")
    ),
    tag = "auth",
    security(("session_cookie" = []))
)]
pub async fn me(CurrentUser(user): CurrentUser) -> Result<ApiResponse<UserResponse>, SumiError> {
    Ok(ApiResponse::success(UserResponse::from(user)))
}

/// Introspect the current session. Never 401s; an unauthenticated request
/// gets `{"user": null}`.
#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Current session, or user: null", body = ApiResponse<SessionInfo>)
    ),
    tag = "auth"
)]
pub async fn session(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<ApiResponse<SessionInfo>, SumiError> {
    let Some(sess) = state.user_sessions.resolve(&cookies).await? else {
        return Ok(ApiResponse::success(SessionInfo {
            user: None,
            expires_at: None,
        }));
    };

    let user_model = match sess.subject.parse::<i32>() {
        Ok(id) => User::find_by_id(id).one(&state.db).await?,
        Err(_) => None,
    };

    // A session whose user row is gone is treated as unauthenticated.
    match user_model {
        Some(u) => Ok(ApiResponse::success(SessionInfo {
            user: Some(UserResponse::from(u)),
            expires_at: Some(sess.expires_at_ms),
        })),
        None => Ok(ApiResponse::success(SessionInfo {
            user: None,
            expires_at: None,
        })),
    }
}
