//! Access guard: the single chokepoint protected operations pass through.
//!
//! API handlers take [`CurrentUser`] or [`AdminUser`] as an argument; an
//! unauthenticated request is rejected with 401 before the handler body
//! runs. Page-rendering routes use [`require_login_or_redirect`] instead,
//! which answers with a redirect to the login surface.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use sea_orm::EntityTrait;
use tower_cookies::Cookies;

use crate::controllers::AppState;
use crate::error::SumiError;
use crate::models::user::{self, Entity as User};

/// Extractor that resolves the editor session and loads the user row.
///
/// Rejects with 401 when the session is absent, invalid, expired, or its
/// user row no longer exists, indistinguishably, so nothing about which
/// check failed leaks to the caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub user::Model);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = SumiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = app_state(parts)?;
        let cookies = cookies(parts, state).await?;

        let session = app
            .user_sessions
            .resolve(&cookies)
            .await?
            .ok_or_else(unauthenticated)?;

        let user_id: i32 = session.subject.parse().map_err(|_| unauthenticated())?;

        let user_model = User::find_by_id(user_id)
            .one(&app.db)
            .await?
            .ok_or_else(unauthenticated)?;

        Ok(CurrentUser(user_model))
    }
}

/// Extractor that resolves the admin session, yielding the admin login id.
#[derive(Debug, Clone)]
pub struct AdminUser(pub String);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = SumiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = app_state(parts)?;
        let cookies = cookies(parts, state).await?;

        let session = app
            .admin_sessions
            .resolve(&cookies)
            .await?
            .ok_or_else(unauthenticated)?;

        Ok(AdminUser(session.subject))
    }
}

/// Middleware guard for page-rendering routes: redirects unauthenticated
/// requests to the given login path instead of returning 401.
///
/// # Usage
///
/// ```rust,ignore
/// Router::new()
///     .route("/editor", get(editor_page))
///     .route_layer(axum::middleware::from_fn(require_login_or_redirect("/login")))
/// ```
pub fn require_login_or_redirect(
    login_path: &'static str,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<
    Box<dyn std::future::Future<Output = Result<Response, SumiError>> + Send>,
> + Clone
       + Send {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let app = req
                .extensions()
                .get::<AppState>()
                .cloned()
                .ok_or_else(|| SumiError::Internal("App state not found in request".to_string()))?;
            let cookies = req
                .extensions()
                .get::<Cookies>()
                .cloned()
                .ok_or_else(|| SumiError::Internal("Cookie layer not installed".to_string()))?;

            match app.user_sessions.resolve(&cookies).await? {
                Some(_) => Ok(next.run(req).await),
                None => Ok(Redirect::to(login_path).into_response()),
            }
        })
    }
}

fn app_state(parts: &Parts) -> Result<AppState, SumiError> {
    parts
        .extensions
        .get::<AppState>()
        .cloned()
        .ok_or_else(|| SumiError::Internal("App state not found in request".to_string()))
}

async fn cookies<S: Send + Sync>(parts: &mut Parts, state: &S) -> Result<Cookies, SumiError> {
    Cookies::from_request_parts(parts, state)
        .await
        .map_err(|_| SumiError::Internal("Cookie layer not installed".to_string()))
}

fn unauthenticated() -> SumiError {
    SumiError::Unauthorized("Authentication required".to_string())
}
