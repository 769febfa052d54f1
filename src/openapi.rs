use utoipa::OpenApi;

use crate::controllers::admin::{
    AdminAuthResponse, AdminLoginRequest, AdminPrincipal, AdminSessionInfo,
};
use crate::controllers::auth::{AuthResponse, LoginRequest, MessageResponse, SessionInfo};
use crate::models::user::UserResponse;

/// OpenAPI documentation for the Sumi backend.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sumi API",
        version = "0.1.0",
        description = "Backend for the Sumi vertical-text editor and its admin console."
    ),
    paths(
        crate::controllers::auth::login,
        crate::controllers::auth::logout,
        crate::controllers::auth::session,
        crate::controllers::auth::me,
        crate::controllers::admin::login,
        crate::controllers::admin::logout,
        crate::controllers::admin::session,
        crate::controllers::admin::me,
    ),
    components(
        schemas(
            LoginRequest,
            AuthResponse,
            SessionInfo,
            MessageResponse,
            AdminLoginRequest,
            AdminAuthResponse,
            AdminPrincipal,
            AdminSessionInfo,
            UserResponse,
        )
    ),
    tags(
        (name = "auth", description = "Editor authentication endpoints"),
        (name = "admin", description = "Admin console authentication endpoints")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add the session-cookie security schemes to the OpenAPI spec.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    crate::auth::USER_SESSION_COOKIE,
                ))),
            );
            components.add_security_scheme(
                "admin_session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    crate::auth::ADMIN_SESSION_COOKIE,
                ))),
            );
        }
    }
}
