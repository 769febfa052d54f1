use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Router};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use serde::Serialize;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::auth::credentials::AdminCredentials;
use crate::auth::session::{SessionBackend, SessionManager};
use crate::auth::token::TokenCodec;
use crate::auth::{ADMIN_SESSION_COOKIE, USER_SESSION_COOKIE};
use crate::config::{Config, SessionBackendKind};
use crate::controllers::{self, AppState};
use crate::migrations::Migrator;
use crate::openapi::ApiDoc;

/// The Sumi application: configuration, database, and the HTTP surface.
pub struct App {
    pub config: Config,
    pub db: DatabaseConnection,
    custom_routes: Vec<Router<AppState>>,
}

impl App {
    /// Create the application from environment configuration.
    ///
    /// Fails (refuses to serve) when `SESSION_SECRET` is absent.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::from_env()?;
        Self::with_config(config).await
    }

    /// Create the application with a given config.
    pub async fn with_config(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let db = crate::db::connect(&config).await?;

        tracing::info!("Running pending database migrations...");
        Migrator::up(&db, None).await?;
        tracing::info!("Migrations complete.");

        Ok(App {
            config,
            db,
            custom_routes: Vec::new(),
        })
    }

    /// Merge a custom router (e.g. page routes behind the redirect guard)
    /// into the application.
    pub fn routes(mut self, router: Router<AppState>) -> Self {
        self.custom_routes.push(router);
        self
    }

    /// Build the Axum router.
    pub fn router(&self) -> Router {
        let config = Arc::new(self.config.clone());
        let is_dev = self.config.is_dev();
        let secure = self.config.is_production();

        let codec = TokenCodec::new(&self.config.session_secret);

        let user_backend = match self.config.session_backend {
            SessionBackendKind::Stateless => SessionBackend::Stateless(codec.clone()),
            SessionBackendKind::Database => SessionBackend::Database(self.db.clone()),
        };
        let user_sessions = SessionManager::new(
            user_backend,
            USER_SESSION_COOKIE,
            self.config.user_session_ttl_days,
            secure,
        );
        // Admin sessions are always stateless: a single configured principal,
        // nothing to look up.
        let admin_sessions = SessionManager::new(
            SessionBackend::Stateless(codec),
            ADMIN_SESSION_COOKIE,
            self.config.admin_session_ttl_days,
            secure,
        );

        let state = AppState {
            db: self.db.clone(),
            config: config.clone(),
            admin_credentials: AdminCredentials::new(
                self.config.admin_login_id.clone(),
                self.config.admin_password.clone(),
            ),
            user_sessions,
            admin_sessions,
        };

        let mut router = Router::new()
            .route("/", get(welcome))
            .nest("/api/auth", controllers::auth::routes())
            .nest("/api/admin/auth", controllers::admin::routes());

        for custom in &self.custom_routes {
            router = router.merge(custom.clone());
        }

        let openapi_spec = ApiDoc::openapi();
        let openapi_spec_clone = openapi_spec.clone();

        let mut router = router
            .with_state(state.clone())
            .merge(Scalar::with_url("/api-docs", openapi_spec))
            .route(
                "/api-docs/openapi.json",
                get(move || {
                    let spec = openapi_spec_clone.clone();
                    async move { axum::Json(spec) }
                }),
            )
            .layer(Extension(state))
            .layer(CookieManagerLayer::new())
            .layer(CorsLayer::permissive());

        // Only add expensive tracing/request-id middleware in development mode.
        if is_dev {
            use tower_http::trace::DefaultMakeSpan;
            use tower_http::trace::DefaultOnRequest;
            use tower_http::trace::DefaultOnResponse;
            use tower_http::LatencyUnit;

            let x_request_id = axum::http::HeaderName::from_static("x-request-id");
            router = router
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                        .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                        .on_response(
                            DefaultOnResponse::new()
                                .level(tracing::Level::INFO)
                                .latency_unit(LatencyUnit::Millis),
                        ),
                );
        }

        router
    }

    /// Run the application server until ctrl-c.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.config.server_addr();
        let router = self.router();

        tracing::info!("Sumi server running on http://{}", addr);
        tracing::info!("API docs at http://{}/api-docs", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutting down Sumi server...");
}

#[derive(Serialize)]
struct WelcomeMessage {
    message: &'static str,
    docs: &'static str,
    status: &'static str,
}

/// Welcome page at `/`.
async fn welcome() -> impl IntoResponse {
    axum::Json(WelcomeMessage {
        message: "Welcome to Sumi",
        docs: "/api-docs",
        status: "running",
    })
}
