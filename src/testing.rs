use axum::http::HeaderMap;
use axum::Router;
use sea_orm::DatabaseConnection;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::config::{Config, SessionBackendKind};
use crate::controllers::AppState;

/// A test application builder for integration testing.
///
/// Spins up a Sumi server with an in-memory SQLite database.
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_login() {
///     let app = TestApp::new().await;
///     let res = app
///         .client
///         .post(&app.url("/api/auth/login"), r#"{"email":"a@b.com","password":"longenough1","mode":"signup"}"#)
///         .await;
///     assert_eq!(res.status, 200);
/// }
/// ```
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: TestClient,
    pub db: DatabaseConnection,
    pub config: Config,
}

impl TestApp {
    /// The default test configuration: in-memory SQLite, database-backed
    /// user sessions, configured admin pair `admin` / `secret123`.
    pub fn test_config() -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            session_secret: "test-signing-secret".to_string(),
            admin_login_id: Some("admin".to_string()),
            admin_password: Some("secret123".to_string()),
            server_host: "127.0.0.1".to_string(),
            server_port: 0, // OS assigns a random port
            environment: "test".to_string(),
            session_backend: SessionBackendKind::Database,
            user_session_ttl_days: 30,
            admin_session_ttl_days: 7,
            min_password_length: 8,
        }
    }

    /// Create a new test app with the default configuration.
    pub async fn new() -> Self {
        Self::with_config(Self::test_config()).await
    }

    /// Create a new test app using stateless (signed-cookie) user sessions.
    pub async fn new_stateless() -> Self {
        let mut config = Self::test_config();
        config.session_backend = SessionBackendKind::Stateless;
        Self::with_config(config).await
    }

    /// Create a new test app with a custom config.
    pub async fn with_config(config: Config) -> Self {
        Self::with_routes(config, None).await
    }

    /// Create a new test app, optionally merging extra routes (e.g. a page
    /// route behind the redirect guard).
    pub async fn with_routes(config: Config, routes: Option<Router<AppState>>) -> Self {
        let mut app = crate::App::with_config(config.clone())
            .await
            .expect("Failed to create test app");

        if let Some(router) = routes {
            app = app.routes(router);
        }

        let router = app.router();
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Failed to get local addr");

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = TestClient::new(addr);

        TestApp {
            addr,
            client,
            db: app.db,
            config: app.config,
        }
    }

    /// Get the base URL for the test server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// A fresh client with its own empty cookie store.
    pub fn fresh_client(&self) -> TestClient {
        TestClient::new(self.addr)
    }

    /// Sign up an editor account and return the user JSON.
    pub async fn signup(&self, email: &str, password: &str) -> serde_json::Value {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "mode": "signup",
        });

        let res = self
            .client
            .post(&self.url("/api/auth/login"), &body.to_string())
            .await;

        assert_eq!(res.status, 200, "Signup failed: {}", res.body);
        res.data()["user"].clone()
    }

    /// Log in an editor account and return the user JSON.
    pub async fn login(&self, email: &str, password: &str) -> serde_json::Value {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "mode": "login",
        });

        let res = self
            .client
            .post(&self.url("/api/auth/login"), &body.to_string())
            .await;

        assert_eq!(res.status, 200, "Login failed: {}", res.body);
        res.data()["user"].clone()
    }

    /// Log in to the admin console with the test credentials.
    pub async fn admin_login(&self) -> TestResponse {
        let body = serde_json::json!({
            "loginId": "admin",
            "password": "secret123",
        });
        self.client
            .post(&self.url("/api/admin/auth/login"), &body.to_string())
            .await
    }
}

/// A simple HTTP test client with a cookie store.
#[derive(Clone)]
pub struct TestClient {
    inner: reqwest::Client,
    base_addr: SocketAddr,
}

impl TestClient {
    /// Create a new test client pointing at the given address. Cookies are
    /// stored between requests; redirects are not followed (so redirect
    /// guards can be asserted directly).
    pub fn new(addr: SocketAddr) -> Self {
        TestClient {
            inner: reqwest::Client::builder()
                .cookie_store(true)
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .expect("Failed to build test client"),
            base_addr: addr,
        }
    }

    /// Send a GET request.
    pub async fn get(&self, url: &str) -> TestResponse {
        let res = self.inner.get(url).send().await.expect("GET request failed");
        TestResponse::from_response(res).await
    }

    /// Send a GET request with an explicit Cookie header, bypassing the
    /// cookie store (for replaying captured session cookies).
    pub async fn get_with_cookie(&self, url: &str, name: &str, value: &str) -> TestResponse {
        let res = self
            .inner
            .get(url)
            .header("Cookie", format!("{}={}", name, value))
            .send()
            .await
            .expect("GET request failed");
        TestResponse::from_response(res).await
    }

    /// Send a POST request with a JSON body.
    pub async fn post(&self, url: &str, body: &str) -> TestResponse {
        let res = self
            .inner
            .post(url)
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("POST request failed");
        TestResponse::from_response(res).await
    }

    /// Send a POST request with no body.
    pub async fn post_empty(&self, url: &str) -> TestResponse {
        let res = self
            .inner
            .post(url)
            .send()
            .await
            .expect("POST request failed");
        TestResponse::from_response(res).await
    }

    /// Get the base URL.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.base_addr)
    }
}

/// A simplified HTTP response for test assertions.
#[derive(Debug)]
pub struct TestResponse {
    pub status: u16,
    pub body: String,
    pub headers: HeaderMap,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let body = res.text().await.unwrap_or_default();
        TestResponse {
            status,
            body,
            headers,
        }
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Failed to parse response as JSON")
    }

    /// Check if the response indicates success.
    pub fn is_success(&self) -> bool {
        let json = self.json();
        json["success"].as_bool().unwrap_or(false)
    }

    /// Get the data field from the response.
    pub fn data(&self) -> serde_json::Value {
        self.json()["data"].clone()
    }

    /// Get the error field from the response.
    pub fn error(&self) -> serde_json::Value {
        self.json()["error"].clone()
    }

    /// The value of the named cookie from the Set-Cookie header, if present.
    pub fn cookie_value(&self, name: &str) -> Option<String> {
        self.headers.get_all("set-cookie").iter().find_map(|h| {
            let raw = h.to_str().ok()?;
            let pair = raw.split(';').next()?;
            let (cookie_name, value) = pair.split_once('=')?;
            (cookie_name.trim() == name).then(|| value.to_string())
        })
    }

    /// The full Set-Cookie header for the named cookie, attributes included.
    pub fn cookie_header(&self, name: &str) -> Option<String> {
        self.headers.get_all("set-cookie").iter().find_map(|h| {
            let raw = h.to_str().ok()?;
            raw.starts_with(&format!("{}=", name))
                .then(|| raw.to_string())
        })
    }

    /// Whether any Set-Cookie header was sent.
    pub fn sets_cookie(&self, name: &str) -> bool {
        self.cookie_value(name)
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    }
}
