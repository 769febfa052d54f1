use serde::Deserialize;

/// Which session representation the editor app uses.
///
/// Admin sessions are always stateless (there is no user row to reference);
/// this only selects the end-user strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackendKind {
    /// Signed, self-contained cookie. No store lookup, no revocation.
    Stateless,
    /// Persisted session row; the cookie value is the row id.
    Database,
}

/// Application configuration loaded from environment variables.
///
/// Resolved once at process start and passed explicitly to the components
/// that need it; nothing reads the environment after startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL (e.g. sqlite://sumi.db, postgres://...)
    pub database_url: String,

    /// Secret for signing stateless session tokens. Required; the process
    /// refuses to start without it.
    pub session_secret: String,

    /// Admin console login id. Absence is a configuration error surfaced
    /// at admin login time, not at startup.
    pub admin_login_id: Option<String>,

    /// Admin console password.
    pub admin_password: Option<String>,

    /// Server host (default: 127.0.0.1)
    pub server_host: String,

    /// Server port (default: 3000)
    pub server_port: u16,

    /// Environment: development, production, test
    pub environment: String,

    /// Session strategy for the editor app (default: database)
    pub session_backend: SessionBackendKind,

    /// End-user session lifetime in days (default: 30)
    pub user_session_ttl_days: i64,

    /// Admin session lifetime in days (default: 7)
    pub admin_session_ttl_days: i64,

    /// Minimum accepted password length at signup (default: 8)
    pub min_password_length: usize,
}

impl Config {
    /// Load configuration from environment variables (with .env support).
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if present (ignore errors if missing)
        let _ = dotenvy::dotenv();

        let session_secret = std::env::var("SESSION_SECRET").map_err(|_| {
            "SESSION_SECRET is not set; refusing to start without a signing secret"
        })?;

        let session_backend = match std::env::var("SESSION_BACKEND")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "" | "database" => SessionBackendKind::Database,
            "stateless" => SessionBackendKind::Stateless,
            other => return Err(format!("Unknown SESSION_BACKEND: {}", other).into()),
        };

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://sumi.db?mode=rwc".to_string()),
            session_secret,
            admin_login_id: std::env::var("ADMIN_LOGIN_ID").ok(),
            admin_password: std::env::var("ADMIN_PASSWORD").ok(),
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            session_backend,
            user_session_ttl_days: std::env::var("USER_SESSION_TTL_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            admin_session_ttl_days: std::env::var("ADMIN_SESSION_TTL_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .unwrap_or(7),
            min_password_length: std::env::var("MIN_PASSWORD_LENGTH")
                .unwrap_or_else(|_| "8".to_string())
                .parse()
                .unwrap_or(8),
        })
    }

    /// Check if running in development mode.
    pub fn is_dev(&self) -> bool {
        self.environment == "development"
    }

    /// Check if running in production mode (controls the Secure cookie flag).
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
