use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tower_cookies::cookie::time::{Duration as CookieDuration, OffsetDateTime};
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};

use crate::auth::token::{SessionClaims, TokenCodec};
use crate::error::SumiError;
use crate::models::{session, user};

/// Session cookie name for the editor app.
pub const USER_SESSION_COOKIE: &str = "sumi_session";

/// Session cookie name for the admin console. Distinct from the editor's so
/// sessions never cross contexts.
pub const ADMIN_SESSION_COOKIE: &str = "sumi_admin_session";

/// A resolved session: proof of a prior successful login.
#[derive(Debug, Clone)]
pub struct Session {
    /// The authenticated principal: admin login id or user id as a string.
    pub subject: String,
    /// Expiry instant, epoch milliseconds.
    pub expires_at_ms: i64,
}

/// The two interchangeable session representations, selected per deployment
/// by configuration.
#[derive(Clone)]
pub enum SessionBackend {
    /// The cookie value is a signed, self-contained token.
    Stateless(TokenCodec),
    /// The cookie value is the id of a persisted session row.
    Database(DatabaseConnection),
}

/// The only component that mints or erases sessions. Owns cookie I/O.
#[derive(Clone)]
pub struct SessionManager {
    backend: SessionBackend,
    cookie_name: &'static str,
    ttl: Duration,
    secure: bool,
}

impl SessionManager {
    pub fn new(
        backend: SessionBackend,
        cookie_name: &'static str,
        ttl_days: i64,
        secure: bool,
    ) -> Self {
        SessionManager {
            backend,
            cookie_name,
            ttl: Duration::days(ttl_days),
            secure,
        }
    }

    /// Mint a session for the given subject and set the session cookie.
    pub async fn create(&self, cookies: &Cookies, subject: &str) -> Result<Session, SumiError> {
        let expires = Utc::now() + self.ttl;

        let cookie_value = match &self.backend {
            SessionBackend::Stateless(codec) => codec.encode(&SessionClaims {
                sub: subject.to_string(),
                exp: expires.timestamp_millis(),
            })?,
            SessionBackend::Database(db) => {
                let user_id: i32 = subject.parse().map_err(|_| {
                    SumiError::Internal("Persisted sessions require a numeric user id".to_string())
                })?;
                let id = generate_session_id();
                let model = session::ActiveModel {
                    id: Set(id.clone()),
                    user_id: Set(user_id),
                    expires_at: Set(expires.naive_utc()),
                    created_at: Set(Utc::now().naive_utc()),
                };
                model.insert(db).await?;
                id
            }
        };

        self.set_cookie(cookies, cookie_value, expires);

        Ok(Session {
            subject: subject.to_string(),
            expires_at_ms: expires.timestamp_millis(),
        })
    }

    /// Resolve the current session from the request's cookies.
    ///
    /// An absent, invalid, tampered, or expired cookie is a normal silent
    /// outcome (`Ok(None)`), never an error. Only store failures propagate.
    /// In the database variant, expired or orphaned rows found here are
    /// deleted on the spot.
    pub async fn resolve(&self, cookies: &Cookies) -> Result<Option<Session>, SumiError> {
        let Some(cookie) = cookies.get(self.cookie_name) else {
            return Ok(None);
        };
        let value = cookie.value();

        match &self.backend {
            SessionBackend::Stateless(codec) => Ok(codec.decode(value).map(|claims| Session {
                subject: claims.sub,
                expires_at_ms: claims.exp,
            })),
            SessionBackend::Database(db) => {
                let Some((row, owner)) = session::Entity::find_by_id(value.to_string())
                    .find_also_related(user::Entity)
                    .one(db)
                    .await?
                else {
                    return Ok(None);
                };

                if row.expires_at <= Utc::now().naive_utc() || owner.is_none() {
                    session::Entity::delete_by_id(row.id).exec(db).await?;
                    return Ok(None);
                }

                Ok(Some(Session {
                    subject: row.user_id.to_string(),
                    expires_at_ms: row.expires_at.and_utc().timestamp_millis(),
                }))
            }
        }
    }

    /// Destroy the current session and clear the cookie. Idempotent: a
    /// missing cookie or already-deleted row is not an error.
    ///
    /// In the stateless variant this is client-side only: a previously
    /// issued signed token remains valid until its natural expiry.
    pub async fn destroy(&self, cookies: &Cookies) -> Result<(), SumiError> {
        if let Some(cookie) = cookies.get(self.cookie_name) {
            if let SessionBackend::Database(db) = &self.backend {
                session::Entity::delete_by_id(cookie.value().to_string())
                    .exec(db)
                    .await?;
            }
        }

        let mut removal = Cookie::new(self.cookie_name.to_string(), String::new());
        removal.set_path("/");
        cookies.remove(removal);
        Ok(())
    }

    fn set_cookie(&self, cookies: &Cookies, value: String, expires: DateTime<Utc>) {
        let mut cookie = Cookie::new(self.cookie_name.to_string(), value);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        if self.secure {
            cookie.set_secure(true);
        }
        cookie.set_max_age(CookieDuration::seconds(self.ttl.num_seconds()));
        if let Ok(ts) = OffsetDateTime::from_unix_timestamp(expires.timestamp()) {
            cookie.set_expires(ts);
        }
        cookies.add(cookie);
    }
}

/// Generate a cryptographically secure random session id (hex-encoded).
fn generate_session_id() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}
