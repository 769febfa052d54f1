use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::auth::password::{hash_password, verify_password};
use crate::error::SumiError;
use crate::models::user::{self, Entity as User};

/// The configured single-account credentials for the admin console.
///
/// Compared by exact equality; there are no admin rows in the store.
#[derive(Clone)]
pub struct AdminCredentials {
    login_id: Option<String>,
    password: Option<String>,
}

impl AdminCredentials {
    pub fn new(login_id: Option<String>, password: Option<String>) -> Self {
        AdminCredentials { login_id, password }
    }

    /// Check a login attempt against the configured pair.
    ///
    /// An unconfigured pair is a deployment error, not a failed login. It
    /// surfaces as a 500-class configuration error so it cannot be mistaken
    /// for "wrong password."
    pub fn validate(&self, login_id: &str, password: &str) -> Result<bool, SumiError> {
        let (expected_id, expected_password) = match (&self.login_id, &self.password) {
            (Some(id), Some(pw)) => (id, pw),
            _ => {
                return Err(SumiError::Internal(
                    "Admin credentials are not configured".to_string(),
                ))
            }
        };

        let id_ok = eq_constant_time(expected_id.as_bytes(), login_id.as_bytes());
        let pw_ok = eq_constant_time(expected_password.as_bytes(), password.as_bytes());
        Ok(id_ok && pw_ok)
    }
}

// Constant-time comparison to prevent timing attacks.
fn eq_constant_time(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Authenticate an editor account by email + password.
///
/// Returns `None` for an unknown email, an account without a password set,
/// or a wrong password, identically, so callers cannot reveal whether the
/// account exists.
pub async fn authenticate_user(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<Option<user::Model>, SumiError> {
    let user_model = match User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?
    {
        Some(u) => u,
        None => return Ok(None),
    };

    let Some(ref stored_hash) = user_model.password_hash else {
        return Ok(None);
    };

    if verify_password(password, stored_hash)? {
        Ok(Some(user_model))
    } else {
        Ok(None)
    }
}

/// Create an editor account, or set the password on an existing
/// password-less one.
///
/// An account that already has a password is a conflict.
pub async fn signup_user(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
    display_name: Option<&str>,
) -> Result<user::Model, SumiError> {
    let now = Utc::now().naive_utc();
    let password_hash = hash_password(password)?;

    let existing = User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;

    match existing {
        Some(u) if u.password_hash.is_some() => Err(SumiError::Conflict(
            "An account with this email already exists".to_string(),
        )),
        Some(u) => {
            // Upgrade: the account predates choosing a password.
            let mut active: user::ActiveModel = u.into();
            active.password_hash = Set(Some(password_hash));
            if let Some(name) = display_name {
                active.display_name = Set(Some(name.to_string()));
            }
            active.updated_at = Set(now);
            Ok(active.update(db).await?)
        }
        None => {
            let new_user = user::ActiveModel {
                email: Set(email.to_string()),
                password_hash: Set(Some(password_hash)),
                display_name: Set(display_name.map(|n| n.to_string())),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            Ok(new_user.insert(db).await?)
        }
    }
}
