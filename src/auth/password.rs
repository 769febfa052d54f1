//! Password hashing for editor accounts.
//!
//! Argon2id with the crate defaults, a per-password random salt, and PHC
//! string storage. This clears the usual "bcrypt, cost 10 or better" bar
//! for stored credentials; the admin console never comes through here, its
//! configured pair is compared directly in [`credentials`](super::credentials).

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::SumiError;

/// Hash a plaintext password. The salt is folded into the returned PHC
/// string, so two hashes of the same password never match.
pub fn hash_password(password: &str) -> Result<String, SumiError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| SumiError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, SumiError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| SumiError::Internal(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
