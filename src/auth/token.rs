use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::SumiError;

type HmacSha256 = Hmac<Sha256>;

/// Payload of a stateless session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// The authenticated principal: admin login id or user id.
    pub sub: String,
    /// Expiry instant, epoch milliseconds.
    pub exp: i64,
}

/// Produces and consumes self-contained signed session tokens.
///
/// Token shape: `base64url(claims-json) + "." + hex(hmac-sha256)`.
/// Validity is verifiable from the token alone, with no store lookup, which
/// also means an issued token cannot be revoked before its natural expiry.
#[derive(Clone)]
pub struct TokenCodec {
    key: Vec<u8>,
}

impl TokenCodec {
    /// Create a codec over the configured signing secret.
    pub fn new(secret: &str) -> Self {
        TokenCodec {
            key: secret.as_bytes().to_vec(),
        }
    }

    /// Sign the claims into an opaque token. Deterministic for a given
    /// claims + secret.
    pub fn encode(&self, claims: &SessionClaims) -> Result<String, SumiError> {
        let payload = serde_json::to_vec(claims)
            .map_err(|e| SumiError::Internal(format!("Failed to serialize session claims: {}", e)))?;

        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|_| SumiError::Internal("Invalid session signing key".to_string()))?;
        mac.update(&payload);
        let signature = mac.finalize().into_bytes();

        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            hex::encode(signature)
        ))
    }

    /// Verify and parse a token.
    ///
    /// Malformed shape, bad encoding, signature mismatch, unparseable or
    /// incomplete claims, and expiry all collapse to `None`; callers must
    /// not be able to distinguish which check failed.
    pub fn decode(&self, token: &str) -> Option<SessionClaims> {
        let (payload_b64, signature_hex) = token.split_once('.')?;

        let payload = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
        let supplied = hex::decode(signature_hex).ok()?;

        let mut mac = HmacSha256::new_from_slice(&self.key).ok()?;
        mac.update(&payload);
        let expected = mac.finalize().into_bytes();

        if !constant_time_eq(&expected, &supplied) {
            return None;
        }

        let claims: SessionClaims = serde_json::from_slice(&payload).ok()?;

        if claims.exp <= Utc::now().timestamp_millis() {
            return None;
        }

        Some(claims)
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
