//! Credential hashing and session token issuance.
//!
//! Two stateless building blocks used by the application layer:
//! - argon2id password hashing (salted, so the same secret hashes
//!   differently on every call)
//! - HS256 JWTs carrying the user id and an absolute expiry

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use spiderpay_types::{AppError, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// Password hashing
// ─────────────────────────────────────────────────────────────────────────────

/// Hashes a plaintext password with argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verifies a plaintext password against a stored hash.
///
/// Returns false (never errors) for malformed hash strings, so a corrupt
/// row can't be used to bypass verification.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

// ─────────────────────────────────────────────────────────────────────────────
// Session tokens
// ─────────────────────────────────────────────────────────────────────────────

/// JWT claims: subject user id plus issued-at/expiry timestamps.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies signed, time-bounded session tokens.
///
/// Built explicitly from the configured signing secret at startup and
/// injected where needed - never a hidden global.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    /// Default session lifetime.
    pub const DEFAULT_TTL_MINUTES: i64 = 30;

    /// Creates an issuer with the given secret and token lifetime.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            ttl,
        }
    }

    /// Creates an issuer with the default 30-minute lifetime.
    pub fn with_default_ttl(secret: &[u8]) -> Self {
        Self::new(secret, Duration::minutes(Self::DEFAULT_TTL_MINUTES))
    }

    /// Issues a token for the given user, expiring `ttl` from now.
    pub fn issue(&self, user_id: UserId) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Recovers the user id from a token, or None if the token is
    /// malformed, tampered with, or expired.
    pub fn verify(&self, token: &str) -> Option<UserId> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).ok()?;
        data.claims.sub.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let a = hash_password("secret123").unwrap();
        let b = hash_password("secret123").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("secret123", &a));
        assert!(verify_password("secret123", &b));
    }

    #[test]
    fn test_malformed_hash_verifies_false() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn test_token_round_trip() {
        let issuer = TokenIssuer::with_default_ttl(b"test-secret");
        let user_id = UserId::new();

        let token = issuer.issue(user_id).unwrap();
        assert_eq!(issuer.verify(&token), Some(user_id));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Expiry far enough in the past to clear the default leeway.
        let issuer = TokenIssuer::new(b"test-secret", Duration::hours(-1));
        let token = issuer.issue(UserId::new()).unwrap();

        assert_eq!(issuer.verify(&token), None);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenIssuer::with_default_ttl(b"secret-a");
        let other = TokenIssuer::with_default_ttl(b"secret-b");

        let token = issuer.issue(UserId::new()).unwrap();
        assert_eq!(other.verify(&token), None);
    }

    #[test]
    fn test_garbage_token_rejected() {
        let issuer = TokenIssuer::with_default_ttl(b"test-secret");
        assert_eq!(issuer.verify("not.a.token"), None);
        assert_eq!(issuer.verify(""), None);
    }
}
