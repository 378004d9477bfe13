//! Bearer-token issue and verification.
//!
//! Tokens are HS256 JWTs signed with a process-wide secret that is read-only
//! after construction. Verification checks the signature first and only then
//! the claims window, so an unsigned payload never reaches the expiry check.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use uuid::Uuid;

use stashpad_core::UserId;

use crate::claims::{Claims, TokenValidationError, validate_claims};

/// Verification failure, as exposed to callers.
///
/// The distinction is for operator logging; HTTP surfaces collapse both into
/// a generic unauthorized response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid token")]
    Invalid,

    #[error("token expired")]
    Expired,
}

#[derive(Debug, Error)]
pub enum TokenIssueError {
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Explicit token configuration, passed in at construction.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC secret for signing and verification.
    pub secret: String,

    /// Fixed token lifetime; not re-negotiated per call.
    pub lifetime: Duration,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, lifetime: Duration) -> Self {
        Self {
            secret: secret.into(),
            lifetime,
        }
    }
}

/// Mint and verify bearer tokens for authenticated users.
pub trait TokenService: Send + Sync {
    /// Encode and sign a token for `user_id` with issued-at = now and
    /// expiry = now + the fixed configured lifetime.
    fn issue(&self, user_id: UserId, username: &str) -> Result<String, TokenIssueError>;

    /// Verify signature integrity, then the claims window.
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError>;
}

/// HS256 implementation of [`TokenService`].
pub struct Hs256TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl Hs256TokenService {
    pub fn new(config: TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by validate_claims after signature verification,
        // against a caller-supplied clock.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            lifetime: config.lifetime,
        }
    }
}

impl TokenService for Hs256TokenService {
    fn issue(&self, user_id: UserId, username: &str) -> Result<String, TokenIssueError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            jti: Uuid::now_v7(),
            issued_at: now,
            expires_at: now + self.lifetime,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenIssueError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let decoded = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| AuthError::Invalid)?;

        match validate_claims(&decoded.claims, now) {
            Ok(()) => Ok(decoded.claims),
            Err(TokenValidationError::Expired) => Err(AuthError::Expired),
            Err(_) => Err(AuthError::Invalid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> Hs256TokenService {
        Hs256TokenService::new(TokenConfig::new("test-secret", Duration::minutes(10)))
    }

    #[test]
    fn issue_then_verify_roundtrips_identity() {
        let svc = service();
        let token = svc.issue(UserId::from_i64(42), "alice").unwrap();

        let claims = svc.verify(&token, Utc::now()).unwrap();
        assert_eq!(claims.sub, UserId::from_i64(42));
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn verify_past_lifetime_is_expired() {
        let svc = service();
        let token = svc.issue(UserId::from_i64(7), "bob").unwrap();

        let later = Utc::now() + Duration::minutes(10) + Duration::seconds(1);
        assert_eq!(svc.verify(&token, later), Err(AuthError::Expired));
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let svc = service();
        let token = svc.issue(UserId::from_i64(7), "bob").unwrap();

        let other = Hs256TokenService::new(TokenConfig::new("other-secret", Duration::minutes(10)));
        assert_eq!(other.verify(&token, Utc::now()), Err(AuthError::Invalid));
    }

    #[test]
    fn tampered_token_is_invalid_never_a_wrong_identity() {
        let svc = service();
        let token = svc.issue(UserId::from_i64(7), "bob").unwrap();

        // Flip one character in each JWT segment (header, payload, signature).
        let dot_positions: Vec<usize> = token
            .char_indices()
            .filter(|(_, c)| *c == '.')
            .map(|(i, _)| i)
            .collect();
        for &pos in &[0, dot_positions[0] + 1, dot_positions[1] + 1] {
            let mut bytes = token.clone().into_bytes();
            bytes[pos] = if bytes[pos] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            if tampered == token {
                continue;
            }
            assert_eq!(svc.verify(&tampered, Utc::now()), Err(AuthError::Invalid));
        }
    }

    #[test]
    fn expired_tampered_token_is_invalid_not_expired() {
        // Signature verification comes first; expiry of an unsigned payload
        // must not be observable.
        let svc = service();
        let token = svc.issue(UserId::from_i64(7), "bob").unwrap();
        let mut tampered = token.clone();
        tampered.push('x');

        let later = Utc::now() + Duration::hours(1);
        assert_eq!(svc.verify(&tampered, later), Err(AuthError::Invalid));
    }
}
