//! Access token issuance and validation

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Username of the authenticated user
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token has no subject")]
    MissingSubject,

    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed(e.to_string()),
        }
    }
}

/// Signs and verifies HS256 bearer tokens with a shared secret
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, default_ttl: Duration) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // exp is compared strictly against the current time
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            default_ttl,
        }
    }

    /// Issue a token for `subject` expiring after `ttl` (or the default ttl)
    pub fn issue(&self, subject: &str, ttl: Option<Duration>) -> Result<String, TokenError> {
        if subject.is_empty() {
            return Err(TokenError::MissingSubject);
        }

        let now = Utc::now();
        let claims = AccessClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl.unwrap_or(self.default_ttl)).timestamp(),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning the embedded claims
    pub fn verify(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)?;
        if data.claims.sub.is_empty() {
            return Err(TokenError::MissingSubject);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", Duration::minutes(15))
    }

    #[test]
    fn test_issue_then_verify_returns_subject() {
        let tokens = service();
        let before = Utc::now().timestamp();
        let token = tokens.issue("testuser", None).unwrap();
        let claims = tokens.verify(&token).unwrap();
        let after = Utc::now().timestamp();

        assert_eq!(claims.sub, "testuser");
        assert!(claims.exp >= before + 14 * 60);
        assert!(claims.exp <= after + 15 * 60);
    }

    #[test]
    fn test_custom_ttl() {
        let tokens = service();
        let token = tokens.issue("testuser", Some(Duration::minutes(1))).unwrap();
        let claims = tokens.verify(&token).unwrap();
        let now = Utc::now().timestamp();

        assert!(claims.exp > now - 1);
        assert!(claims.exp <= now + 60);
    }

    #[test]
    fn test_negative_ttl_is_rejected_as_expired() {
        let tokens = service();
        let token = tokens.issue("testuser", Some(Duration::seconds(-1))).unwrap();
        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_missing_subject_fails_fast() {
        assert!(matches!(
            service().issue("", None),
            Err(TokenError::MissingSubject)
        ));
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let tokens = service();
        for token in ["", "invalid.token.string", "a.b", "....", "Bearer xyz"] {
            assert!(tokens.verify(token).is_err(), "accepted {:?}", token);
        }
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let other = TokenService::new("another-secret", Duration::minutes(15));
        let token = other.issue("testuser", None).unwrap();
        assert!(matches!(
            service().verify(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let claims = AccessClaims {
            sub: "testuser".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(service().verify(&token).is_err());
    }
}
