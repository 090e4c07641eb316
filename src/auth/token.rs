use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{SecurityConfig, TOKEN_ISSUER};

/// Claims carried by a session token.
///
/// Field names follow the registered JWT claim names so any HS256 verifier
/// can read them; `user_id` and `email` are the private identity claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub email: String,
    pub sub: String,
    pub iss: String,
    pub jti: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token signing secret is empty")]
    MissingSecret,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token is not valid yet")]
    Immature,

    #[error("Token is malformed")]
    Malformed,

    #[error("Token generation failed: {0}")]
    Signing(String),
}

/// A freshly signed token plus its expiry, returned to clients on login.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates stateless HS256 session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: &str, lifetime: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime,
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, TokenError> {
        Self::new(&security.jwt_secret, security.token_lifetime())
    }

    /// Sign a token for `subject_id` valid from now until now + lifetime.
    pub fn issue(&self, subject_id: i32, email: &str) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject_id, email, Utc::now())
    }

    /// Sign a token as if it had been issued at `issued_at`.
    pub fn issue_at(
        &self,
        subject_id: i32,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        // Claims carry whole seconds; report the expiry the token actually has
        let iat = issued_at.timestamp();
        let exp = iat + self.lifetime.num_seconds();
        let expires_at = Utc
            .timestamp_opt(exp, 0)
            .single()
            .ok_or_else(|| TokenError::Signing(format!("expiry out of range: {exp}")))?;

        let claims = Claims {
            user_id: subject_id,
            email: email.to_string(),
            sub: subject_id.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            jti: unique_token_id(),
            iat,
            nbf: iat,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify signature, algorithm, issuer and the [nbf, exp] window.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(map_jwt_error)?;

        // `sub` and `user_id` must name the same subject
        if data.claims.sub != data.claims.user_id.to_string() {
            return Err(TokenError::Malformed);
        }

        Ok(data.claims)
    }
}

/// 256 bits from the thread-local CSPRNG, hex encoded.
fn unique_token_id() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

fn map_jwt_error(error: jsonwebtoken::errors::Error) -> TokenError {
    match error.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::ImmatureSignature => TokenError::Immature,
        _ => TokenError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-long-enough";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::hours(24)).unwrap()
    }

    #[test]
    fn issued_token_validates_to_same_subject() {
        let tokens = service();
        let issued = tokens.issue(42, "a@x.com").unwrap();

        let claims = tokens.validate(&issued.token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(claims.nbf, claims.iat);
        assert_eq!(claims.expires_at(), Some(issued.expires_at));
    }

    #[test]
    fn token_has_three_segments() {
        let issued = service().issue(1, "a@x.com").unwrap();
        assert_eq!(issued.token.split('.').count(), 3);
    }

    #[test]
    fn unique_ids_differ_and_carry_256_bits() {
        let tokens = service();
        let a = tokens.validate(&tokens.issue(1, "a@x.com").unwrap().token).unwrap();
        let b = tokens.validate(&tokens.issue(1, "a@x.com").unwrap().token).unwrap();
        assert_ne!(a.jti, b.jti);
        assert_eq!(a.jti.len(), 64);
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = service();
        let issued = tokens
            .issue_at(7, "a@x.com", Utc::now() - Duration::hours(25))
            .unwrap();
        assert_eq!(tokens.validate(&issued.token), Err(TokenError::Expired));
    }

    #[test]
    fn token_from_the_future_is_rejected() {
        let tokens = service();
        let issued = tokens
            .issue_at(7, "a@x.com", Utc::now() + Duration::hours(1))
            .unwrap();
        assert_eq!(tokens.validate(&issued.token), Err(TokenError::Immature));
    }

    #[test]
    fn other_secret_is_rejected() {
        let issued = service().issue(7, "a@x.com").unwrap();
        let other = TokenService::new("a-completely-different-secret", Duration::hours(24)).unwrap();
        assert_eq!(other.validate(&issued.token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn tampered_claims_are_rejected() {
        let tokens = service();
        let issued = tokens.issue(7, "a@x.com").unwrap();
        let forged = tokens.issue(8, "b@x.com").unwrap();

        // Splice the payload of one token onto the signature of another
        let parts: Vec<&str> = issued.token.split('.').collect();
        let forged_parts: Vec<&str> = forged.token.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert_eq!(tokens.validate(&spliced), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn other_algorithms_are_rejected() {
        let claims = Claims {
            user_id: 7,
            email: "a@x.com".into(),
            sub: "7".into(),
            iss: TOKEN_ISSUER.into(),
            jti: "x".into(),
            iat: Utc::now().timestamp(),
            nbf: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(service().validate(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let claims = Claims {
            user_id: 7,
            email: "a@x.com".into(),
            sub: "7".into(),
            iss: "someone-else".into(),
            jti: "x".into(),
            iat: Utc::now().timestamp(),
            nbf: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(service().validate(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(service().validate("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(service().validate(""), Err(TokenError::Malformed));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(
            TokenService::new("", Duration::hours(1)),
            Err(TokenError::MissingSecret)
        ));
    }
}
