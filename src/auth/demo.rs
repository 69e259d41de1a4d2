// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Self-issued demo tokens.
//!
//! Demo tokens are HS256-signed with the server's demo secret and carry
//! `demo: true`. They let visitors use the forum as the shared demo account
//! without an identity provider login.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde_json::{Map, Value};

use super::claims::{Claims, DEMO_ISSUER};
use super::error::AuthError;
use super::CLOCK_SKEW_LEEWAY;
use crate::storage::User;

/// Lifetime of an issued demo token.
pub const DEMO_TOKEN_TTL_HOURS: i64 = 24;

/// An issued demo token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Seconds until expiry
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct DemoTokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    audience: String,
}

impl DemoTokenVerifier {
    pub fn new(secret: &str, audience: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            audience: audience.into(),
        }
    }

    /// Verify a demo token.
    ///
    /// Checks the HS256 signature and expiry and requires `demo: true`.
    /// Issuer and audience are not checked.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_aud = false;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => {
                    tracing::debug!(error = %e, "Demo token rejected");
                    AuthError::InvalidDemoToken
                }
            }
        })?;

        if !data.claims.is_demo() {
            return Err(AuthError::InvalidDemoToken);
        }

        Ok(data.claims)
    }

    /// Issue a demo token for `user`, valid for [`DEMO_TOKEN_TTL_HOURS`].
    pub fn issue(&self, user: &User) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let ttl = Duration::hours(DEMO_TOKEN_TTL_HOURS);

        let claims = Claims {
            sub: user.auth0_id.clone(),
            exp: (now + ttl).timestamp(),
            email: Some(user.email.clone()),
            iss: Some(DEMO_ISSUER.to_string()),
            aud: Some(Value::String(self.audience.clone())),
            iat: Some(now.timestamp()),
            demo: Some(true),
            extra: Map::new(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign demo token: {e}")))?;

        Ok(IssuedToken {
            token,
            expires_in: ttl.num_seconds(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{demo_user, sign_hs256, test_claims, TEST_AUDIENCE, TEST_DEMO_SECRET};
    use serde_json::json;

    fn verifier() -> DemoTokenVerifier {
        DemoTokenVerifier::new(TEST_DEMO_SECRET, TEST_AUDIENCE)
    }

    #[test]
    fn issued_token_verifies() {
        let verifier = verifier();
        let user = demo_user();

        let issued = verifier.issue(&user).unwrap();
        assert_eq!(issued.expires_in, 86_400);

        let claims = verifier.verify(&issued.token).unwrap();
        assert_eq!(claims.sub, user.auth0_id);
        assert_eq!(claims.email.as_deref(), Some(user.email.as_str()));
        assert_eq!(claims.iss.as_deref(), Some(DEMO_ISSUER));
        assert_eq!(claims.aud, Some(json!(TEST_AUDIENCE)));
        assert!(claims.is_demo());
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let mut claims = test_claims("demo-user-12345");
        claims.demo = Some(true);
        let token = sign_hs256(&claims, b"some-other-secret-that-is-long-enough!!");

        assert_eq!(verifier().verify(&token), Err(AuthError::InvalidDemoToken));
    }

    #[test]
    fn missing_demo_marker_is_rejected() {
        let token = sign_hs256(&test_claims("demo-user-12345"), TEST_DEMO_SECRET.as_bytes());
        assert_eq!(verifier().verify(&token), Err(AuthError::InvalidDemoToken));
    }

    #[test]
    fn expired_demo_token_is_rejected() {
        let mut claims = test_claims("demo-user-12345");
        claims.demo = Some(true);
        claims.exp = Utc::now().timestamp() - 3600;
        let token = sign_hs256(&claims, TEST_DEMO_SECRET.as_bytes());

        assert_eq!(verifier().verify(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn issuer_and_audience_are_not_checked() {
        let mut claims = test_claims("demo-user-12345");
        claims.demo = Some(true);
        claims.iss = Some("https://elsewhere.example/".into());
        claims.aud = Some(json!("another-api"));
        let token = sign_hs256(&claims, TEST_DEMO_SECRET.as_bytes());

        assert!(verifier().verify(&token).is_ok());
    }
}
