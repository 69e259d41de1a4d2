// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verification of identity-provider-issued tokens.

use jsonwebtoken::{decode, errors::ErrorKind, Header, Validation};

use super::claims::Claims;
use super::error::AuthError;
use super::jwks::KeySetCache;
use super::CLOCK_SKEW_LEEWAY;

/// Verifies asymmetric tokens against the provider's published key set.
#[derive(Clone)]
pub struct ExternalTokenVerifier {
    keys: KeySetCache,
    issuer: String,
    audience: String,
}

impl ExternalTokenVerifier {
    pub fn new(keys: KeySetCache, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    pub fn key_set(&self) -> &KeySetCache {
        &self.keys
    }

    /// Verify `token`, whose header has already been decoded.
    ///
    /// The key is looked up by `kid` and the algorithm is pinned to the one
    /// in the header. Signature, expiry, issuer and audience are all checked.
    pub async fn verify(&self, token: &str, header: &Header) -> Result<Claims, AuthError> {
        let kid = header.kid.as_deref().ok_or(AuthError::MissingKeyId)?;
        let decoding_key = self.keys.decoding_key(kid).await?;

        let mut validation = Validation::new(header.alg);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        // Issuer and audience are only compared when present unless required
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidIssuer => {
                    tracing::warn!("Token issuer mismatch");
                    AuthError::InvalidCredentials
                }
                ErrorKind::InvalidAudience => {
                    tracing::warn!("Token audience mismatch");
                    AuthError::InvalidCredentials
                }
                _ => {
                    tracing::warn!(error = %e, "External token rejected");
                    AuthError::InvalidCredentials
                }
            }
        })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::classifier::{classify, TokenKind};
    use crate::test_support::{
        sign_external, sign_external_with_key, test_claims, test_key_set, TEST_AUDIENCE,
        TEST_ISSUER, TEST_KID,
    };
    use chrono::Utc;
    use serde_json::json;

    fn verifier() -> ExternalTokenVerifier {
        ExternalTokenVerifier::new(
            KeySetCache::with_key_set("unused", test_key_set()),
            TEST_ISSUER,
            TEST_AUDIENCE,
        )
    }

    fn header_of(token: &str) -> Header {
        match classify(token).unwrap() {
            TokenKind::External(header) => header,
            TokenKind::Demo => panic!("expected external token"),
        }
    }

    #[tokio::test]
    async fn valid_token_round_trips_claims() {
        let mut claims = test_claims("auth0|abc123");
        claims.extra.insert("azp".into(), json!("spa-client"));
        let token = sign_external(&claims, Some(TEST_KID));

        let verified = verifier().verify(&token, &header_of(&token)).await.unwrap();
        assert_eq!(verified, claims);
    }

    #[tokio::test]
    async fn audience_may_be_a_list() {
        let mut claims = test_claims("auth0|abc123");
        claims.aud = Some(json!([TEST_AUDIENCE, format!("{TEST_ISSUER}userinfo")]));
        let token = sign_external(&claims, Some(TEST_KID));

        assert!(verifier().verify(&token, &header_of(&token)).await.is_ok());
    }

    #[tokio::test]
    async fn missing_kid_is_rejected() {
        let token = sign_external(&test_claims("auth0|abc123"), None);
        let result = verifier().verify(&token, &header_of(&token)).await;
        assert_eq!(result, Err(AuthError::MissingKeyId));
    }

    #[tokio::test]
    async fn unknown_kid_is_rejected() {
        let token = sign_external(&test_claims("auth0|abc123"), Some("retired-key"));
        let result = verifier().verify(&token, &header_of(&token)).await;
        assert_eq!(result, Err(AuthError::UnknownSigningKey));
    }

    #[tokio::test]
    async fn wrong_signing_key_is_rejected() {
        let token = sign_external_with_key(&test_claims("auth0|abc123"), Some(TEST_KID), true);
        let result = verifier().verify(&token, &header_of(&token)).await;
        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn issuer_mismatch_is_rejected() {
        let mut claims = test_claims("auth0|abc123");
        claims.iss = Some("https://impostor.auth0.com/".into());
        let token = sign_external(&claims, Some(TEST_KID));

        let result = verifier().verify(&token, &header_of(&token)).await;
        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn audience_mismatch_is_rejected() {
        let mut claims = test_claims("auth0|abc123");
        claims.aud = Some(json!("https://other-api.example"));
        let token = sign_external(&claims, Some(TEST_KID));

        let result = verifier().verify(&token, &header_of(&token)).await;
        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn missing_issuer_is_rejected() {
        let mut claims = test_claims("auth0|abc123");
        claims.iss = None;
        let token = sign_external(&claims, Some(TEST_KID));

        let result = verifier().verify(&token, &header_of(&token)).await;
        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn missing_audience_is_rejected() {
        let mut claims = test_claims("auth0|abc123");
        claims.aud = None;
        let token = sign_external(&claims, Some(TEST_KID));

        let result = verifier().verify(&token, &header_of(&token)).await;
        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let mut claims = test_claims("auth0|abc123");
        claims.exp = Utc::now().timestamp() - 3600;
        let token = sign_external(&claims, Some(TEST_KID));

        let result = verifier().verify(&token, &header_of(&token)).await;
        assert_eq!(result, Err(AuthError::TokenExpired));
    }
}
