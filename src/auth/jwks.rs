// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity provider key set fetching and caching.
//!
//! The key set is fetched on first use and kept for the life of the
//! process. A failed fetch leaves the cache empty so the next request tries
//! again. Concurrent first requests may each fetch; the last write wins.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet};
use jsonwebtoken::DecodingKey;
use tokio::sync::RwLock;

use super::error::AuthError;

/// Upper bound on a single key set fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Process-wide cache of the provider's published signing keys.
#[derive(Clone)]
pub struct KeySetCache {
    jwks_url: String,
    cache: Arc<RwLock<Option<Arc<JwkSet>>>>,
    client: reqwest::Client,
}

impl KeySetCache {
    /// Create an empty cache for the key set at `jwks_url`.
    pub fn new(jwks_url: impl Into<String>) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            cache: Arc::new(RwLock::new(None)),
            client: reqwest::Client::new(),
        }
    }

    /// Create a cache that is already populated.
    #[cfg(test)]
    pub fn with_key_set(jwks_url: impl Into<String>, key_set: JwkSet) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            cache: Arc::new(RwLock::new(Some(Arc::new(key_set)))),
            client: reqwest::Client::new(),
        }
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Get the key set, fetching it on first use.
    pub async fn get_key_set(&self) -> Result<Arc<JwkSet>, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(key_set) = &*cache {
                return Ok(Arc::clone(key_set));
            }
        }

        let key_set = Arc::new(self.fetch_key_set().await?);
        tracing::info!(
            jwks_url = %self.jwks_url,
            keys = key_set.keys.len(),
            "Fetched signing key set"
        );

        {
            let mut cache = self.cache.write().await;
            *cache = Some(Arc::clone(&key_set));
        }

        Ok(key_set)
    }

    async fn fetch_key_set(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| AuthError::ServiceUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::ServiceUnavailable(format!(
                "HTTP {} from key set endpoint",
                response.status()
            )));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::ServiceUnavailable(e.to_string()))
    }

    /// Get the decoding key published under `kid`.
    pub async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        let key_set = self.get_key_set().await?;

        let jwk = key_set
            .keys
            .iter()
            .find(|k| k.common.key_id.as_deref() == Some(kid))
            .ok_or(AuthError::UnknownSigningKey)?;

        jwk_to_decoding_key(jwk)
    }

    /// Whether the key set has been fetched.
    pub async fn is_cached(&self) -> bool {
        self.cache.read().await.is_some()
    }
}

/// Convert a JWK to a DecodingKey.
fn jwk_to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
            .map_err(|e| {
                tracing::warn!(error = %e, "Unusable RSA key in key set");
                AuthError::InvalidCredentials
            }),
        AlgorithmParameters::EllipticCurve(ec) => DecodingKey::from_ec_components(&ec.x, &ec.y)
            .map_err(|e| {
                tracing::warn!(error = %e, "Unusable EC key in key set");
                AuthError::InvalidCredentials
            }),
        _ => {
            tracing::warn!("Unsupported key type in key set");
            Err(AuthError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{closed_port_url, spawn_jwks_server, test_key_set, TEST_KID};

    #[tokio::test]
    async fn cache_initially_empty() {
        let cache = KeySetCache::new("http://127.0.0.1:9/.well-known/jwks.json");
        assert!(!cache.is_cached().await);
    }

    #[tokio::test]
    async fn key_set_is_fetched_once() {
        let (url, hits) = spawn_jwks_server(test_key_set()).await;
        let cache = KeySetCache::new(url);

        cache.get_key_set().await.unwrap();
        cache.get_key_set().await.unwrap();
        cache.decoding_key(TEST_KID).await.unwrap();

        assert!(cache.is_cached().await);
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_first_fetches_both_succeed() {
        let (url, hits) = spawn_jwks_server(test_key_set()).await;
        let cache = KeySetCache::new(url);

        let (first, second) = tokio::join!(cache.get_key_set(), cache.get_key_set());
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_eq!(first.keys.len(), second.keys.len());
        assert!(cache.is_cached().await);
        assert!(cache.decoding_key(TEST_KID).await.is_ok());
        assert!((1..=2).contains(&hits.load(std::sync::atomic::Ordering::SeqCst)));
    }

    #[tokio::test]
    async fn unknown_kid_is_rejected() {
        let cache = KeySetCache::with_key_set("unused", test_key_set());
        let result = cache.decoding_key("rotated-away").await;
        assert!(matches!(result, Err(AuthError::UnknownSigningKey)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_service_unavailable() {
        let cache = KeySetCache::new(closed_port_url().await);

        let result = cache.get_key_set().await;
        assert!(matches!(result, Err(AuthError::ServiceUnavailable(_))));
        assert!(!cache.is_cached().await);
    }
}
