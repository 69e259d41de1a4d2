// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Dual-mode token verification.

use super::classifier::{classify, TokenKind};
use super::claims::Claims;
use super::demo::DemoTokenVerifier;
use super::error::AuthError;
use super::external::ExternalTokenVerifier;
use super::jwks::KeySetCache;
use crate::config::AuthSettings;

/// Verifies any bearer token the API accepts.
///
/// Each token is classified by its header and verified by exactly one
/// path; a failure on that path is final.
#[derive(Clone)]
pub struct TokenVerifier {
    demo: DemoTokenVerifier,
    external: ExternalTokenVerifier,
}

impl TokenVerifier {
    pub fn new(settings: &AuthSettings) -> Self {
        let keys = KeySetCache::new(settings.jwks_url.as_str());
        Self::from_parts(
            DemoTokenVerifier::new(&settings.demo_secret, settings.audience.clone()),
            ExternalTokenVerifier::new(keys, settings.issuer.clone(), settings.audience.clone()),
        )
    }

    pub fn from_parts(demo: DemoTokenVerifier, external: ExternalTokenVerifier) -> Self {
        Self { demo, external }
    }

    pub fn demo(&self) -> &DemoTokenVerifier {
        &self.demo
    }

    pub fn external(&self) -> &ExternalTokenVerifier {
        &self.external
    }

    /// Verify `token` and return its claims.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        match classify(token)? {
            TokenKind::Demo => self.demo.verify(token),
            TokenKind::External(header) => self.external.verify(token, &header).await,
        }
    }
}
