// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Routing of incoming tokens to a verification path.
//!
//! Only the unverified header is inspected. Symmetric (HMAC) algorithms can
//! only be self-issued demo tokens, since the provider never shares its
//! secret; every other algorithm goes to external verification, which pins
//! the algorithm and checks the key.

use jsonwebtoken::{decode_header, Algorithm, Header};

use super::error::AuthError;

/// Verification path for a token.
#[derive(Debug, Clone)]
pub enum TokenKind {
    /// Self-issued, HMAC-signed demo token
    Demo,
    /// Provider-issued token; carries the decoded header for key lookup
    External(Header),
}

/// Decide which verifier handles `token`.
///
/// # Errors
/// `AuthError::InvalidTokenHeader` if the header segment cannot be decoded.
pub fn classify(token: &str) -> Result<TokenKind, AuthError> {
    let header = decode_header(token).map_err(|e| {
        tracing::debug!(error = %e, "Undecodable token header");
        AuthError::InvalidTokenHeader
    })?;

    match header.alg {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(TokenKind::Demo),
        _ => Ok(TokenKind::External(header)),
    }
}
