// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated requests.
//!
//! `Auth` only verifies the bearer token. `CurrentUser` also resolves the
//! token subject to a local user and is what most handlers want:
//!
//! ```rust,ignore
//! async fn create_question(
//!     State(state): State<AppState>,
//!     CurrentUser(user): CurrentUser,
//!     Json(body): Json<QuestionCreate>,
//! ) -> Result<Json<QuestionResponse>, ApiError> {
//!     // user.id is the local id to store as asker_id
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{identity, AuthError, Claims};
use crate::state::AppState;
use crate::storage::User;

/// Extractor for verified token claims.
pub struct Auth(pub Claims);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Already verified by an earlier extractor on this request
        if let Some(claims) = parts.extensions.get::<Claims>().cloned() {
            return Ok(Auth(claims));
        }

        let token = bearer_token(parts)?;
        let claims = state.verifier.verify(token).await?;

        tracing::debug!(sub = %claims.sub, demo = claims.is_demo(), "Token verified");
        parts.extensions.insert(claims.clone());

        Ok(Auth(claims))
    }
}

/// Extractor for the local user behind the bearer token.
///
/// Rejects with 404 `user_not_found` when the token is valid but the
/// identity has not been synced yet.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(claims) = Auth::from_request_parts(parts, state).await?;
        let user = identity::resolve(&state.db, &claims)?;
        Ok(CurrentUser(user))
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::InvalidAuthHeader)?;

    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}
