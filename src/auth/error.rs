// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
///
/// Every variant is terminal for the request. Credential failures map to
/// 401, a key-set fetch failure to 503 and a valid token for an identity
/// that was never synced to 404, so clients can tell "log in again" apart
/// from "sync your account".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Authorization header is not `Bearer <token>`
    InvalidAuthHeader,
    /// Token header could not be decoded
    InvalidTokenHeader,
    /// External token header carries no `kid`
    MissingKeyId,
    /// No key in the key set matches the token's `kid`
    UnknownSigningKey,
    /// Token `exp` is in the past
    TokenExpired,
    /// Demo token failed verification or lacks `demo: true`
    InvalidDemoToken,
    /// External token failed signature or claim validation
    InvalidCredentials,
    /// Key set could not be fetched
    ServiceUnavailable(String),
    /// Token is valid but no local user has its subject
    UserNotFound,
    /// Storage failure while resolving the user
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidTokenHeader => "invalid_token_header",
            AuthError::MissingKeyId => "missing_key_id",
            AuthError::UnknownSigningKey => "unknown_signing_key",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidDemoToken => "invalid_demo_token",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::ServiceUnavailable(_) => "service_unavailable",
            AuthError::UserNotFound => "user_not_found",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidTokenHeader
            | AuthError::MissingKeyId
            | AuthError::UnknownSigningKey
            | AuthError::TokenExpired
            | AuthError::InvalidDemoToken
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Authorization header is required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::InvalidTokenHeader => write!(f, "Invalid token header"),
            AuthError::MissingKeyId => write!(f, "Token header is missing a key identifier"),
            AuthError::UnknownSigningKey => write!(f, "Invalid signing key"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::InvalidDemoToken => write!(f, "Invalid demo token"),
            AuthError::InvalidCredentials => write!(f, "Invalid authentication credentials"),
            AuthError::ServiceUnavailable(_) => {
                write!(f, "Authentication service is temporarily unavailable")
            }
            AuthError::UserNotFound => write!(f, "User not found. Please sync your account."),
            AuthError::Internal(_) => write!(f, "Internal authentication error"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AuthError::ServiceUnavailable(detail) => {
                tracing::error!(%detail, "Key set unavailable");
            }
            AuthError::Internal(detail) => {
                tracing::error!(%detail, "User resolution failed");
            }
            AuthError::UserNotFound => {
                tracing::info!("Verified token has no local user");
            }
            other => {
                tracing::warn!(error_code = other.error_code(), "Authentication rejected");
            }
        }

        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
