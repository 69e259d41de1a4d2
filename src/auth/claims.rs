// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verified token claims.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Issuer stamped on self-issued demo tokens.
pub const DEMO_ISSUER: &str = "questionaura-demo";

/// Claims of a verified token, demo or external.
///
/// Known claims are typed; anything else the provider adds (`azp`, `scope`,
/// namespaced custom claims) is kept in `extra` so the claim set round-trips
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: stable external identity of the user
    pub sub: String,

    /// Expiration timestamp
    pub exp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Audience: a string or an array of strings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Value>,

    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Demo marker, only present on self-issued tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Whether this claim set carries `demo: true`.
    pub fn is_demo(&self) -> bool {
        self.demo == Some(true)
    }
}
