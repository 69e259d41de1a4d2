// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Demo login.

use axum::{extract::State, Json};

use crate::{
    error::ApiError,
    models::DemoLoginResponse,
    state::AppState,
    storage::{bootstrap::DEMO_USER_SUBJECT, UserRepository},
};

/// Issue a demo token for the shared demo account.
///
/// No credentials are required. The token is valid for 24 hours.
#[utoipa::path(
    post,
    path = "/auth/demo-login",
    tag = "Auth",
    responses(
        (status = 200, description = "Demo token issued", body = DemoLoginResponse),
        (status = 404, description = "Demo user missing"),
    )
)]
pub async fn demo_login(State(state): State<AppState>) -> Result<Json<DemoLoginResponse>, ApiError> {
    let user = UserRepository::new(&state.db)
        .find_by_subject(DEMO_USER_SUBJECT)?
        .ok_or_else(|| ApiError::not_found("Demo user not found"))?;

    let issued = state.verifier.demo().issue(&user).map_err(|e| {
        tracing::error!(error = ?e, "Failed to issue demo token");
        ApiError::internal("Failed to issue demo token")
    })?;

    tracing::info!(user_id = user.id, "Demo login");
    Ok(Json(DemoLoginResponse {
        access_token: issued.token,
        token_type: "Bearer".to_string(),
        expires_in: issued.expires_in,
        user,
    }))
}
