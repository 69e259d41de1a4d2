// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    auth::{Auth, CurrentUser},
    error::{ApiError, ApiJson},
    models::UserSyncRequest,
    state::AppState,
    storage::{SyncOutcome, User, UserRepository},
    validation,
};

/// Create or refresh the local user for the bearer token's identity.
///
/// Called by the frontend after every login. Returns 201 when the user is
/// created and 200 when an existing user is updated (email only).
#[utoipa::path(
    post,
    path = "/users/sync",
    tag = "Users",
    security(("bearer" = [])),
    request_body = UserSyncRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 200, description = "User updated", body = User),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Body identity does not match the token"),
        (status = 409, description = "Email or username already in use"),
        (status = 422, description = "Invalid email or username"),
    )
)]
pub async fn sync_user(
    State(state): State<AppState>,
    Auth(claims): Auth,
    ApiJson(request): ApiJson<UserSyncRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    if request.auth0_id != claims.sub {
        tracing::warn!(sub = %claims.sub, "Sync body identity does not match token");
        return Err(ApiError::forbidden("Invalid authentication credentials"));
    }

    let email = validation::email(&request.email)?;
    let username = validation::username(&request.username)?;

    let outcome = UserRepository::new(&state.db).sync(&claims.sub, &email, &username)?;
    match outcome {
        SyncOutcome::Created(user) => {
            tracing::info!(user_id = user.id, "Created user");
            Ok((StatusCode::CREATED, Json(user)))
        }
        SyncOutcome::Updated(user) => Ok((StatusCode::OK, Json(user))),
    }
}

/// Get the current user.
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User information", body = User),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "User not synced yet"),
    )
)]
pub async fn get_current_user(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
