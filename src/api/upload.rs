// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Image upload passthrough.

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::{
    auth::CurrentUser,
    error::ApiError,
    media::{check_image, UploadError},
    models::UploadResponse,
    state::AppState,
};

/// Upload an image and return its public URL.
///
/// Expects a multipart form with a `file` field holding a JPEG, PNG, GIF or
/// WebP image of at most 5 MB.
#[utoipa::path(
    post,
    path = "/upload/image",
    tag = "Upload",
    security(("bearer" = [])),
    request_body(content_type = "multipart/form-data", description = "Form with a `file` field"),
    responses(
        (status = 200, description = "Image uploaded", body = UploadResponse),
        (status = 400, description = "Missing file, unsupported type or too large"),
        (status = 500, description = "Media host rejected the upload"),
        (status = 503, description = "Uploads not configured"),
    )
)]
pub async fn upload_image(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let uploader = state.uploader.as_ref().ok_or(UploadError::NotConfigured)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;

        check_image(content_type.as_deref(), bytes.len())?;

        let url = uploader
            .upload_image(bytes.to_vec(), file_name, content_type.as_deref().unwrap_or_default())
            .await?;
        tracing::info!(user_id = user.id, "Image uploaded");
        return Ok(Json(UploadResponse { url }));
    }

    Err(ApiError::bad_request("Missing 'file' field"))
}
