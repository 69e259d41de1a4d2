// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Image uploads to Cloudinary.
//!
//! Uploads use Cloudinary's signed upload API: the folder and timestamp are
//! signed with the account's API secret (SHA-256) and posted together with
//! the file as multipart form data. The returned `secure_url` is what the
//! forum stores in `image_url` fields.

use std::time::Duration;

use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::config::CloudinarySettings;

pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";

/// Folder every upload is placed in.
pub const UPLOAD_FOLDER: &str = "questionaura";

/// Maximum accepted image size (5 MB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid file type '{0}'. Allowed types: image/jpeg, image/jpg, image/png, image/gif, image/webp")]
    UnsupportedType(String),

    #[error("File size exceeds maximum allowed size of {}MB", .max_bytes / (1024 * 1024))]
    TooLarge { max_bytes: usize },

    #[error("Uploaded file is empty")]
    Empty,

    #[error("Image uploads are not configured")]
    NotConfigured,

    #[error("upload failed: {0}")]
    Upstream(String),
}

/// Check an incoming file against the accepted types and size.
pub fn check_image(content_type: Option<&str>, len: usize) -> Result<(), UploadError> {
    let content_type = content_type.unwrap_or_default();
    if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
        return Err(UploadError::UnsupportedType(content_type.to_string()));
    }
    if len == 0 {
        return Err(UploadError::Empty);
    }
    if len > MAX_IMAGE_BYTES {
        return Err(UploadError::TooLarge {
            max_bytes: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

#[derive(Deserialize)]
struct UploadResult {
    secure_url: String,
}

#[derive(Clone)]
pub struct MediaUploader {
    settings: CloudinarySettings,
    api_base: String,
    client: reqwest::Client,
}

impl MediaUploader {
    pub fn new(settings: CloudinarySettings) -> Self {
        Self {
            settings,
            api_base: DEFAULT_API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the uploader at another API host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            self.api_base, self.settings.cloud_name
        )
    }

    /// Upload an image and return its public HTTPS URL.
    pub async fn upload_image(
        &self,
        bytes: Vec<u8>,
        file_name: String,
        content_type: &str,
    ) -> Result<String, UploadError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("folder", UPLOAD_FOLDER), ("timestamp", &timestamp)],
            &self.settings.api_secret,
        );

        let file = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(content_type)
            .map_err(|e| UploadError::Upstream(e.to_string()))?;

        let form = Form::new()
            .text("api_key", self.settings.api_key.clone())
            .text("folder", UPLOAD_FOLDER)
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256")
            .text("signature", signature)
            .part("file", file);

        let response = self
            .client
            .post(self.upload_url())
            .timeout(UPLOAD_TIMEOUT)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(UploadError::Upstream(format!(
                "HTTP {} from media host",
                response.status()
            )));
        }

        let result: UploadResult = response
            .json()
            .await
            .map_err(|e| UploadError::Upstream(e.to_string()))?;

        tracing::info!(url = %result.secure_url, "Uploaded image");
        Ok(result.secure_url)
    }
}

/// Cloudinary request signature: parameters sorted by name, joined as
/// `k=v&k=v`, with the API secret appended, hashed with SHA-256.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!("{:x}", Sha256::digest(format!("{to_sign}{api_secret}").as_bytes()))
}
