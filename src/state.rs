// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::media::MediaUploader;
use crate::storage::ForumDatabase;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<ForumDatabase>,
    pub verifier: TokenVerifier,
    /// `None` when Cloudinary is not configured.
    pub uploader: Option<MediaUploader>,
}

impl AppState {
    pub fn new(db: ForumDatabase, verifier: TokenVerifier) -> Self {
        Self {
            db: Arc::new(db),
            verifier,
            uploader: None,
        }
    }

    pub fn with_uploader(mut self, uploader: MediaUploader) -> Self {
        self.uploader = Some(uploader);
        self
    }
}
