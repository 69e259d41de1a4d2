// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! QuestionAura - Question & Answer Forum Service
//!
//! Topics, questions and answers over HTTP, authenticated with either an
//! Auth0-issued RS256/ES256 token or a self-issued HS256 demo token.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Dual-mode JWT verification and identity resolution
//! - `media` - Image uploads to Cloudinary
//! - `storage` - Embedded forum database (redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod media;
pub mod models;
pub mod state;
pub mod storage;
pub mod validation;

#[cfg(test)]
mod test_support;
