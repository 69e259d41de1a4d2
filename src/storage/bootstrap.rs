// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Startup data required by the demo login flow.

use super::repository::{User, UserRepository};
use super::{StorageError, StorageResult};

/// External subject of the shared demo account.
pub const DEMO_USER_SUBJECT: &str = "demo-user-12345";
pub const DEMO_USER_EMAIL: &str = "demo@questionaura.com";
pub const DEMO_USER_USERNAME: &str = "demo_user";

/// Make sure the demo account exists. Idempotent.
///
/// An existing demo row is left as is. A conflict (the demo email or
/// username taken by another account) is logged and reported.
pub fn ensure_demo_user(db: &super::ForumDatabase) -> StorageResult<User> {
    let repo = UserRepository::new(db);
    if let Some(user) = repo.find_by_subject(DEMO_USER_SUBJECT)? {
        return Ok(user);
    }

    match repo.sync(DEMO_USER_SUBJECT, DEMO_USER_EMAIL, DEMO_USER_USERNAME) {
        Ok(outcome) => {
            let user = outcome.into_user();
            tracing::info!(user_id = user.id, "Created demo user");
            Ok(user)
        }
        Err(StorageError::Conflict(reason)) => {
            tracing::warn!(%reason, "Demo user could not be created");
            Err(StorageError::Conflict(reason))
        }
        Err(e) => Err(e),
    }
}
