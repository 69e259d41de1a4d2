// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for mutating operations.
//!
//! Questions and answers may only be updated or deleted by the user who
//! created them.

use super::repository::User;
use super::{StorageError, StorageResult};

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Plural noun used in denial messages ("questions", "answers").
    const KIND: &'static str;

    /// Local id of the owning user.
    fn owner_id(&self) -> u64;
}

/// Trait for enforcing ownership on storage operations.
pub trait OwnershipEnforcer {
    /// Verify that `user` owns this resource before performing `action`.
    ///
    /// # Errors
    /// Returns `StorageError::PermissionDenied` if the user doesn't own the resource.
    fn verify_ownership(&self, user: &User, action: &str) -> StorageResult<()>;
}

impl<T: OwnedResource> OwnershipEnforcer for T {
    fn verify_ownership(&self, user: &User, action: &str) -> StorageResult<()> {
        if self.owner_id() == user.id {
            Ok(())
        } else {
            Err(StorageError::PermissionDenied(format!(
                "You can only {action} your own {}",
                T::KIND
            )))
        }
    }
}
