// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Mapping verified claims to local users.

use super::claims::Claims;
use super::error::AuthError;
use crate::storage::{ForumDatabase, User, UserRepository};

/// Find the local user whose external subject is `claims.sub`.
///
/// # Errors
/// `AuthError::UserNotFound` if the identity has never been synced.
pub fn resolve(db: &ForumDatabase, claims: &Claims) -> Result<User, AuthError> {
    UserRepository::new(db)
        .find_by_subject(&claims.sub)
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .ok_or(AuthError::UserNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_claims, test_db};

    #[test]
    fn synced_user_is_resolved() {
        let (db, _dir) = test_db();
        let user = UserRepository::new(&db)
            .sync("auth0|abc123", "alice@example.com", "alice")
            .unwrap()
            .into_user();

        let resolved = resolve(&db, &test_claims("auth0|abc123")).unwrap();
        assert_eq!(resolved, user);
    }

    #[test]
    fn unsynced_subject_is_user_not_found() {
        let (db, _dir) = test_db();
        let repo = UserRepository::new(&db);
        repo.sync("auth0|abc123", "alice@example.com", "alice").unwrap();
        let before = repo.count().unwrap();

        let result = resolve(&db, &test_claims("auth0|stranger"));
        assert_eq!(result, Err(AuthError::UserNotFound));

        assert_eq!(repo.count().unwrap(), before);
        assert_eq!(repo.find_by_subject("auth0|stranger").unwrap(), None);
    }
}
