// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! Users are materialized from verified token claims by the sync operation
//! and looked up by their external subject on every authenticated request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::database::{
    get_row, index_lookup, next_id, put_row, ForumDatabase, USERS, USERS_BY_EMAIL,
    USERS_BY_SUBJECT, USERS_BY_USERNAME,
};
use super::super::{StorageError, StorageResult};

const USER_SEQUENCE: &str = "users";

/// Local user record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct User {
    /// Local numeric identifier
    pub id: u64,
    /// External identity provider subject (`sub` claim)
    pub auth0_id: String,
    /// Lower-cased email address
    pub email: String,
    /// Lower-cased username, immutable after creation
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Created(User),
    Updated(User),
}

impl SyncOutcome {
    pub fn user(&self) -> &User {
        match self {
            SyncOutcome::Created(user) | SyncOutcome::Updated(user) => user,
        }
    }

    pub fn into_user(self) -> User {
        match self {
            SyncOutcome::Created(user) | SyncOutcome::Updated(user) => user,
        }
    }
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    db: &'a ForumDatabase,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a ForumDatabase) -> Self {
        Self { db }
    }

    /// Get a user by local id.
    pub fn get(&self, user_id: u64) -> StorageResult<User> {
        let read_txn = self.db.begin_read()?;
        let users = read_txn.open_table(USERS)?;
        get_row(&users, user_id)?.ok_or_else(|| StorageError::NotFound("User".to_string()))
    }

    /// Find a user by external subject. Never mutates.
    pub fn find_by_subject(&self, subject: &str) -> StorageResult<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let by_subject = read_txn.open_table(USERS_BY_SUBJECT)?;
        let Some(user_id) = index_lookup(&by_subject, subject)? else {
            return Ok(None);
        };
        let users = read_txn.open_table(USERS)?;
        get_row(&users, user_id)
    }

    /// Number of stored users.
    pub fn count(&self) -> StorageResult<u64> {
        use redb::ReadableTableMetadata;

        let read_txn = self.db.begin_read()?;
        let users = read_txn.open_table(USERS)?;
        Ok(users.len()?)
    }

    /// Create or update the user identified by `subject`.
    ///
    /// New users get the given email and username. Existing users only have
    /// their email refreshed; the username is immutable. Email and username
    /// must be unique across all users.
    pub fn sync(&self, subject: &str, email: &str, username: &str) -> StorageResult<SyncOutcome> {
        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut users = write_txn.open_table(USERS)?;
            let mut by_subject = write_txn.open_table(USERS_BY_SUBJECT)?;
            let mut by_email = write_txn.open_table(USERS_BY_EMAIL)?;
            let mut by_username = write_txn.open_table(USERS_BY_USERNAME)?;

            let now = Utc::now();
            let existing_id = index_lookup(&by_subject, subject)?;

            match existing_id {
                Some(user_id) => {
                    let mut user: User = get_row(&users, user_id)?
                        .ok_or_else(|| StorageError::NotFound("User".to_string()))?;

                    if user.email != email {
                        if let Some(owner) = index_lookup(&by_email, email)? {
                            if owner != user_id {
                                return Err(StorageError::Conflict(
                                    "Email is already registered".to_string(),
                                ));
                            }
                        }
                        by_email.remove(user.email.as_str())?;
                        by_email.insert(email, user_id)?;
                        user.email = email.to_string();
                        user.updated_at = now;
                        put_row(&mut users, user_id, &user)?;
                    }

                    SyncOutcome::Updated(user)
                }
                None => {
                    if index_lookup(&by_email, email)?.is_some() {
                        return Err(StorageError::Conflict(
                            "Email is already registered".to_string(),
                        ));
                    }
                    if index_lookup(&by_username, username)?.is_some() {
                        return Err(StorageError::Conflict(
                            "Username is already taken".to_string(),
                        ));
                    }

                    let user_id = next_id(&write_txn, USER_SEQUENCE)?;
                    let user = User {
                        id: user_id,
                        auth0_id: subject.to_string(),
                        email: email.to_string(),
                        username: username.to_string(),
                        created_at: now,
                        updated_at: now,
                    };
                    put_row(&mut users, user_id, &user)?;
                    by_subject.insert(subject, user_id)?;
                    by_email.insert(email, user_id)?;
                    by_username.insert(username, user_id)?;

                    SyncOutcome::Created(user)
                }
            }
        };
        write_txn.commit()?;

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_db() -> (ForumDatabase, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db = ForumDatabase::open(&dir.path().join("forum.redb")).expect("open db");
        (db, dir)
    }

    #[test]
    fn sync_creates_then_finds_by_subject() {
        let (db, _dir) = test_db();
        let repo = UserRepository::new(&db);

        let outcome = repo
            .sync("auth0|abc", "alice@example.com", "alice")
            .unwrap();
        let created = match outcome {
            SyncOutcome::Created(user) => user,
            other => panic!("expected creation, got {other:?}"),
        };
        assert_eq!(created.id, 1);

        let found = repo.find_by_subject("auth0|abc").unwrap();
        assert_eq!(found, Some(created.clone()));
        assert_eq!(repo.get(created.id).unwrap(), created);
    }

    #[test]
    fn find_by_unknown_subject_returns_none() {
        let (db, _dir) = test_db();
        let repo = UserRepository::new(&db);
        assert_eq!(repo.find_by_subject("nobody").unwrap(), None);
        assert!(matches!(repo.get(42), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn resync_updates_email_but_not_username() {
        let (db, _dir) = test_db();
        let repo = UserRepository::new(&db);
        repo.sync("auth0|abc", "alice@example.com", "alice").unwrap();

        let outcome = repo
            .sync("auth0|abc", "alice@new.example.com", "someone-else")
            .unwrap();
        let updated = match outcome {
            SyncOutcome::Updated(user) => user,
            other => panic!("expected update, got {other:?}"),
        };
        assert_eq!(updated.email, "alice@new.example.com");
        assert_eq!(updated.username, "alice");

        // The old email is free again.
        repo.sync("auth0|other", "alice@example.com", "bob").unwrap();
        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn duplicate_email_conflicts() {
        let (db, _dir) = test_db();
        let repo = UserRepository::new(&db);
        repo.sync("auth0|one", "shared@example.com", "one").unwrap();

        let result = repo.sync("auth0|two", "shared@example.com", "two");
        assert!(matches!(result, Err(StorageError::Conflict(_))));
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn duplicate_username_conflicts() {
        let (db, _dir) = test_db();
        let repo = UserRepository::new(&db);
        repo.sync("auth0|one", "one@example.com", "taken").unwrap();

        let result = repo.sync("auth0|two", "two@example.com", "taken");
        assert!(matches!(result, Err(StorageError::Conflict(msg)) if msg.contains("Username")));
    }

    #[test]
    fn email_change_to_taken_address_conflicts() {
        let (db, _dir) = test_db();
        let repo = UserRepository::new(&db);
        repo.sync("auth0|one", "one@example.com", "one").unwrap();
        repo.sync("auth0|two", "two@example.com", "two").unwrap();

        let result = repo.sync("auth0|two", "one@example.com", "two");
        assert!(matches!(result, Err(StorageError::Conflict(_))));

        let two = repo.find_by_subject("auth0|two").unwrap().unwrap();
        assert_eq!(two.email, "two@example.com");
    }
}
