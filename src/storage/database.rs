// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded forum database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`, `topics`, `questions`, `answers`: id → JSON row
//! - `users_by_subject`, `users_by_email`, `users_by_username`: unique key → user id
//! - `topics_by_name`: unique topic name → topic id
//! - `sequences`: entity name → last issued id
//!
//! Uniqueness checks, foreign-key checks and cascades all run inside a single
//! write transaction. redb admits one writer at a time, so two concurrent
//! requests cannot both claim the same email or topic name.

use std::path::Path;

use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, TableDefinition,
    WriteTransaction,
};
use serde::{de::DeserializeOwned, Serialize};

// =============================================================================
// Table Definitions
// =============================================================================

pub(crate) const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");
pub(crate) const USERS_BY_SUBJECT: TableDefinition<&str, u64> =
    TableDefinition::new("users_by_subject");
pub(crate) const USERS_BY_EMAIL: TableDefinition<&str, u64> =
    TableDefinition::new("users_by_email");
pub(crate) const USERS_BY_USERNAME: TableDefinition<&str, u64> =
    TableDefinition::new("users_by_username");

pub(crate) const TOPICS: TableDefinition<u64, &[u8]> = TableDefinition::new("topics");
pub(crate) const TOPICS_BY_NAME: TableDefinition<&str, u64> =
    TableDefinition::new("topics_by_name");

pub(crate) const QUESTIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("questions");
pub(crate) const ANSWERS: TableDefinition<u64, &[u8]> = TableDefinition::new("answers");

/// Sequence table: entity name → last issued id.
const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Entity (or a referenced entity) does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A unique constraint would be violated.
    #[error("{0}")]
    Conflict(String),

    /// Ownership check failed.
    #[error("{0}")]
    PermissionDenied(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Row Helpers
// =============================================================================

/// Read and deserialize a JSON row by id.
pub(crate) fn get_row<T, Tbl>(table: &Tbl, id: u64) -> StorageResult<Option<T>>
where
    T: DeserializeOwned,
    Tbl: ReadableTable<u64, &'static [u8]>,
{
    match table.get(id)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

/// Deserialize every row of a table in ascending id order.
pub(crate) fn all_rows<T, Tbl>(table: &Tbl) -> StorageResult<Vec<T>>
where
    T: DeserializeOwned,
    Tbl: ReadableTable<u64, &'static [u8]>,
{
    let mut rows = Vec::new();
    for entry in table.iter()? {
        let (_, value) = entry?;
        rows.push(serde_json::from_slice(value.value())?);
    }
    Ok(rows)
}

/// Serialize a row and store it under `id`.
pub(crate) fn put_row<T: Serialize>(
    table: &mut redb::Table<'_, u64, &'static [u8]>,
    id: u64,
    row: &T,
) -> StorageResult<()> {
    let json = serde_json::to_vec(row)?;
    table.insert(id, json.as_slice())?;
    Ok(())
}

/// Look up an id in a unique-index table.
pub(crate) fn index_lookup<Tbl>(index: &Tbl, key: &str) -> StorageResult<Option<u64>>
where
    Tbl: ReadableTable<&'static str, u64>,
{
    Ok(index.get(key)?.map(|v| v.value()))
}

/// Issue the next id for an entity within a write transaction.
pub(crate) fn next_id(txn: &WriteTransaction, sequence: &str) -> StorageResult<u64> {
    let mut table = txn.open_table(SEQUENCES)?;
    let last = table.get(sequence)?.map(|v| v.value()).unwrap_or(0);
    let next = last + 1;
    table.insert(sequence, next)?;
    Ok(next)
}

// =============================================================================
// ForumDatabase
// =============================================================================

/// Embedded ACID forum database.
pub struct ForumDatabase {
    db: Database,
}

impl ForumDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERS_BY_SUBJECT)?;
            let _ = write_txn.open_table(USERS_BY_EMAIL)?;
            let _ = write_txn.open_table(USERS_BY_USERNAME)?;
            let _ = write_txn.open_table(TOPICS)?;
            let _ = write_txn.open_table(TOPICS_BY_NAME)?;
            let _ = write_txn.open_table(QUESTIONS)?;
            let _ = write_txn.open_table(ANSWERS)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub(crate) fn begin_read(&self) -> StorageResult<ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    pub(crate) fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Cheap liveness probe used by the readiness endpoint.
    pub fn ping(&self) -> StorageResult<()> {
        let read_txn = self.begin_read()?;
        let _ = read_txn.open_table(SEQUENCES)?;
        Ok(())
    }
}
