// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Forum Storage Module
//!
//! Persistent storage for users, topics, questions and answers in a single
//! embedded redb file.
//!
//! ## Relationships
//!
//! ```text
//! User ──< Question (asker_id)      Topic ──< Question (topic_id, cascade)
//! User ──< Answer (responder_id)   Question ──< Answer (question_id, cascade)
//! ```
//!
//! Rows are stored as JSON values keyed by numeric id. Unique columns
//! (subject, email, username, topic name) are backed by index tables that are
//! maintained in the same write transaction as the row.

pub mod bootstrap;
pub mod database;
pub mod ownership;
pub mod repository;

pub use bootstrap::ensure_demo_user;
pub use database::{ForumDatabase, StorageError, StorageResult};
pub use ownership::{OwnedResource, OwnershipEnforcer};
pub use repository::{
    Answer, AnswerChanges, AnswerRepository, NewAnswer, NewQuestion, Question, QuestionChanges,
    QuestionFilter, QuestionRepository, SyncOutcome, Topic, TopicChanges, TopicRepository, User,
    UserRepository,
};
