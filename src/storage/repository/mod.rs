// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the forum database.
//!
//! Each repository provides CRUD operations for a specific entity type,
//! using [`ForumDatabase`](super::ForumDatabase) transactions for all reads
//! and writes.

pub mod answers;
pub mod questions;
pub mod topics;
pub mod users;

pub use answers::{Answer, AnswerChanges, AnswerRepository, NewAnswer};
pub use questions::{NewQuestion, Question, QuestionChanges, QuestionFilter, QuestionRepository};
pub use topics::{Topic, TopicChanges, TopicDeletion, TopicRepository};
pub use users::{SyncOutcome, User, UserRepository};
