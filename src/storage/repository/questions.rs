// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Question repository.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::database::{
    all_rows, get_row, next_id, put_row, ForumDatabase, ANSWERS, QUESTIONS, TOPICS, USERS,
};
use super::super::{OwnedResource, StorageError, StorageResult};
use super::answers::Answer;

const QUESTION_SEQUENCE: &str = "questions";

/// A question asked under a topic.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Question {
    pub id: u64,
    pub topic_id: u64,
    /// Question text
    pub ask: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Local id of the user who asked
    pub asker_id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for Question {
    const KIND: &'static str = "questions";

    fn owner_id(&self) -> u64 {
        self.asker_id
    }
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub topic_id: u64,
    pub ask: String,
    pub image_url: Option<String>,
    pub asker_id: u64,
}

/// Field changes for a question update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct QuestionChanges {
    pub topic_id: Option<u64>,
    pub ask: Option<String>,
    /// `Some(None)` clears the image.
    pub image_url: Option<Option<String>>,
}

/// Optional list filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionFilter {
    pub topic_id: Option<u64>,
    pub asker_id: Option<u64>,
}

impl QuestionFilter {
    fn matches(&self, question: &Question) -> bool {
        self.topic_id.map_or(true, |id| question.topic_id == id)
            && self.asker_id.map_or(true, |id| question.asker_id == id)
    }
}

pub struct QuestionRepository<'a> {
    db: &'a ForumDatabase,
}

impl<'a> QuestionRepository<'a> {
    pub fn new(db: &'a ForumDatabase) -> Self {
        Self { db }
    }

    /// List questions in id order, optionally filtered by topic and asker.
    pub fn list(&self, filter: QuestionFilter) -> StorageResult<Vec<Question>> {
        let read_txn = self.db.begin_read()?;
        let questions = read_txn.open_table(QUESTIONS)?;
        Ok(all_rows::<Question, _>(&questions)?
            .into_iter()
            .filter(|q| filter.matches(q))
            .collect())
    }

    pub fn get(&self, question_id: u64) -> StorageResult<Question> {
        let read_txn = self.db.begin_read()?;
        let questions = read_txn.open_table(QUESTIONS)?;
        get_row(&questions, question_id)?
            .ok_or_else(|| StorageError::NotFound("Question".to_string()))
    }

    /// Create a question. The topic and asker must exist.
    pub fn create(&self, new: NewQuestion) -> StorageResult<Question> {
        let write_txn = self.db.begin_write()?;
        let question = {
            let topics = write_txn.open_table(TOPICS)?;
            if topics.get(new.topic_id)?.is_none() {
                return Err(StorageError::NotFound("Topic".to_string()));
            }
            let users = write_txn.open_table(USERS)?;
            if users.get(new.asker_id)?.is_none() {
                return Err(StorageError::NotFound("User".to_string()));
            }

            let mut questions = write_txn.open_table(QUESTIONS)?;
            let now = Utc::now();
            let question = Question {
                id: next_id(&write_txn, QUESTION_SEQUENCE)?,
                topic_id: new.topic_id,
                ask: new.ask,
                image_url: new.image_url,
                asker_id: new.asker_id,
                created_at: now,
                updated_at: now,
            };
            put_row(&mut questions, question.id, &question)?;
            question
        };
        write_txn.commit()?;

        Ok(question)
    }

    /// Apply changes to a question. A new topic must exist.
    pub fn update(&self, question_id: u64, changes: QuestionChanges) -> StorageResult<Question> {
        let write_txn = self.db.begin_write()?;
        let question = {
            let mut questions = write_txn.open_table(QUESTIONS)?;
            let mut question: Question = get_row(&questions, question_id)?
                .ok_or_else(|| StorageError::NotFound("Question".to_string()))?;

            if let Some(topic_id) = changes.topic_id {
                let topics = write_txn.open_table(TOPICS)?;
                if topics.get(topic_id)?.is_none() {
                    return Err(StorageError::NotFound("Topic".to_string()));
                }
                question.topic_id = topic_id;
            }
            if let Some(ask) = changes.ask {
                question.ask = ask;
            }
            if let Some(image_url) = changes.image_url {
                question.image_url = image_url;
            }
            question.updated_at = Utc::now();

            put_row(&mut questions, question_id, &question)?;
            question
        };
        write_txn.commit()?;

        Ok(question)
    }

    /// Delete a question and its answers. Returns the number of answers removed.
    pub fn delete(&self, question_id: u64) -> StorageResult<usize> {
        let write_txn = self.db.begin_write()?;
        let removed_answers = {
            let mut questions = write_txn.open_table(QUESTIONS)?;
            let mut answers = write_txn.open_table(ANSWERS)?;

            if questions.get(question_id)?.is_none() {
                return Err(StorageError::NotFound("Question".to_string()));
            }

            let answer_ids: Vec<u64> = all_rows::<Answer, _>(&answers)?
                .into_iter()
                .filter(|a| a.question_id == question_id)
                .map(|a| a.id)
                .collect();
            for answer_id in &answer_ids {
                answers.remove(*answer_id)?;
            }
            questions.remove(question_id)?;

            answer_ids.len()
        };
        write_txn.commit()?;

        Ok(removed_answers)
    }
}
