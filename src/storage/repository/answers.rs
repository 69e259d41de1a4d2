// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Answer repository.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::database::{
    all_rows, get_row, next_id, put_row, ForumDatabase, ANSWERS, QUESTIONS, USERS,
};
use super::super::{OwnedResource, StorageError, StorageResult};

const ANSWER_SEQUENCE: &str = "answers";

/// A response to a question.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Answer {
    pub id: u64,
    pub question_id: u64,
    pub response: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Local id of the user who answered
    pub responder_id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for Answer {
    const KIND: &'static str = "answers";

    fn owner_id(&self) -> u64 {
        self.responder_id
    }
}

#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub question_id: u64,
    pub response: String,
    pub image_url: Option<String>,
    pub responder_id: u64,
}

#[derive(Debug, Clone, Default)]
pub struct AnswerChanges {
    pub question_id: Option<u64>,
    pub response: Option<String>,
    /// `Some(None)` clears the image.
    pub image_url: Option<Option<String>>,
}

pub struct AnswerRepository<'a> {
    db: &'a ForumDatabase,
}

impl<'a> AnswerRepository<'a> {
    pub fn new(db: &'a ForumDatabase) -> Self {
        Self { db }
    }

    /// List answers in id order, optionally only those for one question.
    pub fn list(&self, question_id: Option<u64>) -> StorageResult<Vec<Answer>> {
        let read_txn = self.db.begin_read()?;
        let answers = read_txn.open_table(ANSWERS)?;
        Ok(all_rows::<Answer, _>(&answers)?
            .into_iter()
            .filter(|a| question_id.map_or(true, |id| a.question_id == id))
            .collect())
    }

    pub fn get(&self, answer_id: u64) -> StorageResult<Answer> {
        let read_txn = self.db.begin_read()?;
        let answers = read_txn.open_table(ANSWERS)?;
        get_row(&answers, answer_id)?.ok_or_else(|| StorageError::NotFound("Answer".to_string()))
    }

    /// Create an answer. The question and responder must exist.
    pub fn create(&self, new: NewAnswer) -> StorageResult<Answer> {
        let write_txn = self.db.begin_write()?;
        let answer = {
            let questions = write_txn.open_table(QUESTIONS)?;
            if questions.get(new.question_id)?.is_none() {
                return Err(StorageError::NotFound("Question".to_string()));
            }
            let users = write_txn.open_table(USERS)?;
            if users.get(new.responder_id)?.is_none() {
                return Err(StorageError::NotFound("User".to_string()));
            }

            let mut answers = write_txn.open_table(ANSWERS)?;
            let now = Utc::now();
            let answer = Answer {
                id: next_id(&write_txn, ANSWER_SEQUENCE)?,
                question_id: new.question_id,
                response: new.response,
                image_url: new.image_url,
                responder_id: new.responder_id,
                created_at: now,
                updated_at: now,
            };
            put_row(&mut answers, answer.id, &answer)?;
            answer
        };
        write_txn.commit()?;

        Ok(answer)
    }

    pub fn update(&self, answer_id: u64, changes: AnswerChanges) -> StorageResult<Answer> {
        let write_txn = self.db.begin_write()?;
        let answer = {
            let mut answers = write_txn.open_table(ANSWERS)?;
            let mut answer: Answer = get_row(&answers, answer_id)?
                .ok_or_else(|| StorageError::NotFound("Answer".to_string()))?;

            if let Some(question_id) = changes.question_id {
                let questions = write_txn.open_table(QUESTIONS)?;
                if questions.get(question_id)?.is_none() {
                    return Err(StorageError::NotFound("Question".to_string()));
                }
                answer.question_id = question_id;
            }
            if let Some(response) = changes.response {
                answer.response = response;
            }
            if let Some(image_url) = changes.image_url {
                answer.image_url = image_url;
            }
            answer.updated_at = Utc::now();

            put_row(&mut answers, answer_id, &answer)?;
            answer
        };
        write_txn.commit()?;

        Ok(answer)
    }

    pub fn delete(&self, answer_id: u64) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut answers = write_txn.open_table(ANSWERS)?;
            if answers.remove(answer_id)?.is_none() {
                return Err(StorageError::NotFound("Answer".to_string()));
            }
        }
        write_txn.commit()?;
        Ok(())
    }
}
