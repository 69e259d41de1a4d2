// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Topic repository.
//!
//! Topic names are unique. Deleting a topic deletes its questions and their
//! answers in the same transaction.

use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::database::{
    all_rows, get_row, index_lookup, next_id, put_row, ForumDatabase, ANSWERS, QUESTIONS, TOPICS,
    TOPICS_BY_NAME,
};
use super::super::{StorageError, StorageResult};
use super::questions::Question;
use super::answers::Answer;

const TOPIC_SEQUENCE: &str = "topics";
const DUPLICATE_NAME: &str = "Topic name already exists";

/// A named question category.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Topic {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Field changes for a topic update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct TopicChanges {
    pub name: Option<String>,
    /// `Some(None)` clears the image.
    pub image_url: Option<Option<String>>,
}

/// Rows removed by a topic deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicDeletion {
    pub questions: usize,
    pub answers: usize,
}

pub struct TopicRepository<'a> {
    db: &'a ForumDatabase,
}

impl<'a> TopicRepository<'a> {
    pub fn new(db: &'a ForumDatabase) -> Self {
        Self { db }
    }

    /// List all topics in id order.
    pub fn list(&self) -> StorageResult<Vec<Topic>> {
        let read_txn = self.db.begin_read()?;
        let topics = read_txn.open_table(TOPICS)?;
        all_rows(&topics)
    }

    pub fn get(&self, topic_id: u64) -> StorageResult<Topic> {
        let read_txn = self.db.begin_read()?;
        let topics = read_txn.open_table(TOPICS)?;
        get_row(&topics, topic_id)?.ok_or_else(|| StorageError::NotFound("Topic".to_string()))
    }

    pub fn exists(&self, topic_id: u64) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let topics = read_txn.open_table(TOPICS)?;
        Ok(topics.get(topic_id)?.is_some())
    }

    /// Create a topic with a unique name.
    pub fn create(&self, name: &str, image_url: Option<String>) -> StorageResult<Topic> {
        let write_txn = self.db.begin_write()?;
        let topic = {
            let mut topics = write_txn.open_table(TOPICS)?;
            let mut by_name = write_txn.open_table(TOPICS_BY_NAME)?;

            if index_lookup(&by_name, name)?.is_some() {
                return Err(StorageError::Conflict(DUPLICATE_NAME.to_string()));
            }

            let topic = Topic {
                id: next_id(&write_txn, TOPIC_SEQUENCE)?,
                name: name.to_string(),
                image_url,
            };
            put_row(&mut topics, topic.id, &topic)?;
            by_name.insert(topic.name.as_str(), topic.id)?;
            topic
        };
        write_txn.commit()?;

        Ok(topic)
    }

    /// Apply changes to an existing topic.
    pub fn update(&self, topic_id: u64, changes: TopicChanges) -> StorageResult<Topic> {
        let write_txn = self.db.begin_write()?;
        let topic = {
            let mut topics = write_txn.open_table(TOPICS)?;
            let mut by_name = write_txn.open_table(TOPICS_BY_NAME)?;

            let mut topic: Topic = get_row(&topics, topic_id)?
                .ok_or_else(|| StorageError::NotFound("Topic".to_string()))?;

            if let Some(name) = changes.name {
                if name != topic.name {
                    if index_lookup(&by_name, &name)?.is_some() {
                        return Err(StorageError::Conflict(DUPLICATE_NAME.to_string()));
                    }
                    by_name.remove(topic.name.as_str())?;
                    by_name.insert(name.as_str(), topic_id)?;
                    topic.name = name;
                }
            }
            if let Some(image_url) = changes.image_url {
                topic.image_url = image_url;
            }

            put_row(&mut topics, topic_id, &topic)?;
            topic
        };
        write_txn.commit()?;

        Ok(topic)
    }

    /// Delete a topic and everything under it.
    pub fn delete(&self, topic_id: u64) -> StorageResult<TopicDeletion> {
        let write_txn = self.db.begin_write()?;
        let deletion = {
            let mut topics = write_txn.open_table(TOPICS)?;
            let mut by_name = write_txn.open_table(TOPICS_BY_NAME)?;
            let mut questions = write_txn.open_table(QUESTIONS)?;
            let mut answers = write_txn.open_table(ANSWERS)?;

            let topic: Topic = get_row(&topics, topic_id)?
                .ok_or_else(|| StorageError::NotFound("Topic".to_string()))?;

            let question_ids: Vec<u64> = all_rows::<Question, _>(&questions)?
                .into_iter()
                .filter(|q| q.topic_id == topic_id)
                .map(|q| q.id)
                .collect();
            let answer_ids: Vec<u64> = all_rows::<Answer, _>(&answers)?
                .into_iter()
                .filter(|a| question_ids.contains(&a.question_id))
                .map(|a| a.id)
                .collect();

            for answer_id in &answer_ids {
                answers.remove(*answer_id)?;
            }
            for question_id in &question_ids {
                questions.remove(*question_id)?;
            }
            by_name.remove(topic.name.as_str())?;
            topics.remove(topic_id)?;

            TopicDeletion {
                questions: question_ids.len(),
                answers: answer_ids.len(),
            }
        };
        write_txn.commit()?;

        Ok(deletion)
    }
}
