// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Assembly of nested read views.
//!
//! Questions are returned with their topic and asker, answers with their
//! question view and responder. Related rows are fetched once per request
//! and memoized, so listing many questions under one topic reads the topic
//! a single time.

use std::collections::HashMap;

use crate::models::{AnswerResponse, QuestionResponse};
use crate::storage::{
    Answer, ForumDatabase, Question, QuestionRepository, StorageResult, Topic, TopicRepository,
    User, UserRepository,
};

pub(crate) struct ViewBuilder<'a> {
    db: &'a ForumDatabase,
    topics: HashMap<u64, Topic>,
    users: HashMap<u64, User>,
    questions: HashMap<u64, QuestionResponse>,
}

impl<'a> ViewBuilder<'a> {
    pub(crate) fn new(db: &'a ForumDatabase) -> Self {
        Self {
            db,
            topics: HashMap::new(),
            users: HashMap::new(),
            questions: HashMap::new(),
        }
    }

    fn topic(&mut self, topic_id: u64) -> StorageResult<Topic> {
        if let Some(topic) = self.topics.get(&topic_id) {
            return Ok(topic.clone());
        }
        let topic = TopicRepository::new(self.db).get(topic_id)?;
        self.topics.insert(topic_id, topic.clone());
        Ok(topic)
    }

    fn user(&mut self, user_id: u64) -> StorageResult<User> {
        if let Some(user) = self.users.get(&user_id) {
            return Ok(user.clone());
        }
        let user = UserRepository::new(self.db).get(user_id)?;
        self.users.insert(user_id, user.clone());
        Ok(user)
    }

    pub(crate) fn question(&mut self, question: Question) -> StorageResult<QuestionResponse> {
        let topic = self.topic(question.topic_id)?;
        let asker = self.user(question.asker_id)?;
        Ok(QuestionResponse {
            question,
            topic,
            asker,
        })
    }

    fn question_by_id(&mut self, question_id: u64) -> StorageResult<QuestionResponse> {
        if let Some(view) = self.questions.get(&question_id) {
            return Ok(view.clone());
        }
        let question = QuestionRepository::new(self.db).get(question_id)?;
        let view = self.question(question)?;
        self.questions.insert(question_id, view.clone());
        Ok(view)
    }

    pub(crate) fn answer(&mut self, answer: Answer) -> StorageResult<AnswerResponse> {
        let question = self.question_by_id(answer.question_id)?;
        let responder = self.user(answer.responder_id)?;
        Ok(AnswerResponse {
            answer,
            question,
            responder,
        })
    }

    pub(crate) fn questions(&mut self, questions: Vec<Question>) -> StorageResult<Vec<QuestionResponse>> {
        questions.into_iter().map(|q| self.question(q)).collect()
    }

    pub(crate) fn answers(&mut self, answers: Vec<Answer>) -> StorageResult<Vec<AnswerResponse>> {
        answers.into_iter().map(|a| self.answer(a)).collect()
    }
}
