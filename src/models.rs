// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. Stored entities
//! ([`User`], [`Topic`], [`Question`], [`Answer`]) are serialized directly;
//! the types here add request shapes and the nested read views.
//!
//! ## Partial updates
//!
//! Update bodies use `Option` fields: an absent field is left untouched.
//! For `image_url`, an empty string clears the image.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::storage::{Answer, Question, Topic, User};

// =============================================================================
// Auth / User Models
// =============================================================================

/// Body of `POST /users/sync`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSyncRequest {
    /// Must equal the `sub` claim of the bearer token.
    pub auth0_id: String,
    pub email: String,
    /// Used only when the user is created; usernames cannot change.
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DemoLoginResponse {
    pub access_token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: User,
}

// =============================================================================
// Topic Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopicCreate {
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TopicUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

// =============================================================================
// Question Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuestionCreate {
    pub topic_id: u64,
    pub ask: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct QuestionUpdate {
    #[serde(default)]
    pub topic_id: Option<u64>,
    #[serde(default)]
    pub ask: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A question with its topic and asker.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct QuestionResponse {
    #[serde(flatten)]
    pub question: Question,
    pub topic: Topic,
    pub asker: User,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QuestionQuery {
    /// Only questions under this topic
    pub topic_id: Option<u64>,
    /// Only questions asked by this user
    pub asker_id: Option<u64>,
}

// =============================================================================
// Answer Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnswerCreate {
    pub question_id: u64,
    pub response: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AnswerUpdate {
    #[serde(default)]
    pub question_id: Option<u64>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// An answer with its question (itself nested) and responder.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AnswerResponse {
    #[serde(flatten)]
    pub answer: Answer,
    pub question: QuestionResponse,
    pub responder: User,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnswerQuery {
    /// Only answers to this question
    pub question_id: Option<u64>,
}

// =============================================================================
// Upload Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Public HTTPS URL of the uploaded image
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn question_response_flattens_question_fields() {
        let now = Utc::now();
        let asker = User {
            id: 1,
            auth0_id: "auth0|1".into(),
            email: "a@example.com".into(),
            username: "alice".into(),
            created_at: now,
            updated_at: now,
        };
        let response = QuestionResponse {
            question: Question {
                id: 9,
                topic_id: 3,
                ask: "What is the meaning of life?".into(),
                image_url: None,
                asker_id: 1,
                created_at: now,
                updated_at: now,
            },
            topic: Topic {
                id: 3,
                name: "Philosophy".into(),
                image_url: None,
            },
            asker,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["id"], 9);
        assert_eq!(value["ask"], "What is the meaning of life?");
        assert_eq!(value["topic"]["name"], "Philosophy");
        assert_eq!(value["asker"]["username"], "alice");
    }

    #[test]
    fn update_bodies_accept_partial_json() {
        let update: QuestionUpdate = serde_json::from_value(json!({"ask": "New text here"})).unwrap();
        assert_eq!(update.ask.as_deref(), Some("New text here"));
        assert!(update.topic_id.is_none());
        assert!(update.image_url.is_none());

        let update: TopicUpdate = serde_json::from_value(json!({})).unwrap();
        assert!(update.name.is_none());
    }
}
