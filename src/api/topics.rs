// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiJson},
    models::{TopicCreate, TopicUpdate},
    state::AppState,
    storage::{Topic, TopicChanges, TopicRepository},
    validation,
};

#[utoipa::path(
    get,
    path = "/topics",
    tag = "Topics",
    responses((status = 200, body = [Topic]))
)]
pub async fn list_topics(State(state): State<AppState>) -> Result<Json<Vec<Topic>>, ApiError> {
    Ok(Json(TopicRepository::new(&state.db).list()?))
}

#[utoipa::path(
    get,
    path = "/topics/{topic_id}",
    params(("topic_id" = u64, Path, description = "Topic id")),
    tag = "Topics",
    responses((status = 200, body = Topic), (status = 404))
)]
pub async fn get_topic(
    Path(topic_id): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<Topic>, ApiError> {
    Ok(Json(TopicRepository::new(&state.db).get(topic_id)?))
}

#[utoipa::path(
    post,
    path = "/topics",
    request_body = TopicCreate,
    tag = "Topics",
    security(("bearer" = [])),
    responses((status = 201, body = Topic), (status = 409), (status = 422))
)]
pub async fn create_topic(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<TopicCreate>,
) -> Result<(StatusCode, Json<Topic>), ApiError> {
    let name = validation::topic_name(&request.name)?;
    let image_url = validation::image_url(request.image_url.as_deref())?;

    let topic = TopicRepository::new(&state.db).create(&name, image_url)?;
    tracing::info!(topic_id = topic.id, user_id = user.id, "Created topic");
    Ok((StatusCode::CREATED, Json(topic)))
}

#[utoipa::path(
    put,
    path = "/topics/{topic_id}",
    params(("topic_id" = u64, Path, description = "Topic id")),
    request_body = TopicUpdate,
    tag = "Topics",
    security(("bearer" = [])),
    responses((status = 200, body = Topic), (status = 404), (status = 409), (status = 422))
)]
pub async fn update_topic(
    Path(topic_id): Path<u64>,
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    ApiJson(request): ApiJson<TopicUpdate>,
) -> Result<Json<Topic>, ApiError> {
    let changes = TopicChanges {
        name: request.name.as_deref().map(validation::topic_name).transpose()?,
        image_url: request
            .image_url
            .as_deref()
            .map(|url| validation::image_url(Some(url)))
            .transpose()?,
    };

    Ok(Json(TopicRepository::new(&state.db).update(topic_id, changes)?))
}

/// Delete a topic with its questions and their answers.
#[utoipa::path(
    delete,
    path = "/topics/{topic_id}",
    params(("topic_id" = u64, Path, description = "Topic id")),
    tag = "Topics",
    security(("bearer" = [])),
    responses((status = 204), (status = 404))
)]
pub async fn delete_topic(
    Path(topic_id): Path<u64>,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, ApiError> {
    let deletion = TopicRepository::new(&state.db).delete(topic_id)?;
    tracing::info!(
        topic_id,
        user_id = user.id,
        questions = deletion.questions,
        answers = deletion.answers,
        "Deleted topic"
    );
    Ok(StatusCode::NO_CONTENT)
}
