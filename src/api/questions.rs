// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::views::ViewBuilder;
use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiJson},
    models::{QuestionCreate, QuestionQuery, QuestionResponse, QuestionUpdate},
    state::AppState,
    storage::{NewQuestion, OwnershipEnforcer, QuestionChanges, QuestionFilter, QuestionRepository},
    validation,
};

#[utoipa::path(
    get,
    path = "/questions",
    params(QuestionQuery),
    tag = "Questions",
    responses((status = 200, body = [QuestionResponse]))
)]
pub async fn list_questions(
    State(state): State<AppState>,
    Query(params): Query<QuestionQuery>,
) -> Result<Json<Vec<QuestionResponse>>, ApiError> {
    let filter = QuestionFilter {
        topic_id: params.topic_id,
        asker_id: params.asker_id,
    };
    let questions = QuestionRepository::new(&state.db).list(filter)?;
    Ok(Json(ViewBuilder::new(&state.db).questions(questions)?))
}

#[utoipa::path(
    get,
    path = "/questions/{question_id}",
    params(("question_id" = u64, Path, description = "Question id")),
    tag = "Questions",
    responses((status = 200, body = QuestionResponse), (status = 404))
)]
pub async fn get_question(
    Path(question_id): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let question = QuestionRepository::new(&state.db).get(question_id)?;
    Ok(Json(ViewBuilder::new(&state.db).question(question)?))
}

/// Ask a question as the current user.
#[utoipa::path(
    post,
    path = "/questions",
    request_body = QuestionCreate,
    tag = "Questions",
    security(("bearer" = [])),
    responses((status = 201, body = QuestionResponse), (status = 404), (status = 422))
)]
pub async fn create_question(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<QuestionCreate>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    let ask = validation::question_text(&request.ask)?;
    let image_url = validation::image_url(request.image_url.as_deref())?;

    let question = QuestionRepository::new(&state.db).create(NewQuestion {
        topic_id: request.topic_id,
        ask,
        image_url,
        asker_id: user.id,
    })?;
    tracing::info!(question_id = question.id, user_id = user.id, "Created question");

    let view = ViewBuilder::new(&state.db).question(question)?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Update a question. Only the asker may update it.
#[utoipa::path(
    put,
    path = "/questions/{question_id}",
    params(("question_id" = u64, Path, description = "Question id")),
    request_body = QuestionUpdate,
    tag = "Questions",
    security(("bearer" = [])),
    responses((status = 200, body = QuestionResponse), (status = 403), (status = 404), (status = 422))
)]
pub async fn update_question(
    Path(question_id): Path<u64>,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<QuestionUpdate>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let repo = QuestionRepository::new(&state.db);
    repo.get(question_id)?.verify_ownership(&user, "update")?;

    let changes = QuestionChanges {
        topic_id: request.topic_id,
        ask: request.ask.as_deref().map(validation::question_text).transpose()?,
        image_url: request
            .image_url
            .as_deref()
            .map(|url| validation::image_url(Some(url)))
            .transpose()?,
    };

    let question = repo.update(question_id, changes)?;
    Ok(Json(ViewBuilder::new(&state.db).question(question)?))
}

/// Delete a question and its answers. Only the asker may delete it.
#[utoipa::path(
    delete,
    path = "/questions/{question_id}",
    params(("question_id" = u64, Path, description = "Question id")),
    tag = "Questions",
    security(("bearer" = [])),
    responses((status = 204), (status = 403), (status = 404))
)]
pub async fn delete_question(
    Path(question_id): Path<u64>,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, ApiError> {
    let repo = QuestionRepository::new(&state.db);
    repo.get(question_id)?.verify_ownership(&user, "delete")?;

    let answers = repo.delete(question_id)?;
    tracing::info!(question_id, user_id = user.id, answers, "Deleted question");
    Ok(StatusCode::NO_CONTENT)
}
