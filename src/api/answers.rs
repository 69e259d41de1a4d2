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
    models::{AnswerCreate, AnswerQuery, AnswerResponse, AnswerUpdate},
    state::AppState,
    storage::{AnswerChanges, AnswerRepository, NewAnswer, OwnershipEnforcer},
    validation,
};

#[utoipa::path(
    get,
    path = "/answers",
    params(AnswerQuery),
    tag = "Answers",
    responses((status = 200, body = [AnswerResponse]))
)]
pub async fn list_answers(
    State(state): State<AppState>,
    Query(params): Query<AnswerQuery>,
) -> Result<Json<Vec<AnswerResponse>>, ApiError> {
    let answers = AnswerRepository::new(&state.db).list(params.question_id)?;
    Ok(Json(ViewBuilder::new(&state.db).answers(answers)?))
}

#[utoipa::path(
    get,
    path = "/answers/{answer_id}",
    params(("answer_id" = u64, Path, description = "Answer id")),
    tag = "Answers",
    responses((status = 200, body = AnswerResponse), (status = 404))
)]
pub async fn get_answer(
    Path(answer_id): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let answer = AnswerRepository::new(&state.db).get(answer_id)?;
    Ok(Json(ViewBuilder::new(&state.db).answer(answer)?))
}

#[utoipa::path(
    post,
    path = "/answers",
    request_body = AnswerCreate,
    tag = "Answers",
    security(("bearer" = [])),
    responses((status = 201, body = AnswerResponse), (status = 404), (status = 422))
)]
pub async fn create_answer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<AnswerCreate>,
) -> Result<(StatusCode, Json<AnswerResponse>), ApiError> {
    let response = validation::answer_text(&request.response)?;
    let image_url = validation::image_url(request.image_url.as_deref())?;

    let answer = AnswerRepository::new(&state.db).create(NewAnswer {
        question_id: request.question_id,
        response,
        image_url,
        responder_id: user.id,
    })?;
    tracing::info!(answer_id = answer.id, user_id = user.id, "Created answer");

    let view = ViewBuilder::new(&state.db).answer(answer)?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    put,
    path = "/answers/{answer_id}",
    params(("answer_id" = u64, Path, description = "Answer id")),
    request_body = AnswerUpdate,
    tag = "Answers",
    security(("bearer" = [])),
    responses((status = 200, body = AnswerResponse), (status = 403), (status = 404), (status = 422))
)]
pub async fn update_answer(
    Path(answer_id): Path<u64>,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<AnswerUpdate>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let repo = AnswerRepository::new(&state.db);
    repo.get(answer_id)?.verify_ownership(&user, "update")?;

    let changes = AnswerChanges {
        question_id: request.question_id,
        response: request.response.as_deref().map(validation::answer_text).transpose()?,
        image_url: request
            .image_url
            .as_deref()
            .map(|url| validation::image_url(Some(url)))
            .transpose()?,
    };

    let answer = repo.update(answer_id, changes)?;
    Ok(Json(ViewBuilder::new(&state.db).answer(answer)?))
}

#[utoipa::path(
    delete,
    path = "/answers/{answer_id}",
    params(("answer_id" = u64, Path, description = "Answer id")),
    tag = "Answers",
    security(("bearer" = [])),
    responses((status = 204), (status = 403), (status = 404))
)]
pub async fn delete_answer(
    Path(answer_id): Path<u64>,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, ApiError> {
    let repo = AnswerRepository::new(&state.db);
    repo.get(answer_id)?.verify_ownership(&user, "delete")?;

    repo.delete(answer_id)?;
    Ok(StatusCode::NO_CONTENT)
}
