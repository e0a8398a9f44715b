// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Student selection endpoints (`/classes`).

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    api::extract::ValidJson,
    auth::Auth,
    error::ApiError,
    models::{CreateSelectionRequest, DeleteResult, DocumentId, EmailQuery, InsertResult},
    state::AppState,
    storage::{Selection, SelectionRepository},
};

/// The caller's selections.
///
/// Without an `email` filter the answer is an empty list; asking for another
/// student's selections is forbidden.
#[utoipa::path(
    get,
    path = "/classes",
    tag = "Selections",
    security(("bearer_auth" = [])),
    params(EmailQuery),
    responses(
        (status = 200, body = [Selection]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Email does not match the token")
    )
)]
pub async fn list_selections(
    Auth(user): Auth,
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<Selection>>, ApiError> {
    let Some(email) = query.email() else {
        return Ok(Json(Vec::new()));
    };
    if !user.is_email(email) {
        tracing::warn!(caller = %user.email, requested = %email, "selection listing refused");
        return Err(ApiError::forbidden("forbidden access"));
    }
    let selections = SelectionRepository::new(&state.store).list_by_email(email)?;
    Ok(Json(selections))
}

#[utoipa::path(
    get,
    path = "/classes/{id}",
    tag = "Selections",
    params(("id" = String, Path, description = "Selection id")),
    responses((status = 200, body = [Selection]))
)]
pub async fn get_selection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Selection>>, ApiError> {
    let id = DocumentId::parse(&id)?;
    let selection = SelectionRepository::new(&state.store).get(&id)?;
    Ok(Json(selection.into_iter().collect()))
}

#[utoipa::path(
    post,
    path = "/classes",
    tag = "Selections",
    request_body = CreateSelectionRequest,
    responses(
        (status = 200, body = InsertResult),
        (status = 400, description = "Invalid selection")
    )
)]
pub async fn create_selection(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateSelectionRequest>,
) -> Result<Json<InsertResult>, ApiError> {
    let selection = SelectionRepository::new(&state.store).create(request)?;
    Ok(Json(InsertResult::new(selection.id)))
}

#[utoipa::path(
    delete,
    path = "/classes/{id}",
    tag = "Selections",
    params(("id" = String, Path, description = "Selection id")),
    responses((status = 200, body = DeleteResult))
)]
pub async fn delete_selection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, ApiError> {
    let id = DocumentId::parse(&id)?;
    let result = SelectionRepository::new(&state.store).delete(&id)?;
    Ok(Json(result))
}
