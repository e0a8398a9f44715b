// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access token issuance.

use axum::{extract::State, Json};

use crate::{
    api::extract::ValidJson,
    error::ApiError,
    models::{TokenRequest, TokenResponse},
    state::AppState,
};

/// Exchange a user payload for a one-hour access token.
#[utoipa::path(
    post,
    path = "/jwt",
    tag = "Auth",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Signed token", body = TokenResponse),
        (status = 400, description = "Invalid email")
    )
)]
pub async fn issue_token(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.tokens.issue(&request.email)?;
    tracing::debug!(email = %request.email.trim(), "access token issued");
    Ok(Json(TokenResponse { token }))
}
