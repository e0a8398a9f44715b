// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Class listing endpoints.
//!
//! `/sports` is the public catalogue plus admin moderation; `/myclasses` is
//! the instructor's view of their own listings.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    api::extract::ValidJson,
    auth::MutationGuard,
    error::ApiError,
    models::{
        CreateListingRequest, DocumentId, EmailQuery, InsertResult, UpdateFeedbackRequest,
        UpdatePriceRequest, UpdateResult,
    },
    state::AppState,
    storage::{Listing, ListingRepository, ListingStatus},
};

/// All listings, most enrolled first.
#[utoipa::path(
    get,
    path = "/sports",
    tag = "Listings",
    responses((status = 200, body = [Listing]))
)]
pub async fn list_listings(State(state): State<AppState>) -> Result<Json<Vec<Listing>>, ApiError> {
    let listings = ListingRepository::new(&state.store).list_by_popularity()?;
    Ok(Json(listings))
}

/// One listing as a zero- or one-element array.
#[utoipa::path(
    get,
    path = "/sports/{id}",
    tag = "Listings",
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 200, body = [Listing]),
        (status = 400, description = "Invalid id")
    )
)]
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let id = DocumentId::parse(&id)?;
    let listing = ListingRepository::new(&state.store).get(&id)?;
    Ok(Json(listing.into_iter().collect()))
}

/// Submit a listing for review.
#[utoipa::path(
    post,
    path = "/sports",
    tag = "Listings",
    request_body = CreateListingRequest,
    responses(
        (status = 200, body = InsertResult),
        (status = 400, description = "Invalid listing")
    )
)]
pub async fn create_listing(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateListingRequest>,
) -> Result<Json<InsertResult>, ApiError> {
    let listing = ListingRepository::new(&state.store).create(request)?;
    Ok(Json(InsertResult::new(listing.id)))
}

/// Attach admin feedback to a listing.
#[utoipa::path(
    patch,
    path = "/sports/{id}",
    tag = "Listings",
    params(("id" = String, Path, description = "Listing id")),
    request_body = UpdateFeedbackRequest,
    responses((status = 200, body = UpdateResult))
)]
pub async fn set_feedback(
    _guard: MutationGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(request): ValidJson<UpdateFeedbackRequest>,
) -> Result<Json<UpdateResult>, ApiError> {
    let id = DocumentId::parse(&id)?;
    let result = ListingRepository::new(&state.store).set_feedback(&id, request.feedback)?;
    Ok(Json(result))
}

/// Mark a listing approved.
#[utoipa::path(
    patch,
    path = "/sports/approved/{id}",
    tag = "Listings",
    params(("id" = String, Path, description = "Listing id")),
    responses((status = 200, body = UpdateResult))
)]
pub async fn approve_listing(
    _guard: MutationGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UpdateResult>, ApiError> {
    set_status(&state, &id, ListingStatus::Approved)
}

/// Mark a listing denied.
#[utoipa::path(
    patch,
    path = "/sports/denied/{id}",
    tag = "Listings",
    params(("id" = String, Path, description = "Listing id")),
    responses((status = 200, body = UpdateResult))
)]
pub async fn deny_listing(
    _guard: MutationGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UpdateResult>, ApiError> {
    set_status(&state, &id, ListingStatus::Denied)
}

fn set_status(state: &AppState, id: &str, status: ListingStatus) -> Result<Json<UpdateResult>, ApiError> {
    let id = DocumentId::parse(id)?;
    let result = ListingRepository::new(&state.store).set_status(&id, status)?;
    Ok(Json(result))
}

/// Listings owned by an instructor.
#[utoipa::path(
    get,
    path = "/myclasses",
    tag = "Listings",
    params(EmailQuery),
    responses((status = 200, body = [Listing]))
)]
pub async fn list_my_listings(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let Some(email) = query.email() else {
        return Ok(Json(Vec::new()));
    };
    let listings = ListingRepository::new(&state.store).list_by_instructor(email)?;
    Ok(Json(listings))
}

/// One of the instructor's listings as a zero- or one-element array.
#[utoipa::path(
    get,
    path = "/myclasses/{id}",
    tag = "Listings",
    params(("id" = String, Path, description = "Listing id")),
    responses((status = 200, body = [Listing]))
)]
pub async fn get_my_listing(
    state: State<AppState>,
    id: Path<String>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    get_listing(state, id).await
}

/// Change a listing's price.
#[utoipa::path(
    patch,
    path = "/myclasses/{id}",
    tag = "Listings",
    params(("id" = String, Path, description = "Listing id")),
    request_body = UpdatePriceRequest,
    responses(
        (status = 200, body = UpdateResult),
        (status = 400, description = "Invalid id or price")
    )
)]
pub async fn update_price(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(request): ValidJson<UpdatePriceRequest>,
) -> Result<Json<UpdateResult>, ApiError> {
    let id = DocumentId::parse(&id)?;
    let result = ListingRepository::new(&state.store).set_price(&id, request.price)?;
    Ok(Json(result))
}
