// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Payment endpoints.
//!
//! The browser creates a Stripe payment intent, confirms it client-side and
//! then reports the completed payment, which enrolls the student.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    api::extract::ValidJson,
    auth::Auth,
    error::ApiError,
    models::{
        EmailQuery, PaymentCompletion, PaymentIntentRequest, PaymentIntentResponse,
        RecordPaymentRequest,
    },
    providers::stripe::{to_minor_units, DEFAULT_CURRENCY, DEFAULT_PAYMENT_METHOD},
    state::AppState,
    storage::{Payment, PaymentRepository},
};

/// Create a card payment intent for a price in dollars.
#[utoipa::path(
    post,
    path = "/create-payment-intent",
    tag = "Payments",
    security(("bearer_auth" = [])),
    request_body = PaymentIntentRequest,
    responses(
        (status = 200, body = PaymentIntentResponse),
        (status = 400, description = "Invalid price"),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Payment provider unavailable or not configured")
    )
)]
pub async fn create_payment_intent(
    Auth(user): Auth,
    State(state): State<AppState>,
    ValidJson(request): ValidJson<PaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, ApiError> {
    let client = state
        .payments
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Payment provider is not configured"))?;

    let amount = to_minor_units(request.price).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let intent = client
        .create_payment_intent(amount, DEFAULT_CURRENCY, &[DEFAULT_PAYMENT_METHOD])
        .await?;

    tracing::debug!(email = %user.email, intent_id = %intent.id, "payment intent handed to client");
    Ok(Json(PaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

/// Record a completed payment and enroll the student.
#[utoipa::path(
    post,
    path = "/payments",
    tag = "Payments",
    security(("bearer_auth" = [])),
    request_body = RecordPaymentRequest,
    responses(
        (status = 200, body = PaymentCompletion),
        (status = 400, description = "Invalid payment"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Transaction id already recorded")
    )
)]
pub async fn record_payment(
    Auth(_user): Auth,
    State(state): State<AppState>,
    ValidJson(request): ValidJson<RecordPaymentRequest>,
) -> Result<Json<PaymentCompletion>, ApiError> {
    let completion = PaymentRepository::new(&state.store).complete(request)?;
    Ok(Json(completion))
}

/// Payments made by a student, newest first.
#[utoipa::path(
    get,
    path = "/payments",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(EmailQuery),
    responses(
        (status = 200, body = [Payment]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_payments(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let Some(email) = query.email() else {
        return Ok(Json(Vec::new()));
    };
    let payments = PaymentRepository::new(&state.store).list_by_email(email)?;
    Ok(Json(payments))
}
