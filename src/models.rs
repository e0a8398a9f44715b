// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. Stored documents live next
//! to their repositories in [`crate::storage::repository`].
//!
//! ## Document identifiers
//!
//! Every stored document is keyed by a [`DocumentId`], an opaque string that
//! must parse as a UUID. Ids arriving in request bodies are validated during
//! deserialization; ids arriving in paths go through [`DocumentId::parse`].
//!
//! ## Write results
//!
//! Mutating routes answer with [`InsertResult`], [`UpdateResult`] or
//! [`DeleteResult`], which carry the number of documents matched or changed.
//! An absent document is not an error: it shows up as a zero count.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::api::extract::Validate;
use crate::error::ApiError;

// =============================================================================
// Document Identifier
// =============================================================================

/// Opaque document identifier.
#[derive(
    Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "5f0c7c1e-8a43-4d2b-9d35-1f4b0c2c9a11")]
pub struct DocumentId(String);

impl DocumentId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parse an identifier taken from a request path.
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        Self::try_from(raw.to_string()).map_err(ApiError::bad_request)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DocumentId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Uuid::parse_str(value.trim())
            .map(|uuid| Self(uuid.to_string()))
            .map_err(|_| format!("`{value}` is not a valid document id"))
    }
}

impl From<DocumentId> for String {
    fn from(value: DocumentId) -> Self {
        value.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical form of an email address for lookups and comparisons.
pub fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

// =============================================================================
// Write Results
// =============================================================================

/// Outcome of inserting one document.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: DocumentId,
}

impl InsertResult {
    pub fn new(inserted_id: DocumentId) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

/// Outcome of updating at most one document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl UpdateResult {
    pub fn unmatched() -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
        }
    }

    pub fn matched(modified: bool) -> Self {
        Self {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
        }
    }
}

/// Outcome of deleting at most one document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResult {
    pub fn new(deleted: bool) -> Self {
        Self {
            acknowledged: true,
            deleted_count: u64::from(deleted),
        }
    }
}

// =============================================================================
// Tokens
// =============================================================================

/// User payload exchanged for an access token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenRequest {
    /// Email the token is issued for.
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Signed HS256 token, valid for one hour.
    pub token: String,
}

// =============================================================================
// Users
// =============================================================================

/// Sign-in payload; creates the user on first sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub photo: Option<String>,
}

/// Response of `POST /users`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(untagged)]
pub enum RegisterUserResponse {
    /// A user with that email was already registered; nothing was written.
    Existing { message: String },
    /// The user was inserted.
    Created(InsertResult),
}

impl RegisterUserResponse {
    pub fn existing() -> Self {
        Self::Existing {
            message: "existing user".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AdminStatusResponse {
    pub admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct InstructorStatusResponse {
    pub instructor: bool,
}

// =============================================================================
// Listings
// =============================================================================

/// Instructor submission of a new class.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateListingRequest {
    pub class_name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub instructor_name: Option<String>,
    /// Instructor email (owner of the listing).
    pub email: String,
    pub available_seats: i64,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateFeedbackRequest {
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdatePriceRequest {
    pub price: f64,
}

/// Optional `?email=` filter.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    pub email: Option<String>,
}

impl EmailQuery {
    /// The email filter, ignoring blank values.
    pub fn email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

// =============================================================================
// Selections
// =============================================================================

/// A student picking a class before paying for it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSelectionRequest {
    pub email: String,
    /// Listing being selected.
    pub class_id: DocumentId,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub instructor_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

// =============================================================================
// Payments
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentIntentRequest {
    /// Price in dollars.
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// Client-reported completed payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    pub email: String,
    #[serde(alias = "price")]
    pub amount: f64,
    /// Provider transaction id; a second completion with the same id is rejected.
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// Selection being paid for.
    pub course: DocumentId,
    /// Listing being enrolled in.
    pub class_id: DocumentId,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// The three write results of a payment completion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCompletion {
    pub insert_result: InsertResult,
    pub delete_result: DeleteResult,
    pub update_result: UpdateResult,
}

// =============================================================================
// Validation
// =============================================================================

fn check_email(value: &str) -> Result<(), ApiError> {
    let trimmed = value.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ApiError::bad_request(format!(
            "`{value}` is not a valid email address"
        ))),
    }
}

fn check_amount(field: &str, value: f64, allow_zero: bool) -> Result<(), ApiError> {
    let in_range = if allow_zero { value >= 0.0 } else { value > 0.0 };
    if value.is_finite() && in_range {
        Ok(())
    } else if allow_zero {
        Err(ApiError::bad_request(format!(
            "{field} must be a non-negative number"
        )))
    } else {
        Err(ApiError::bad_request(format!(
            "{field} must be a positive number"
        )))
    }
}

impl Validate for TokenRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_email(&self.email)
    }
}

impl Validate for RegisterUserRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_email(&self.email)
    }
}

impl Validate for CreateListingRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.class_name.trim().is_empty() {
            return Err(ApiError::bad_request("class_name must not be empty"));
        }
        check_email(&self.email)?;
        if self.available_seats < 0 {
            return Err(ApiError::bad_request(
                "available_seats must not be negative",
            ));
        }
        check_amount("price", self.price, true)
    }
}

impl Validate for UpdateFeedbackRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

impl Validate for UpdatePriceRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_amount("price", self.price, true)
    }
}

impl Validate for CreateSelectionRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_email(&self.email)?;
        if let Some(price) = self.price {
            check_amount("price", price, true)?;
        }
        Ok(())
    }
}

impl Validate for PaymentIntentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_amount("price", self.price, false)
    }
}

impl Validate for RecordPaymentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_email(&self.email)?;
        check_amount("amount", self.amount, false)?;
        if let Some(transaction_id) = &self.transaction_id {
            if transaction_id.trim().is_empty() {
                return Err(ApiError::bad_request("transactionId must not be blank"));
            }
        }
        Ok(())
    }
}
