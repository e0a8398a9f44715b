// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Class listing repository.
//!
//! Listings are submitted by instructors, moderated by admins (approve,
//! deny, feedback) and carry the enrollment counters that payment
//! completion moves.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::store::{DocumentStore, StorageResult, LISTINGS};
use crate::models::{email_key, CreateListingRequest, DocumentId, UpdateResult};

/// Moderation state of a listing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Pending,
    Approved,
    Denied,
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingStatus::Pending => write!(f, "pending"),
            ListingStatus::Approved => write!(f, "approved"),
            ListingStatus::Denied => write!(f, "denied"),
        }
    }
}

/// Class listing stored in the `listings` collection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Listing {
    pub id: DocumentId,
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_name: Option<String>,
    /// Instructor email.
    pub email: String,
    #[serde(default)]
    pub num_students: i64,
    pub available_seats: i64,
    pub price: f64,
    #[serde(default)]
    pub status: ListingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl Listing {
    /// Count one more enrolled student. Seats may go negative; nothing
    /// upstream reserves a seat before payment.
    pub fn enroll(&mut self) {
        self.num_students += 1;
        self.available_seats -= 1;
    }
}

/// Repository for listing operations.
pub struct ListingRepository<'a> {
    store: &'a DocumentStore,
}

impl<'a> ListingRepository<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    /// All listings, most enrolled first.
    pub fn list_by_popularity(&self) -> StorageResult<Vec<Listing>> {
        let mut listings: Vec<Listing> = self.store.scan(LISTINGS, |_: &Listing| true)?;
        listings.sort_by(|a, b| {
            b.num_students
                .cmp(&a.num_students)
                .then_with(|| a.class_name.cmp(&b.class_name))
        });
        Ok(listings)
    }

    /// Listings owned by an instructor.
    pub fn list_by_instructor(&self, email: &str) -> StorageResult<Vec<Listing>> {
        let key = email_key(email);
        self.store
            .scan(LISTINGS, |listing: &Listing| email_key(&listing.email) == key)
    }

    pub fn get(&self, id: &DocumentId) -> StorageResult<Option<Listing>> {
        self.store.get(LISTINGS, id.as_str())
    }

    /// Create a pending listing with no enrolled students.
    pub fn create(&self, request: CreateListingRequest) -> StorageResult<Listing> {
        let listing = Listing {
            id: DocumentId::generate(),
            class_name: request.class_name.trim().to_string(),
            image: request.image,
            instructor_name: request.instructor_name,
            email: request.email.trim().to_string(),
            num_students: 0,
            available_seats: request.available_seats,
            price: request.price,
            status: ListingStatus::Pending,
            feedback: None,
        };
        self.store.insert(LISTINGS, listing.id.as_str(), &listing)?;
        tracing::info!(listing_id = %listing.id, instructor = %listing.email, "listing submitted");
        Ok(listing)
    }

    pub fn set_status(&self, id: &DocumentId, status: ListingStatus) -> StorageResult<UpdateResult> {
        let result = self
            .store
            .update(LISTINGS, id.as_str(), |listing: &mut Listing| listing.status = status)?;
        tracing::info!(
            listing_id = %id,
            status = %status,
            matched = result.matched_count,
            modified = result.modified_count,
            "listing status set"
        );
        Ok(result)
    }

    pub fn set_feedback(&self, id: &DocumentId, feedback: String) -> StorageResult<UpdateResult> {
        self.store.update(LISTINGS, id.as_str(), |listing: &mut Listing| {
            listing.feedback = Some(feedback)
        })
    }

    pub fn set_price(&self, id: &DocumentId, price: f64) -> StorageResult<UpdateResult> {
        self.store
            .update(LISTINGS, id.as_str(), |listing: &mut Listing| listing.price = price)
    }
}
