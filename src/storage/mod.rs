// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Document Storage Module
//!
//! Persistent storage for users, class listings, selections and payments in
//! an embedded redb database. Each collection is a table of JSON documents
//! keyed by [`DocumentId`](crate::models::DocumentId).
//!
//! ## Layout
//!
//! ```text
//! users                 id -> User
//! user_emails           email -> user id
//! listings              id -> Listing
//! selections            id -> Selection
//! payments              id -> Payment
//! payment_transactions  transaction id -> payment id
//! ```
//!
//! The store is opened once at startup and shared through `AppState`.
//! Repositories borrow it per request.

pub mod repository;
pub mod store;

pub use repository::{
    Listing, ListingRepository, ListingStatus, Payment, PaymentRepository, RegisterOutcome,
    Selection, SelectionRepository, User, UserRepository,
};
pub use store::{DocumentStore, StorageError, StorageResult};
