// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the document store.
//!
//! Each repository provides the operations for one collection, using the
//! [`DocumentStore`](super::DocumentStore) for all reads and writes.

pub mod listings;
pub mod payments;
pub mod selections;
pub mod users;

pub use listings::{Listing, ListingRepository, ListingStatus};
pub use payments::{Payment, PaymentRepository};
pub use selections::{Selection, SelectionRepository};
pub use users::{RegisterOutcome, User, UserRepository};
