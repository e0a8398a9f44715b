// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sports Academy Server - Class enrollment and payments API
//!
//! Students pick classes offered by instructors, pay for them through Stripe
//! and get enrolled. Admins moderate listings and promote users.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Access tokens (HS256 JWT) and role checks
//! - `providers` - Stripe payment intents
//! - `storage` - Embedded document store (redb) and repositories

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod providers;
pub mod state;
pub mod storage;
