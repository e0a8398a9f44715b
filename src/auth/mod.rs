// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Access tokens are HS256 JWTs issued by `POST /jwt` and signed with the
//! configured `ACCESS_TOKEN_SECRET`.
//!
//! ## Auth Flow
//!
//! 1. Client exchanges its email for a token at `POST /jwt`
//! 2. Client sends `Authorization: Bearer <token>`
//! 3. Server:
//!    - Verifies signature and expiry (60 second clock skew tolerance)
//!    - Extracts the `email` claim as the caller's identity
//!    - For admin routes, looks the email up and checks the stored role
//!
//! Tokens expire after one hour. There is no refresh flow; clients request a
//! new token.

pub mod claims;
pub mod error;
pub mod extractor;
pub mod roles;
pub mod token;

pub use claims::{AuthenticatedUser, TokenClaims};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth, MutationGuard};
pub use roles::Role;
pub use token::TokenService;
