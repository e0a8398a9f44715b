// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};

use crate::models::email_key;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Email the token was issued for.
    pub email: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

/// Authenticated caller extracted from a verified token.
///
/// This is the type handlers receive from the [`Auth`](super::Auth)
/// extractor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub email: String,
    /// Issued at (Unix seconds)
    pub issued_at: i64,
    /// Token expiration (Unix seconds)
    pub expires_at: i64,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            email: claims.email,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }

    /// Whether the token was issued for `email`, compared by [`email_key`].
    pub fn is_email(&self, email: &str) -> bool {
        email_key(&self.email) == email_key(email)
    }
}
