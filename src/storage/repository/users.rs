// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! Users are created on first sign-in and never deleted. Email uniqueness is
//! enforced through the `user_emails` index, written in the same transaction
//! as the user document.

use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::store::{insert_in, DocumentStore, StorageResult, USERS, USER_EMAILS};
use crate::auth::Role;
use crate::models::{email_key, DocumentId, RegisterUserRequest, UpdateResult};

/// User stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct User {
    pub id: DocumentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// `None` for regular students.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

/// Result of a sign-in registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// A user with that email already existed (its id).
    Existing(String),
    Created(User),
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    store: &'a DocumentStore,
}

impl<'a> UserRepository<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    /// List all users (admin view).
    pub fn list_all(&self) -> StorageResult<Vec<User>> {
        self.store.scan(USERS, |_: &User| true)
    }

    pub fn get(&self, id: &DocumentId) -> StorageResult<Option<User>> {
        self.store.get(USERS, id.as_str())
    }

    /// Look up a user by email (case-insensitive).
    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        match self.store.lookup(USER_EMAILS, &email_key(email))? {
            Some(id) => self.store.get(USERS, &id),
            None => Ok(None),
        }
    }

    /// Insert the user unless the email is already registered.
    pub fn register(&self, request: RegisterUserRequest) -> StorageResult<RegisterOutcome> {
        let user = User {
            id: DocumentId::generate(),
            name: request.name,
            email: request.email.trim().to_string(),
            photo: request.photo,
            role: None,
        };
        let key = email_key(&user.email);

        let write_txn = self.store.begin_write()?;
        {
            let mut emails = write_txn.open_table(USER_EMAILS)?;
            let existing = emails.get(key.as_str())?.map(|id| id.value().to_string());
            if let Some(existing) = existing {
                return Ok(RegisterOutcome::Existing(existing));
            }
            emails.insert(key.as_str(), user.id.as_str())?;
        }
        insert_in(&write_txn, USERS, user.id.as_str(), &user)?;
        write_txn.commit()?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(RegisterOutcome::Created(user))
    }

    /// Set the user's role.
    pub fn set_role(&self, id: &DocumentId, role: Role) -> StorageResult<UpdateResult> {
        let result = self
            .store
            .update(USERS, id.as_str(), |user: &mut User| user.role = Some(role))?;
        if result.modified_count > 0 {
            tracing::info!(user_id = %id, role = %role, "user role changed");
        }
        Ok(result)
    }
}
