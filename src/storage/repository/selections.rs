// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Selection repository.
//!
//! A selection is a student's unpaid pick of a class. It is removed when the
//! student pays for it or drops it.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::store::{DocumentStore, StorageResult, SELECTIONS};
use crate::models::{email_key, CreateSelectionRequest, DeleteResult, DocumentId};

/// Selection stored in the `selections` collection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub id: DocumentId,
    /// Student email.
    pub email: String,
    /// Listing the student picked.
    pub class_id: DocumentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

pub struct SelectionRepository<'a> {
    store: &'a DocumentStore,
}

impl<'a> SelectionRepository<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    /// Selections made by a student.
    pub fn list_by_email(&self, email: &str) -> StorageResult<Vec<Selection>> {
        let key = email_key(email);
        self.store
            .scan(SELECTIONS, |selection: &Selection| email_key(&selection.email) == key)
    }

    pub fn get(&self, id: &DocumentId) -> StorageResult<Option<Selection>> {
        self.store.get(SELECTIONS, id.as_str())
    }

    pub fn create(&self, request: CreateSelectionRequest) -> StorageResult<Selection> {
        let selection = Selection {
            id: DocumentId::generate(),
            email: request.email.trim().to_string(),
            class_id: request.class_id,
            class_name: request.class_name,
            instructor_name: request.instructor_name,
            image: request.image,
            price: request.price,
        };
        self.store
            .insert(SELECTIONS, selection.id.as_str(), &selection)?;
        tracing::debug!(selection_id = %selection.id, class_id = %selection.class_id, "class selected");
        Ok(selection)
    }

    pub fn delete(&self, id: &DocumentId) -> StorageResult<DeleteResult> {
        self.store.remove(SELECTIONS, id.as_str())
    }
}
