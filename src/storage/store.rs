// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded document store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user id → JSON document
//! - `user_emails`: email → user id (uniqueness index)
//! - `listings`: listing id → JSON document
//! - `selections`: selection id → JSON document
//! - `payments`: payment id → JSON document
//! - `payment_transactions`: provider transaction id → payment id
//!
//! redb serializes write transactions, so read-modify-write sequences inside
//! one [`redb::WriteTransaction`] never interleave with another writer.

use std::path::Path;

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::models::{DeleteResult, UpdateResult};

// =============================================================================
// Table Definitions
// =============================================================================

/// A collection of JSON documents keyed by document id.
pub type Collection = TableDefinition<'static, &'static str, &'static [u8]>;

/// A string → string index.
pub type Index = TableDefinition<'static, &'static str, &'static str>;

pub const USERS: Collection = TableDefinition::new("users");
pub const USER_EMAILS: Index = TableDefinition::new("user_emails");
pub const LISTINGS: Collection = TableDefinition::new("listings");
pub const SELECTIONS: Collection = TableDefinition::new("selections");
pub const PAYMENTS: Collection = TableDefinition::new("payments");
pub const PAYMENT_TRANSACTIONS: Index = TableDefinition::new("payment_transactions");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("already exists: {0}")]
    AlreadyExists(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// DocumentStore
// =============================================================================

/// Process-wide document store.
pub struct DocumentStore {
    db: Database,
}

impl DocumentStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USER_EMAILS)?;
            let _ = write_txn.open_table(LISTINGS)?;
            let _ = write_txn.open_table(SELECTIONS)?;
            let _ = write_txn.open_table(PAYMENTS)?;
            let _ = write_txn.open_table(PAYMENT_TRANSACTIONS)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "document store opened");
        Ok(Self { db })
    }

    /// Check that a read transaction can be opened.
    pub fn ping(&self) -> StorageResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(USERS)?;
        Ok(())
    }

    pub(crate) fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // =========================================================================
    // Single-collection operations
    // =========================================================================

    /// Fetch one document by id.
    pub fn get<T: DeserializeOwned>(&self, collection: Collection, id: &str) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(collection)?;
        let doc = match table.get(id)? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };
        Ok(doc)
    }

    /// Resolve a key through an index table.
    pub fn lookup(&self, index: Index, key: &str) -> StorageResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(index)?;
        let value = table.get(key)?.map(|value| value.value().to_string());
        Ok(value)
    }

    /// Scan a collection, keeping documents accepted by `keep`.
    pub fn scan<T, F>(&self, collection: Collection, mut keep: F) -> StorageResult<Vec<T>>
    where
        T: DeserializeOwned,
        F: FnMut(&T) -> bool,
    {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(collection)?;

        let mut docs = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let doc: T = serde_json::from_slice(value.value())?;
            if keep(&doc) {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    /// Insert a document under a fresh id.
    pub fn insert<T: Serialize>(&self, collection: Collection, id: &str, doc: &T) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        insert_in(&write_txn, collection, id, doc)?;
        write_txn.commit()?;
        Ok(())
    }

    /// Apply `mutate` to one document and persist it if it changed.
    pub fn update<T, F>(&self, collection: Collection, id: &str, mutate: F) -> StorageResult<UpdateResult>
    where
        T: Serialize + DeserializeOwned + Clone + PartialEq,
        F: FnOnce(&mut T),
    {
        let write_txn = self.db.begin_write()?;
        let result = update_in(&write_txn, collection, id, mutate)?;
        write_txn.commit()?;
        Ok(result)
    }

    /// Delete one document by id.
    pub fn remove(&self, collection: Collection, id: &str) -> StorageResult<DeleteResult> {
        let write_txn = self.db.begin_write()?;
        let result = remove_in(&write_txn, collection, id)?;
        write_txn.commit()?;
        Ok(result)
    }
}

// =============================================================================
// Transaction-scoped helpers
// =============================================================================

/// Insert inside an open write transaction. Fails if the id is taken.
pub(crate) fn insert_in<T: Serialize>(
    write_txn: &WriteTransaction,
    collection: Collection,
    id: &str,
    doc: &T,
) -> StorageResult<()> {
    let json = serde_json::to_vec(doc)?;
    let mut table = write_txn.open_table(collection)?;
    if table.get(id)?.is_some() {
        return Err(StorageError::AlreadyExists(format!("Document {id}")));
    }
    table.insert(id, json.as_slice())?;
    Ok(())
}

/// Read-modify-write inside an open write transaction.
pub(crate) fn update_in<T, F>(
    write_txn: &WriteTransaction,
    collection: Collection,
    id: &str,
    mutate: F,
) -> StorageResult<UpdateResult>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq,
    F: FnOnce(&mut T),
{
    let mut table = write_txn.open_table(collection)?;

    // Copy the bytes out before mutating the table
    let existing_bytes = match table.get(id)? {
        Some(existing) => existing.value().to_vec(),
        None => return Ok(UpdateResult::unmatched()),
    };

    let before: T = serde_json::from_slice(&existing_bytes)?;
    let mut doc = before.clone();
    mutate(&mut doc);

    if doc == before {
        return Ok(UpdateResult::matched(false));
    }

    let json = serde_json::to_vec(&doc)?;
    table.insert(id, json.as_slice())?;
    Ok(UpdateResult::matched(true))
}

/// Delete inside an open write transaction.
pub(crate) fn remove_in(
    write_txn: &WriteTransaction,
    collection: Collection,
    id: &str,
) -> StorageResult<DeleteResult> {
    let mut table = write_txn.open_table(collection)?;
    let removed = table.remove(id)?.is_some();
    Ok(DeleteResult::new(removed))
}

// =============================================================================
// Tests
// =============================================================================
