// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Payment repository.
//!
//! Completing a payment touches three collections: the payment is recorded,
//! the paid selection is removed and the listing's enrollment counters move.
//! All three writes share one redb write transaction, so a failure at any
//! step leaves nothing behind.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::store::{
    insert_in, remove_in, update_in, DocumentStore, StorageError, StorageResult, LISTINGS,
    PAYMENTS, PAYMENT_TRANSACTIONS, SELECTIONS,
};
use super::listings::Listing;
use crate::models::{email_key, DocumentId, InsertResult, PaymentCompletion, RecordPaymentRequest};

/// Payment stored in the `payments` collection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: DocumentId,
    pub email: String,
    /// Amount paid, in dollars.
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// Selection that was paid for.
    pub course: DocumentId,
    /// Listing the student enrolled in.
    pub class_id: DocumentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub date: DateTime<Utc>,
}

pub struct PaymentRepository<'a> {
    store: &'a DocumentStore,
}

impl<'a> PaymentRepository<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    /// A student's payments, newest first.
    pub fn list_by_email(&self, email: &str) -> StorageResult<Vec<Payment>> {
        let key = email_key(email);
        let mut payments: Vec<Payment> = self
            .store
            .scan(PAYMENTS, |payment: &Payment| email_key(&payment.email) == key)?;
        payments.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(payments)
    }

    /// Record a payment, drop the paid selection and enroll the student.
    ///
    /// A missing selection or listing does not abort the completion; it shows
    /// up as a zero count in the returned results. A reused transaction id
    /// fails with [`StorageError::AlreadyExists`] and writes nothing.
    pub fn complete(&self, request: RecordPaymentRequest) -> StorageResult<PaymentCompletion> {
        let payment = Payment {
            id: DocumentId::generate(),
            email: request.email.trim().to_string(),
            amount: request.amount,
            transaction_id: request
                .transaction_id
                .map(|transaction_id| transaction_id.trim().to_string()),
            course: request.course,
            class_id: request.class_id,
            class_name: request.class_name,
            date: request.date.unwrap_or_else(Utc::now),
        };

        let write_txn = self.store.begin_write()?;

        if let Some(transaction_id) = &payment.transaction_id {
            let mut transactions = write_txn.open_table(PAYMENT_TRANSACTIONS)?;
            if transactions.get(transaction_id.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!(
                    "Payment for transaction {transaction_id}"
                )));
            }
            transactions.insert(transaction_id.as_str(), payment.id.as_str())?;
        }

        insert_in(&write_txn, PAYMENTS, payment.id.as_str(), &payment)?;
        let delete_result = remove_in(&write_txn, SELECTIONS, payment.course.as_str())?;
        let update_result = update_in(
            &write_txn,
            LISTINGS,
            payment.class_id.as_str(),
            |listing: &mut Listing| listing.enroll(),
        )?;

        write_txn.commit()?;

        if delete_result.deleted_count == 0 {
            tracing::warn!(
                payment_id = %payment.id,
                selection_id = %payment.course,
                "paid selection was not found"
            );
        }
        if update_result.matched_count == 0 {
            tracing::warn!(
                payment_id = %payment.id,
                listing_id = %payment.class_id,
                "paid listing was not found; enrollment not counted"
            );
        }
        tracing::info!(
            payment_id = %payment.id,
            listing_id = %payment.class_id,
            amount = payment.amount,
            "payment recorded"
        );

        Ok(PaymentCompletion {
            insert_result: InsertResult::new(payment.id),
            delete_result,
            update_result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateListingRequest, CreateSelectionRequest, DeleteResult, UpdateResult};
    use crate::storage::repository::{ListingRepository, SelectionRepository};
    use chrono::TimeZone;

    fn temp_store() -> (DocumentStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(&dir.path().join("payments.redb")).unwrap();
        (store, dir)
    }

    fn seed(store: &DocumentStore) -> (Listing, DocumentId) {
        let listing = ListingRepository::new(store)
            .create(CreateListingRequest {
                class_name: "Cricket".into(),
                image: None,
                instructor_name: None,
                email: "coach@example.com".into(),
                available_seats: 10,
                price: 45.0,
            })
            .unwrap();
        let selection = SelectionRepository::new(store)
            .create(CreateSelectionRequest {
                email: "kid@example.com".into(),
                class_id: listing.id.clone(),
                class_name: Some("Cricket".into()),
                instructor_name: None,
                image: None,
                price: Some(45.0),
            })
            .unwrap();
        (listing, selection.id)
    }

    fn payment_request(
        course: &DocumentId,
        class_id: &DocumentId,
        transaction_id: Option<&str>,
    ) -> RecordPaymentRequest {
        RecordPaymentRequest {
            email: "kid@example.com".into(),
            amount: 45.0,
            transaction_id: transaction_id.map(str::to_string),
            course: course.clone(),
            class_id: class_id.clone(),
            class_name: Some("Cricket".into()),
            date: None,
        }
    }

    #[test]
    fn complete_applies_all_three_writes() {
        let (store, _dir) = temp_store();
        let (listing, selection_id) = seed(&store);
        let repo = PaymentRepository::new(&store);

        let completion = repo
            .complete(payment_request(&selection_id, &listing.id, Some("pi_1")))
            .unwrap();
        assert_eq!(completion.delete_result, DeleteResult::new(true));
        assert_eq!(completion.update_result, UpdateResult::matched(true));

        let stored = repo.list_by_email("kid@example.com").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, completion.insert_result.inserted_id);
        assert_eq!(stored[0].transaction_id.as_deref(), Some("pi_1"));

        assert!(SelectionRepository::new(&store)
            .get(&selection_id)
            .unwrap()
            .is_none());
        let listing = ListingRepository::new(&store).get(&listing.id).unwrap().unwrap();
        assert_eq!(listing.num_students, 1);
        assert_eq!(listing.available_seats, 9);
    }

    #[test]
    fn complete_with_missing_documents_reports_zero_counts() {
        let (store, _dir) = temp_store();
        let repo = PaymentRepository::new(&store);

        let completion = repo
            .complete(payment_request(
                &DocumentId::generate(),
                &DocumentId::generate(),
                None,
            ))
            .unwrap();
        assert_eq!(completion.delete_result.deleted_count, 0);
        assert_eq!(completion.update_result, UpdateResult::unmatched());
        assert_eq!(repo.list_by_email("kid@example.com").unwrap().len(), 1);
    }

    #[test]
    fn reused_transaction_id_writes_nothing() {
        let (store, _dir) = temp_store();
        let (listing, selection_id) = seed(&store);
        let repo = PaymentRepository::new(&store);

        repo.complete(payment_request(&selection_id, &listing.id, Some("pi_1")))
            .unwrap();
        let err = repo
            .complete(payment_request(&selection_id, &listing.id, Some("pi_1")))
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));

        assert_eq!(repo.list_by_email("kid@example.com").unwrap().len(), 1);
        let listing = ListingRepository::new(&store).get(&listing.id).unwrap().unwrap();
        assert_eq!(listing.num_students, 1);
    }

    #[test]
    fn concurrent_completions_enroll_every_student() {
        let (store, _dir) = temp_store();
        let listing = ListingRepository::new(&store)
            .create(CreateListingRequest {
                class_name: "Rowing".into(),
                image: None,
                instructor_name: None,
                email: "coach@example.com".into(),
                available_seats: 5,
                price: 30.0,
            })
            .unwrap();

        std::thread::scope(|scope| {
            for n in 0..20 {
                let store = &store;
                let class_id = &listing.id;
                scope.spawn(move || {
                    let tx = format!("pi_{n}");
                    PaymentRepository::new(store)
                        .complete(payment_request(&DocumentId::generate(), class_id, Some(&tx)))
                        .unwrap();
                });
            }
        });

        let listing = ListingRepository::new(&store).get(&listing.id).unwrap().unwrap();
        assert_eq!(listing.num_students, 20);
        assert_eq!(listing.available_seats, -15);
        assert_eq!(
            PaymentRepository::new(&store)
                .list_by_email("kid@example.com")
                .unwrap()
                .len(),
            20
        );
    }

    #[test]
    fn list_by_email_is_newest_first() {
        let (store, _dir) = temp_store();
        let repo = PaymentRepository::new(&store);

        for day in [3, 9, 5] {
            let mut request =
                payment_request(&DocumentId::generate(), &DocumentId::generate(), None);
            request.date = Some(Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap());
            repo.complete(request).unwrap();
        }

        let days: Vec<String> = repo
            .list_by_email("KID@example.com")
            .unwrap()
            .iter()
            .map(|payment| payment.date.format("%d").to_string())
            .collect();
        assert_eq!(days, vec!["09", "05", "03"]);
    }
}
