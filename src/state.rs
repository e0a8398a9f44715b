// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenService;
use crate::providers::StripeClient;
use crate::storage::DocumentStore;

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub tokens: Arc<TokenService>,
    /// `None` when no payment secret key is configured.
    pub payments: Option<Arc<StripeClient>>,
    pub require_admin_for_mutations: bool,
}

impl AppState {
    pub fn new(store: DocumentStore, tokens: TokenService) -> Self {
        Self {
            store: Arc::new(store),
            tokens: Arc::new(tokens),
            payments: None,
            require_admin_for_mutations: false,
        }
    }

    pub fn with_payments(mut self, client: StripeClient) -> Self {
        self.payments = Some(Arc::new(client));
        self
    }

    pub fn with_require_admin_for_mutations(mut self, enabled: bool) -> Self {
        self.require_admin_for_mutations = enabled;
        self
    }
}

/// State backed by a throwaway store; keep the directory alive for the test.
#[cfg(test)]
pub(crate) fn test_state() -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = DocumentStore::open(&dir.path().join("test.redb")).expect("open store");
    (AppState::new(store, TokenService::new("test-secret")), dir)
}
