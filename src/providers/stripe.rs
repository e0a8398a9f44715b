// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stripe integration for card payment intents.
//!
//! Only the payment-intent creation call is used: the browser confirms the
//! intent with the returned client secret and then reports the completed
//! payment to `POST /payments`.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::config::AppConfig;

const PAYMENT_INTENTS_PATH: &str = "/v1/payment_intents";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub const DEFAULT_CURRENCY: &str = "usd";
pub const DEFAULT_PAYMENT_METHOD: &str = "card";

#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    #[error("Stripe request failed: {0}")]
    Request(String),

    #[error("Stripe returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Stripe response was invalid: {0}")]
    InvalidResponse(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// Payment intent as returned by Stripe.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    api_base_url: Url,
    secret_key: String,
    http: Client,
}

impl StripeClient {
    pub fn new(api_base_url: Url, secret_key: impl Into<String>) -> Result<Self, StripeError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StripeError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_base_url,
            secret_key: secret_key.into(),
            http,
        })
    }

    /// Build a client when a secret key is configured.
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, StripeError> {
        match &config.payment_secret_key {
            Some(key) => Self::new(config.stripe_api_base_url.clone(), key.clone()).map(Some),
            None => Ok(None),
        }
    }

    /// Create a payment intent for `amount_minor` units of `currency`.
    pub async fn create_payment_intent(
        &self,
        amount_minor: u64,
        currency: &str,
        payment_method_types: &[&str],
    ) -> Result<PaymentIntent, StripeError> {
        let url = self.endpoint(PAYMENT_INTENTS_PATH);

        let mut form: Vec<(&str, String)> = vec![
            ("amount", amount_minor.to_string()),
            ("currency", currency.to_string()),
        ];
        for method in payment_method_types {
            form.push(("payment_method_types[]", (*method).to_string()));
        }

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| StripeError::Request(format!("POST {PAYMENT_INTENTS_PATH} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StripeErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(StripeError::Api { status, message });
        }

        let intent: PaymentIntent = response.json().await.map_err(|e| {
            StripeError::InvalidResponse(format!("POST {PAYMENT_INTENTS_PATH} invalid JSON: {e}"))
        })?;

        tracing::info!(intent_id = %intent.id, amount_minor, currency, "payment intent created");
        Ok(intent)
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}{}",
            self.api_base_url.as_str().trim_end_matches('/'),
            path
        )
    }
}

/// Convert a dollar price to minor units (cents), rounding to the nearest cent.
pub fn to_minor_units(price: f64) -> Result<u64, StripeError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(StripeError::InvalidAmount(format!(
            "price must be a positive number, got {price}"
        )));
    }
    let minor = (price * 100.0).round();
    if minor < 1.0 || minor > u64::MAX as f64 {
        return Err(StripeError::InvalidAmount(format!(
            "price {price} is out of range"
        )));
    }
    Ok(minor as u64)
}
