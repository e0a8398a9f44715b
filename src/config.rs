// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the process environment at startup (a `.env`
//! file in the working directory is loaded first when present).
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `5000` |
//! | `DATABASE_PATH` | redb document store file | `./data/sports.redb` |
//! | `ACCESS_TOKEN_SECRET` | HS256 secret for issuing and verifying tokens | Required |
//! | `PAYMENT_SECRET_KEY` | Stripe secret key | Optional (payments disabled) |
//! | `STRIPE_API_BASE_URL` | Stripe API base URL | `https://api.stripe.com` |
//! | `REQUIRE_ADMIN_FOR_MUTATIONS` | Require an Admin token on moderation and promotion routes | `false` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; HTTPS is served when both are set | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;

use url::Url;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";
pub const ACCESS_TOKEN_SECRET_ENV: &str = "ACCESS_TOKEN_SECRET";
pub const PAYMENT_SECRET_KEY_ENV: &str = "PAYMENT_SECRET_KEY";
pub const STRIPE_API_BASE_URL_ENV: &str = "STRIPE_API_BASE_URL";
pub const REQUIRE_ADMIN_FOR_MUTATIONS_ENV: &str = "REQUIRE_ADMIN_FOR_MUTATIONS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATABASE_PATH: &str = "./data/sports.redb";
pub const DEFAULT_STRIPE_API_BASE_URL: &str = "https://api.stripe.com";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variable `{0}` is not set")]
    Missing(&'static str),

    #[error("environment variable `{name}` is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// PEM certificate and key used when serving HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Typed view of the process environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub access_token_secret: String,
    pub payment_secret_key: Option<String>,
    pub stripe_api_base_url: Url,
    pub require_admin_for_mutations: bool,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    name: HOST_ENV,
                    reason: e.to_string(),
                })?;

        let database_path = PathBuf::from(
            get(DATABASE_PATH_ENV).unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
        );

        let access_token_secret =
            get(ACCESS_TOKEN_SECRET_ENV).ok_or(ConfigError::Missing(ACCESS_TOKEN_SECRET_ENV))?;

        let stripe_raw = get(STRIPE_API_BASE_URL_ENV)
            .unwrap_or_else(|| DEFAULT_STRIPE_API_BASE_URL.to_string());
        let stripe_api_base_url = Url::parse(&stripe_raw).map_err(|e| ConfigError::Invalid {
            name: STRIPE_API_BASE_URL_ENV,
            reason: e.to_string(),
        })?;

        let require_admin_for_mutations = match get(REQUIRE_ADMIN_FOR_MUTATIONS_ENV) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                name: REQUIRE_ADMIN_FOR_MUTATIONS_ENV,
                reason: format!("expected true/false, got `{raw}`"),
            })?,
            None => false,
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            bind_addr,
            database_path,
            access_token_secret,
            payment_secret_key: get(PAYMENT_SECRET_KEY_ENV),
            stripe_api_base_url,
            require_admin_for_mutations,
            tls,
            log_format,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
