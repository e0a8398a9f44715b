// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require a valid token:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;
use crate::storage::UserRepository;

/// Extractor for authenticated users.
///
/// Validates the bearer token from the Authorization header.
///
/// # Example
///
/// ```rust,ignore
/// async fn list_payments(
///     Auth(user): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<Vec<Payment>>, ApiError> {
///     // user.email is the token's email claim
/// }
/// ```
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::InvalidAuthHeader)?;

        let user = state.tokens.verify(token)?;
        tracing::debug!(email = %user.email, "request authenticated");

        Ok(Auth(user))
    }
}

/// Extractor that requires the caller's stored role to be Admin.
pub struct AdminOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        let stored = UserRepository::new(&state.store)
            .find_by_email(&user.email)
            .map_err(|e| AuthError::InternalError(e.to_string()))?;

        if !stored.is_some_and(|stored| stored.is_admin()) {
            tracing::warn!(email = %user.email, "admin route refused");
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(user))
    }
}

/// Gate for moderation and promotion routes.
///
/// Open unless `REQUIRE_ADMIN_FOR_MUTATIONS` is enabled, in which case it
/// behaves like [`AdminOnly`].
pub struct MutationGuard(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for MutationGuard {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if !state.require_admin_for_mutations {
            return Ok(MutationGuard(None));
        }
        let AdminOnly(user) = AdminOnly::from_request_parts(parts, state).await?;
        Ok(MutationGuard(Some(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::models::RegisterUserRequest;
    use crate::state::test_state;
    use crate::storage::RegisterOutcome;
    use axum::http::Request;

    fn parts_with_token(token: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn register(state: &AppState, email: &str, role: Option<Role>) {
        let repo = UserRepository::new(&state.store);
        let RegisterOutcome::Created(user) = repo
            .register(RegisterUserRequest {
                name: None,
                email: email.to_string(),
                photo: None,
            })
            .unwrap()
        else {
            panic!("expected a new user");
        };
        if let Some(role) = role {
            repo.set_role(&user.id, role).unwrap();
        }
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _dir) = test_state();
        let mut parts = parts_with_token(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_non_bearer_header() {
        let (state, _dir) = test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .header("Authorization", "Basic abc")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_issued_token() {
        let (state, _dir) = test_state();
        let token = state.tokens.issue("sam@example.com").unwrap();
        let mut parts = parts_with_token(Some(&token));

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.email, "sam@example.com");
    }

    #[tokio::test]
    async fn auth_extractor_requires_token_even_with_user_extension() {
        let (state, _dir) = test_state();
        let mut parts = parts_with_token(None);
        parts.extensions.insert(AuthenticatedUser {
            email: "sam@example.com".to_string(),
            issued_at: 0,
            expires_at: 0,
        });

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn admin_only_checks_stored_role() {
        let (state, _dir) = test_state();
        register(&state, "admin@example.com", Some(Role::Admin));
        register(&state, "coach@example.com", Some(Role::Instructor));

        let token = state.tokens.issue("admin@example.com").unwrap();
        let mut parts = parts_with_token(Some(&token));
        assert!(AdminOnly::from_request_parts(&mut parts, &state).await.is_ok());

        let token = state.tokens.issue("coach@example.com").unwrap();
        let mut parts = parts_with_token(Some(&token));
        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));

        let token = state.tokens.issue("ghost@example.com").unwrap();
        let mut parts = parts_with_token(Some(&token));
        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn mutation_guard_is_open_by_default() {
        let (state, _dir) = test_state();
        let mut parts = parts_with_token(None);

        let MutationGuard(user) = MutationGuard::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn mutation_guard_requires_admin_when_enabled() {
        let (state, _dir) = test_state();
        let state = state.with_require_admin_for_mutations(true);
        let mut parts = parts_with_token(None);

        let result = MutationGuard::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));

        register(&state, "admin@example.com", Some(Role::Admin));
        let token = state.tokens.issue("admin@example.com").unwrap();
        let mut parts = parts_with_token(Some(&token));
        let MutationGuard(user) = MutationGuard::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(user.map(|u| u.email).as_deref(), Some("admin@example.com"));
    }
}
