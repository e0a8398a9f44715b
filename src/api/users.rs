// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.
//!
//! `/users/admin/{key}` and `/users/instructor/{key}` take an email on GET
//! and a user id on PATCH.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    api::extract::ValidJson,
    auth::{AdminOnly, Auth, AuthenticatedUser, MutationGuard, Role},
    error::ApiError,
    models::{
        AdminStatusResponse, DocumentId, InsertResult, InstructorStatusResponse,
        RegisterUserRequest, RegisterUserResponse, UpdateResult,
    },
    state::AppState,
    storage::{RegisterOutcome, User, UserRepository},
};

/// List every user.
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_users(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = UserRepository::new(&state.store).list_all()?;
    Ok(Json(users))
}

/// Register a user on first sign-in.
///
/// Registering an email that already exists writes nothing.
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = RegisterUserRequest,
    responses(
        (status = 200, description = "Inserted, or existing user", body = RegisterUserResponse),
        (status = 400, description = "Invalid email")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<RegisterUserRequest>,
) -> Result<Json<RegisterUserResponse>, ApiError> {
    let outcome = UserRepository::new(&state.store).register(request)?;
    let response = match outcome {
        RegisterOutcome::Existing(_) => RegisterUserResponse::existing(),
        RegisterOutcome::Created(user) => RegisterUserResponse::Created(InsertResult::new(user.id)),
    };
    Ok(Json(response))
}

fn stored_role_of(
    state: &AppState,
    caller: &AuthenticatedUser,
    email: &str,
) -> Result<Option<Role>, ApiError> {
    // Asking about someone else always answers false
    if !caller.is_email(email) {
        return Ok(None);
    }
    let user = UserRepository::new(&state.store).find_by_email(email)?;
    Ok(user.and_then(|user| user.role))
}

/// Whether the caller is an admin.
#[utoipa::path(
    get,
    path = "/users/admin/{key}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("key" = String, Path, description = "Email of the caller")),
    responses(
        (status = 200, description = "Admin flag", body = AdminStatusResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn admin_status(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<AdminStatusResponse>, ApiError> {
    let role = stored_role_of(&state, &user, &email)?;
    Ok(Json(AdminStatusResponse {
        admin: role == Some(Role::Admin),
    }))
}

/// Whether the caller is an instructor.
#[utoipa::path(
    get,
    path = "/users/instructor/{key}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("key" = String, Path, description = "Email of the caller")),
    responses(
        (status = 200, description = "Instructor flag", body = InstructorStatusResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn instructor_status(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<InstructorStatusResponse>, ApiError> {
    let role = stored_role_of(&state, &user, &email)?;
    Ok(Json(InstructorStatusResponse {
        instructor: role == Some(Role::Instructor),
    }))
}

/// Promote a user to admin.
#[utoipa::path(
    patch,
    path = "/users/admin/{key}",
    tag = "Users",
    params(("key" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Update counts", body = UpdateResult),
        (status = 400, description = "Invalid id")
    )
)]
pub async fn make_admin(
    _guard: MutationGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UpdateResult>, ApiError> {
    let id = DocumentId::parse(&id)?;
    let result = UserRepository::new(&state.store).set_role(&id, Role::Admin)?;
    Ok(Json(result))
}

/// Promote a user to instructor.
#[utoipa::path(
    patch,
    path = "/users/instructor/{key}",
    tag = "Users",
    params(("key" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Update counts", body = UpdateResult),
        (status = 400, description = "Invalid id")
    )
)]
pub async fn make_instructor(
    _guard: MutationGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UpdateResult>, ApiError> {
    let id = DocumentId::parse(&id)?;
    let result = UserRepository::new(&state.store).set_role(&id, Role::Instructor)?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;
    use axum::http::StatusCode;

    fn caller(email: &str) -> Auth {
        Auth(AuthenticatedUser {
            email: email.to_string(),
            issued_at: 0,
            expires_at: 0,
        })
    }

    fn signup(email: &str) -> ValidJson<RegisterUserRequest> {
        ValidJson(RegisterUserRequest {
            name: Some("Sam".to_string()),
            email: email.to_string(),
            photo: None,
        })
    }

    async fn registered_id(state: &AppState, email: &str) -> DocumentId {
        let Json(response) = register_user(State(state.clone()), signup(email))
            .await
            .unwrap();
        match response {
            RegisterUserResponse::Created(result) => result.inserted_id,
            RegisterUserResponse::Existing { .. } => panic!("expected a new user"),
        }
    }

    #[tokio::test]
    async fn second_registration_reports_existing_user() {
        let (state, _dir) = test_state();
        registered_id(&state, "sam@example.com").await;

        let Json(response) = register_user(State(state.clone()), signup("sam@example.com"))
            .await
            .unwrap();
        assert_eq!(response, RegisterUserResponse::existing());

        let users = UserRepository::new(&state.store).list_all().unwrap();
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn admin_status_follows_role() {
        let (state, _dir) = test_state();
        let id = registered_id(&state, "sam@example.com").await;

        let Json(status) = admin_status(
            caller("sam@example.com"),
            State(state.clone()),
            Path("sam@example.com".to_string()),
        )
        .await
        .unwrap();
        assert!(!status.admin);

        let Json(promoted) = make_admin(
            MutationGuard(None),
            State(state.clone()),
            Path(id.to_string()),
        )
        .await
        .unwrap();
        assert_eq!(promoted, UpdateResult::matched(true));

        let Json(status) = admin_status(
            caller("sam@example.com"),
            State(state.clone()),
            Path("sam@example.com".to_string()),
        )
        .await
        .unwrap();
        assert!(status.admin);
    }

    #[tokio::test]
    async fn status_for_someone_else_is_false() {
        let (state, _dir) = test_state();
        let id = registered_id(&state, "coach@example.com").await;
        let Json(promoted) =
            make_instructor(MutationGuard(None), State(state.clone()), Path(id.to_string()))
                .await
                .unwrap();
        assert_eq!(promoted, UpdateResult::matched(true));

        let Json(status) = instructor_status(
            caller("other@example.com"),
            State(state.clone()),
            Path("coach@example.com".to_string()),
        )
        .await
        .unwrap();
        assert!(!status.instructor);

        let Json(status) = instructor_status(
            caller("coach@example.com"),
            State(state),
            Path("coach@example.com".to_string()),
        )
        .await
        .unwrap();
        assert!(status.instructor);
    }

    #[tokio::test]
    async fn promotion_reports_counts_and_rejects_bad_ids() {
        let (state, _dir) = test_state();

        let Json(result) = make_admin(
            MutationGuard(None),
            State(state.clone()),
            Path(DocumentId::generate().to_string()),
        )
        .await
        .unwrap();
        assert_eq!(result.matched_count, 0);

        let err = make_admin(MutationGuard(None), State(state), Path("nope".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
