//! /api/v1/users

use super::{authenticated, authorize, json_body, parse_body, parse_id, requested_fields};
use crate::authz::{Caller, Resource, ResourceKind};
use crate::dto::{views, CreateUserRequest, MessageView, PlaceView, ReviewView, UserView};
use crate::error::{AppError, ErrorBody};
use crate::models::UserPatch;
use crate::response::{success_many, success_one, success_one_ok, Many, One, SuccessMany, SuccessOne};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

fn not_found() -> AppError {
    AppError::NotFound("User not found".into())
}

#[utoipa::path(
    post,
    path = "/api/v1/users/",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = SuccessOne<UserView>),
        (status = 400, description = "Invalid input or email already registered", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Admin privileges required", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "users",
    operation_id = "createUser"
)]
pub async fn create_user(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<One<UserView>, AppError> {
    authorize(&caller, Resource::AdminOnly, &[])?;
    let req: CreateUserRequest = parse_body(json_body(payload)?)?;
    let user = state.facade.create_user(req.into()).await?;
    Ok(success_one(UserView::from(&user)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/",
    responses((status = 200, description = "All users", body = SuccessMany<UserView>)),
    tag = "users",
    operation_id = "listUsers"
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Many<UserView>, AppError> {
    let users = state.facade.get_all_users().await?;
    Ok(success_many(views(&users)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = SuccessOne<UserView>),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    tag = "users",
    operation_id = "getUser"
)]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Result<One<UserView>, AppError> {
    let id = parse_id(&id, "User")?;
    let user = state.facade.get_user(id).await?.ok_or_else(not_found)?;
    Ok(success_one_ok(UserView::from(&user)))
}

/// Users may edit their own names; email, password and admin flag need an admin.
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = String, Path, description = "User id")),
    request_body = UserPatch,
    responses(
        (status = 200, description = "User updated", body = SuccessOne<UserView>),
        (status = 400, description = "Invalid input, protected field or duplicate email", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Not the user", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "users",
    operation_id = "updateUser"
)]
pub async fn update_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<One<UserView>, AppError> {
    authenticated(&caller)?;
    let id = parse_id(&id, "User")?;
    state.facade.get_user(id).await?.ok_or_else(not_found)?;
    let body = json_body(payload)?;
    authorize(
        &caller,
        Resource::Owned {
            kind: ResourceKind::User,
            owner_id: id,
        },
        &requested_fields(&body),
    )?;
    let patch: UserPatch = parse_body(body)?;
    let user = state.facade.update_user(id, patch).await?.ok_or_else(not_found)?;
    Ok(success_one_ok(UserView::from(&user)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User and everything they own deleted", body = SuccessOne<MessageView>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Admin privileges required", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "users",
    operation_id = "deleteUser"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<One<MessageView>, AppError> {
    authorize(&caller, Resource::AdminOnly, &[])?;
    let id = parse_id(&id, "User")?;
    if !state.facade.delete_user(id).await? {
        return Err(not_found());
    }
    Ok(success_one_ok(MessageView::new("User deleted successfully")))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/places",
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Places owned by the user", body = SuccessMany<PlaceView>),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    tag = "users",
    operation_id = "listUserPlaces"
)]
pub async fn list_user_places(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Many<PlaceView>, AppError> {
    let id = parse_id(&id, "User")?;
    let places = state.facade.get_places_by_owner(id).await?.ok_or_else(not_found)?;
    Ok(success_many(views(&places)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/reviews",
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Reviews written by the user", body = SuccessMany<ReviewView>),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    tag = "users",
    operation_id = "listUserReviews"
)]
pub async fn list_user_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Many<ReviewView>, AppError> {
    let id = parse_id(&id, "User")?;
    let reviews = state.facade.get_reviews_by_user(id).await?.ok_or_else(not_found)?;
    Ok(success_many(views(&reviews)))
}
