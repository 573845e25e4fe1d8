//! /api/v1/auth

use super::{authenticated, json_body, parse_body};
use crate::authz::Caller;
use crate::dto::{LoginRequest, TokenView, UserView};
use crate::error::{AppError, ErrorBody};
use crate::response::{success_one_ok, One, SuccessOne};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token issued", body = SuccessOne<TokenView>),
        (status = 400, description = "Malformed body", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    ),
    tag = "auth",
    operation_id = "login"
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<One<TokenView>, AppError> {
    let req: LoginRequest = parse_body(json_body(payload)?)?;
    let user = state
        .facade
        .authenticate(&req.email, &req.password)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("Invalid credentials".into()))?;
    let access_token = state.tokens.issue(user.id(), user.is_admin())?;
    tracing::info!(user_id = %user.id(), "token issued");
    Ok(success_one_ok(TokenView {
        access_token,
        token_type: "Bearer".into(),
        expires_in: state.tokens.ttl().num_seconds(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "The authenticated user", body = SuccessOne<UserView>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "User no longer exists", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "auth",
    operation_id = "me"
)]
pub async fn me(State(state): State<AppState>, caller: Caller) -> Result<One<UserView>, AppError> {
    let id = authenticated(&caller)?;
    let user = state
        .facade
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(success_one_ok(UserView::from(&user)))
}
