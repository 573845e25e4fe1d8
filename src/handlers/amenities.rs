//! /api/v1/amenities

use super::{authorize, json_body, parse_body, parse_id};
use crate::authz::{Caller, Resource};
use crate::dto::{views, AmenityView, CreateAmenityRequest, MessageView};
use crate::error::{AppError, ErrorBody};
use crate::models::AmenityPatch;
use crate::response::{success_many, success_one, success_one_ok, Many, One, SuccessMany, SuccessOne};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

fn not_found() -> AppError {
    AppError::NotFound("Amenity not found".into())
}

#[utoipa::path(
    post,
    path = "/api/v1/amenities/",
    request_body = CreateAmenityRequest,
    responses(
        (status = 201, description = "Amenity created", body = SuccessOne<AmenityView>),
        (status = 400, description = "Invalid input or duplicate name", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Admin privileges required", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "amenities",
    operation_id = "createAmenity"
)]
pub async fn create_amenity(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<One<AmenityView>, AppError> {
    authorize(&caller, Resource::AdminOnly, &[])?;
    let req: CreateAmenityRequest = parse_body(json_body(payload)?)?;
    let amenity = state.facade.create_amenity(req.name).await?;
    Ok(success_one(AmenityView::from(&amenity)))
}

#[utoipa::path(
    get,
    path = "/api/v1/amenities/",
    responses((status = 200, description = "All amenities", body = SuccessMany<AmenityView>)),
    tag = "amenities",
    operation_id = "listAmenities"
)]
pub async fn list_amenities(State(state): State<AppState>) -> Result<Many<AmenityView>, AppError> {
    let amenities = state.facade.get_all_amenities().await?;
    Ok(success_many(views(&amenities)))
}

#[utoipa::path(
    get,
    path = "/api/v1/amenities/{amenity_id}",
    params(("amenity_id" = String, Path, description = "Amenity id")),
    responses(
        (status = 200, description = "The amenity", body = SuccessOne<AmenityView>),
        (status = 404, description = "Amenity not found", body = ErrorBody)
    ),
    tag = "amenities",
    operation_id = "getAmenity"
)]
pub async fn get_amenity(State(state): State<AppState>, Path(id): Path<String>) -> Result<One<AmenityView>, AppError> {
    let id = parse_id(&id, "Amenity")?;
    let amenity = state.facade.get_amenity(id).await?.ok_or_else(not_found)?;
    Ok(success_one_ok(AmenityView::from(&amenity)))
}

#[utoipa::path(
    put,
    path = "/api/v1/amenities/{amenity_id}",
    params(("amenity_id" = String, Path, description = "Amenity id")),
    request_body = AmenityPatch,
    responses(
        (status = 200, description = "Amenity updated", body = SuccessOne<AmenityView>),
        (status = 400, description = "Invalid input or duplicate name", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Admin privileges required", body = ErrorBody),
        (status = 404, description = "Amenity not found", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "amenities",
    operation_id = "updateAmenity"
)]
pub async fn update_amenity(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<One<AmenityView>, AppError> {
    authorize(&caller, Resource::AdminOnly, &[])?;
    let id = parse_id(&id, "Amenity")?;
    let patch: AmenityPatch = parse_body(json_body(payload)?)?;
    let amenity = state.facade.update_amenity(id, patch).await?.ok_or_else(not_found)?;
    Ok(success_one_ok(AmenityView::from(&amenity)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/amenities/{amenity_id}",
    params(("amenity_id" = String, Path, description = "Amenity id")),
    responses(
        (status = 200, description = "Amenity deleted and unlinked from every place", body = SuccessOne<MessageView>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Admin privileges required", body = ErrorBody),
        (status = 404, description = "Amenity not found", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "amenities",
    operation_id = "deleteAmenity"
)]
pub async fn delete_amenity(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<One<MessageView>, AppError> {
    authorize(&caller, Resource::AdminOnly, &[])?;
    let id = parse_id(&id, "Amenity")?;
    if !state.facade.delete_amenity(id).await? {
        return Err(not_found());
    }
    Ok(success_one_ok(MessageView::new("Amenity deleted successfully")))
}
