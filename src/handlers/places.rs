//! /api/v1/places

use super::{authenticated, authorize, json_body, parse_body, parse_id, requested_fields};
use crate::authz::{Caller, Resource, ResourceKind};
use crate::dto::{
    views, AmenityView, CreatePlaceRequest, LinkAmenityRequest, MessageView, OwnerView, PlaceDetailView,
    PlaceView, ReviewView,
};
use crate::error::{AppError, ErrorBody};
use crate::models::{NewPlace, Place, PlacePatch, ValidationError};
use crate::response::{success_many, success_one, success_one_ok, Many, One, SuccessMany, SuccessOne};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

fn not_found() -> AppError {
    AppError::NotFound("Place not found".into())
}

/// Loads the place and checks that the caller owns it (or is an admin).
async fn owned_place(state: &AppState, caller: &Caller, raw_id: &str, fields: &[&str]) -> Result<Place, AppError> {
    authenticated(caller)?;
    let id = parse_id(raw_id, "Place")?;
    let place = state.facade.get_place(id).await?.ok_or_else(not_found)?;
    authorize(
        caller,
        Resource::Owned {
            kind: ResourceKind::Place,
            owner_id: place.owner_id(),
        },
        fields,
    )?;
    Ok(place)
}

#[utoipa::path(
    post,
    path = "/api/v1/places/",
    request_body = CreatePlaceRequest,
    responses(
        (status = 201, description = "Place created", body = SuccessOne<PlaceView>),
        (status = 400, description = "Invalid input or unknown owner", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Only admins may create places for other users", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "places",
    operation_id = "createPlace"
)]
pub async fn create_place(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<One<PlaceView>, AppError> {
    let caller_id = authenticated(&caller)?;
    let req: CreatePlaceRequest = parse_body(json_body(payload)?)?;
    let owner_id = req.owner_id.unwrap_or(caller_id);
    authorize(
        &caller,
        Resource::Owned {
            kind: ResourceKind::Place,
            owner_id,
        },
        &[],
    )?;
    for amenity_id in &req.amenities {
        if state.facade.get_amenity(*amenity_id).await?.is_none() {
            return Err(ValidationError::new("amenities", format!("unknown amenity {}", amenity_id)).into());
        }
    }
    let place = state
        .facade
        .create_place(NewPlace {
            title: req.title,
            description: req.description,
            price: req.price,
            latitude: req.latitude,
            longitude: req.longitude,
            owner_id,
        })
        .await?;
    for amenity_id in req.amenities {
        state.facade.add_amenity_to_place(place.id(), amenity_id).await?;
    }
    Ok(success_one(PlaceView::from(&place)))
}

#[utoipa::path(
    get,
    path = "/api/v1/places/",
    responses((status = 200, description = "All places", body = SuccessMany<PlaceView>)),
    tag = "places",
    operation_id = "listPlaces"
)]
pub async fn list_places(State(state): State<AppState>) -> Result<Many<PlaceView>, AppError> {
    let places = state.facade.get_all_places().await?;
    Ok(success_many(views(&places)))
}

#[utoipa::path(
    get,
    path = "/api/v1/places/{place_id}",
    params(("place_id" = String, Path, description = "Place id")),
    responses(
        (status = 200, description = "The place with its owner and amenities", body = SuccessOne<PlaceDetailView>),
        (status = 404, description = "Place not found", body = ErrorBody)
    ),
    tag = "places",
    operation_id = "getPlace"
)]
pub async fn get_place(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<One<PlaceDetailView>, AppError> {
    let id = parse_id(&id, "Place")?;
    let place = state.facade.get_place(id).await?.ok_or_else(not_found)?;
    let owner = state.facade.get_user(place.owner_id()).await?;
    let amenities = state.facade.get_place_amenities(id).await?.unwrap_or_default();
    Ok(success_one_ok(PlaceDetailView {
        place: PlaceView::from(&place),
        owner: owner.as_ref().map(OwnerView::from),
        amenities: views(&amenities),
    }))
}

#[utoipa::path(
    put,
    path = "/api/v1/places/{place_id}",
    params(("place_id" = String, Path, description = "Place id")),
    request_body = PlacePatch,
    responses(
        (status = 200, description = "Place updated", body = SuccessOne<PlaceView>),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Place not found", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "places",
    operation_id = "updatePlace"
)]
pub async fn update_place(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<One<PlaceView>, AppError> {
    authenticated(&caller)?;
    let body = json_body(payload)?;
    let place = owned_place(&state, &caller, &id, &requested_fields(&body)).await?;
    let patch: PlacePatch = parse_body(body)?;
    let place = state
        .facade
        .update_place(place.id(), patch)
        .await?
        .ok_or_else(not_found)?;
    Ok(success_one_ok(PlaceView::from(&place)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/places/{place_id}",
    params(("place_id" = String, Path, description = "Place id")),
    responses(
        (status = 200, description = "Place and its reviews deleted", body = SuccessOne<MessageView>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Place not found", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "places",
    operation_id = "deletePlace"
)]
pub async fn delete_place(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<One<MessageView>, AppError> {
    let place = owned_place(&state, &caller, &id, &[]).await?;
    if !state.facade.delete_place(place.id()).await? {
        return Err(not_found());
    }
    Ok(success_one_ok(MessageView::new("Place deleted successfully")))
}

#[utoipa::path(
    get,
    path = "/api/v1/places/{place_id}/reviews",
    params(("place_id" = String, Path, description = "Place id")),
    responses(
        (status = 200, description = "Reviews of the place", body = SuccessMany<ReviewView>),
        (status = 404, description = "Place not found", body = ErrorBody)
    ),
    tag = "places",
    operation_id = "listPlaceReviews"
)]
pub async fn list_place_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Many<ReviewView>, AppError> {
    let id = parse_id(&id, "Place")?;
    let reviews = state.facade.get_reviews_by_place(id).await?.ok_or_else(not_found)?;
    Ok(success_many(views(&reviews)))
}

#[utoipa::path(
    get,
    path = "/api/v1/places/{place_id}/amenities",
    params(("place_id" = String, Path, description = "Place id")),
    responses(
        (status = 200, description = "Amenities of the place", body = SuccessMany<AmenityView>),
        (status = 404, description = "Place not found", body = ErrorBody)
    ),
    tag = "places",
    operation_id = "listPlaceAmenities"
)]
pub async fn list_place_amenities(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Many<AmenityView>, AppError> {
    let id = parse_id(&id, "Place")?;
    let amenities = state.facade.get_place_amenities(id).await?.ok_or_else(not_found)?;
    Ok(success_many(views(&amenities)))
}

#[utoipa::path(
    post,
    path = "/api/v1/places/{place_id}/amenities",
    params(("place_id" = String, Path, description = "Place id")),
    request_body = LinkAmenityRequest,
    responses(
        (status = 200, description = "Amenities of the place after linking", body = SuccessMany<AmenityView>),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Place or amenity not found", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "places",
    operation_id = "linkPlaceAmenity"
)]
pub async fn link_amenity(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Many<AmenityView>, AppError> {
    let place = owned_place(&state, &caller, &id, &[]).await?;
    let req: LinkAmenityRequest = parse_body(json_body(payload)?)?;
    state.facade.add_amenity_to_place(place.id(), req.amenity_id).await?;
    let amenities = state
        .facade
        .get_place_amenities(place.id())
        .await?
        .ok_or_else(not_found)?;
    Ok(success_many(views(&amenities)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/places/{place_id}/amenities/{amenity_id}",
    params(
        ("place_id" = String, Path, description = "Place id"),
        ("amenity_id" = String, Path, description = "Amenity id")
    ),
    responses(
        (status = 200, description = "Amenity unlinked", body = SuccessOne<MessageView>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Place not found or amenity not linked", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "places",
    operation_id = "unlinkPlaceAmenity"
)]
pub async fn unlink_amenity(
    State(state): State<AppState>,
    caller: Caller,
    Path((id, amenity_id)): Path<(String, String)>,
) -> Result<One<MessageView>, AppError> {
    let place = owned_place(&state, &caller, &id, &[]).await?;
    let not_linked = || AppError::NotFound("Amenity not linked to this place".into());
    let amenity_id = parse_id(&amenity_id, "Amenity").map_err(|_| not_linked())?;
    if !state.facade.remove_amenity_from_place(place.id(), amenity_id).await? {
        return Err(not_linked());
    }
    Ok(success_one_ok(MessageView::new("Amenity removed from place")))
}
