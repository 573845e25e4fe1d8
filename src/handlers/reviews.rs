//! /api/v1/reviews

use super::{authenticated, authorize, json_body, parse_body, parse_id};
use crate::authz::{Caller, Resource, ResourceKind};
use crate::dto::{views, CreateReviewRequest, MessageView, ReviewView};
use crate::error::{AppError, ErrorBody};
use crate::models::{NewReview, Review, ReviewPatch};
use crate::response::{success_many, success_one, success_one_ok, Many, One, SuccessMany, SuccessOne};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

fn not_found() -> AppError {
    AppError::NotFound("Review not found".into())
}

async fn authored_review(state: &AppState, caller: &Caller, raw_id: &str) -> Result<Review, AppError> {
    authenticated(caller)?;
    let id = parse_id(raw_id, "Review")?;
    let review = state.facade.get_review(id).await?.ok_or_else(not_found)?;
    authorize(
        caller,
        Resource::Owned {
            kind: ResourceKind::Review,
            owner_id: review.user_id(),
        },
        &[],
    )?;
    Ok(review)
}

/// The caller is the author. Owners cannot review their own place and nobody reviews a place twice.
#[utoipa::path(
    post,
    path = "/api/v1/reviews/",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = SuccessOne<ReviewView>),
        (status = 400, description = "Invalid input, own place or already reviewed", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "Place not found", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "reviews",
    operation_id = "createReview"
)]
pub async fn create_review(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<One<ReviewView>, AppError> {
    let caller_id = authenticated(&caller)?;
    let req: CreateReviewRequest = parse_body(json_body(payload)?)?;
    let place = state
        .facade
        .get_place(req.place_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Place not found".into()))?;
    let already_reviewed = state
        .facade
        .get_review_by_user_and_place(caller_id, place.id())
        .await?
        .is_some();
    authorize(
        &caller,
        Resource::ReviewTarget {
            place_owner_id: place.owner_id(),
            already_reviewed,
        },
        &[],
    )?;
    let review = state
        .facade
        .create_review(NewReview {
            text: req.text,
            rating: req.rating,
            place_id: place.id(),
            user_id: caller_id,
        })
        .await?;
    Ok(success_one(ReviewView::from(&review)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reviews/",
    responses((status = 200, description = "All reviews", body = SuccessMany<ReviewView>)),
    tag = "reviews",
    operation_id = "listReviews"
)]
pub async fn list_reviews(State(state): State<AppState>) -> Result<Many<ReviewView>, AppError> {
    let reviews = state.facade.get_all_reviews().await?;
    Ok(success_many(views(&reviews)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reviews/{review_id}",
    params(("review_id" = String, Path, description = "Review id")),
    responses(
        (status = 200, description = "The review", body = SuccessOne<ReviewView>),
        (status = 404, description = "Review not found", body = ErrorBody)
    ),
    tag = "reviews",
    operation_id = "getReview"
)]
pub async fn get_review(State(state): State<AppState>, Path(id): Path<String>) -> Result<One<ReviewView>, AppError> {
    let id = parse_id(&id, "Review")?;
    let review = state.facade.get_review(id).await?.ok_or_else(not_found)?;
    Ok(success_one_ok(ReviewView::from(&review)))
}

#[utoipa::path(
    put,
    path = "/api/v1/reviews/{review_id}",
    params(("review_id" = String, Path, description = "Review id")),
    request_body = ReviewPatch,
    responses(
        (status = 200, description = "Review updated", body = SuccessOne<ReviewView>),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Not the author", body = ErrorBody),
        (status = 404, description = "Review not found", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "reviews",
    operation_id = "updateReview"
)]
pub async fn update_review(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<One<ReviewView>, AppError> {
    let review = authored_review(&state, &caller, &id).await?;
    let patch: ReviewPatch = parse_body(json_body(payload)?)?;
    let review = state
        .facade
        .update_review(review.id(), patch)
        .await?
        .ok_or_else(not_found)?;
    Ok(success_one_ok(ReviewView::from(&review)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/reviews/{review_id}",
    params(("review_id" = String, Path, description = "Review id")),
    responses(
        (status = 200, description = "Review deleted", body = SuccessOne<MessageView>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Not the author", body = ErrorBody),
        (status = 404, description = "Review not found", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "reviews",
    operation_id = "deleteReview"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<One<MessageView>, AppError> {
    let review = authored_review(&state, &caller, &id).await?;
    if !state.facade.delete_review(review.id()).await? {
        return Err(not_found());
    }
    Ok(success_one_ok(MessageView::new("Review deleted successfully")))
}
