//! HTTP handlers: one module per resource.

pub mod amenities;
pub mod auth;
pub mod places;
pub mod reviews;
pub mod users;

use crate::authz::{decide, Caller, Resource};
use crate::error::AppError;
use crate::models::ValidationError;
use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

/// Ids that are not UUIDs cannot name anything, so they are reported as missing.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{} not found", what)))
}

/// Unwrap a JSON body, turning axum's rejection into our error envelope.
pub(crate) fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    match payload {
        Ok(Json(value @ Value::Object(_))) => Ok(value),
        Ok(_) => Err(ValidationError::new("body", "must be a JSON object").into()),
        Err(rejection) => Err(ValidationError::new("body", rejection.body_text()).into()),
    }
}

pub(crate) fn parse_body<T: DeserializeOwned>(body: Value) -> Result<T, AppError> {
    serde_json::from_value(body).map_err(|e| ValidationError::new("body", e.to_string()).into())
}

/// Top-level keys of a JSON object body.
pub(crate) fn requested_fields(body: &Value) -> Vec<&str> {
    body.as_object()
        .map(|m| m.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

/// Rejects anonymous callers and returns the caller's id.
pub(crate) fn authenticated(caller: &Caller) -> Result<Uuid, AppError> {
    decide(caller, &Resource::AnyAuthenticated, &[]).into_result()?;
    caller
        .id()
        .ok_or_else(|| AppError::Unauthenticated("authentication required".into()))
}

pub(crate) fn authorize(caller: &Caller, resource: Resource, fields: &[&str]) -> Result<(), AppError> {
    Ok(decide(caller, &resource, fields).into_result()?)
}
