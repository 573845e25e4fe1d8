//! Request bodies and response views. Views never expose password hashes.

use crate::models::{Amenity, NewUser, Place, Review, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        NewUser {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password: req.password,
            is_admin: req.is_admin,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePlaceRequest {
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Defaults to the caller. Only admins may name another owner.
    pub owner_id: Option<Uuid>,
    /// Amenities to link on creation.
    #[serde(default)]
    pub amenities: Vec<Uuid>,
}

/// The author is always the caller.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub text: String,
    pub rating: i32,
    pub place_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAmenityRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LinkAmenityRequest {
    pub amenity_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserView {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(u: &User) -> Self {
        UserView {
            id: u.id(),
            first_name: u.first_name().to_string(),
            last_name: u.last_name().to_string(),
            email: u.email().to_string(),
            is_admin: u.is_admin(),
            created_at: u.created_at(),
            updated_at: u.updated_at(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaceView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Place> for PlaceView {
    fn from(p: &Place) -> Self {
        PlaceView {
            id: p.id(),
            title: p.title().to_string(),
            description: p.description().map(str::to_string),
            price: p.price(),
            latitude: p.latitude(),
            longitude: p.longitude(),
            owner_id: p.owner_id(),
            created_at: p.created_at(),
            updated_at: p.updated_at(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OwnerView {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&User> for OwnerView {
    fn from(u: &User) -> Self {
        OwnerView {
            id: u.id(),
            first_name: u.first_name().to_string(),
            last_name: u.last_name().to_string(),
            email: u.email().to_string(),
        }
    }
}

/// A place with its owner and amenities embedded.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlaceDetailView {
    #[serde(flatten)]
    pub place: PlaceView,
    /// Absent only if the owner row vanished concurrently.
    pub owner: Option<OwnerView>,
    pub amenities: Vec<AmenityView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewView {
    pub id: Uuid,
    pub text: String,
    pub rating: i32,
    pub place_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Review> for ReviewView {
    fn from(r: &Review) -> Self {
        ReviewView {
            id: r.id(),
            text: r.text().to_string(),
            rating: r.rating(),
            place_id: r.place_id(),
            user_id: r.user_id(),
            created_at: r.created_at(),
            updated_at: r.updated_at(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AmenityView {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Amenity> for AmenityView {
    fn from(a: &Amenity) -> Self {
        AmenityView {
            id: a.id(),
            name: a.name().to_string(),
            created_at: a.created_at(),
            updated_at: a.updated_at(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenView {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until expiry.
    pub expires_in: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageView {
    pub message: String,
}

impl MessageView {
    pub fn new(message: impl Into<String>) -> Self {
        MessageView {
            message: message.into(),
        }
    }
}

pub fn views<'a, T: 'a, V: From<&'a T>>(items: &'a [T]) -> Vec<V> {
    items.iter().map(V::from).collect()
}
