//! OpenAPI document served at /api/v1/openapi.json.

use crate::dto::{
    AmenityView, CreateAmenityRequest, CreatePlaceRequest, CreateReviewRequest, CreateUserRequest,
    LinkAmenityRequest, LoginRequest, MessageView, OwnerView, PlaceDetailView, PlaceView, ReviewView, TokenView,
    UserView,
};
use crate::error::{ErrorBody, ErrorDetail};
use crate::handlers::{amenities, auth, places, reviews, users};
use crate::models::{AmenityPatch, PlacePatch, ReviewPatch, UserPatch};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Registers the JWT bearer scheme referenced by protected operations.
struct BearerAddon;

impl Modify for BearerAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token from POST /api/v1/auth/login."))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&BearerAddon),
    info(
        title = "HBnB API",
        description = "Users, places, reviews and amenities with JWT bearer authentication."
    ),
    paths(
        users::create_user,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::list_user_places,
        users::list_user_reviews,
        places::create_place,
        places::list_places,
        places::get_place,
        places::update_place,
        places::delete_place,
        places::list_place_reviews,
        places::list_place_amenities,
        places::link_amenity,
        places::unlink_amenity,
        reviews::create_review,
        reviews::list_reviews,
        reviews::get_review,
        reviews::update_review,
        reviews::delete_review,
        amenities::create_amenity,
        amenities::list_amenities,
        amenities::get_amenity,
        amenities::update_amenity,
        amenities::delete_amenity,
        auth::login,
        auth::me,
    ),
    components(schemas(
        CreateUserRequest,
        CreatePlaceRequest,
        CreateReviewRequest,
        CreateAmenityRequest,
        LinkAmenityRequest,
        LoginRequest,
        UserPatch,
        PlacePatch,
        ReviewPatch,
        AmenityPatch,
        UserView,
        PlaceView,
        PlaceDetailView,
        OwnerView,
        ReviewView,
        AmenityView,
        TokenView,
        MessageView,
        ErrorBody,
        ErrorDetail,
    )),
    tags(
        (name = "users", description = "User accounts"),
        (name = "places", description = "Places and their amenities"),
        (name = "reviews", description = "Reviews of places"),
        (name = "amenities", description = "Amenity catalogue"),
        (name = "auth", description = "Login and current user")
    )
)]
pub struct ApiDoc;
