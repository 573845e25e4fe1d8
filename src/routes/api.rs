//! Resource routes mounted under /api/v1. Collection paths answer with and without a trailing slash.

use crate::handlers::{amenities, auth, places, reviews, users};
use crate::openapi::ApiDoc;
use crate::state::AppState;
use axum::{
    routing::{get, post, MethodRouter},
    Json, Router,
};
use utoipa::OpenApi;

fn with_slash(router: Router<AppState>, path: &str, method: MethodRouter<AppState>) -> Router<AppState> {
    router.route(path, method.clone()).route(&format!("{}/", path), method)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn api_routes(state: AppState) -> Router {
    let router = Router::new();
    let router = with_slash(router, "/users", post(users::create_user).get(users::list_users));
    let router = with_slash(
        router,
        "/users/:user_id",
        get(users::get_user).put(users::update_user).delete(users::delete_user),
    );
    let router = with_slash(router, "/users/:user_id/places", get(users::list_user_places));
    let router = with_slash(router, "/users/:user_id/reviews", get(users::list_user_reviews));

    let router = with_slash(router, "/places", post(places::create_place).get(places::list_places));
    let router = with_slash(
        router,
        "/places/:place_id",
        get(places::get_place).put(places::update_place).delete(places::delete_place),
    );
    let router = with_slash(router, "/places/:place_id/reviews", get(places::list_place_reviews));
    let router = with_slash(
        router,
        "/places/:place_id/amenities",
        get(places::list_place_amenities).post(places::link_amenity),
    );
    let router = with_slash(
        router,
        "/places/:place_id/amenities/:amenity_id",
        axum::routing::delete(places::unlink_amenity),
    );

    let router = with_slash(router, "/reviews", post(reviews::create_review).get(reviews::list_reviews));
    let router = with_slash(
        router,
        "/reviews/:review_id",
        get(reviews::get_review).put(reviews::update_review).delete(reviews::delete_review),
    );

    let router = with_slash(
        router,
        "/amenities",
        post(amenities::create_amenity).get(amenities::list_amenities),
    );
    let router = with_slash(
        router,
        "/amenities/:amenity_id",
        get(amenities::get_amenity)
            .put(amenities::update_amenity)
            .delete(amenities::delete_amenity),
    );

    let router = with_slash(router, "/auth/login", post(auth::login));
    let router = with_slash(router, "/auth/me", get(auth::me));

    router.route("/openapi.json", get(openapi_json)).with_state(state)
}
