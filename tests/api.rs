//! Black-box tests: drive the router in-process against in-memory storage.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use hbnb::models::NewUser;
use hbnb::{app, AppState, TokenService};
use serde_json::{json, Value};
use tower::ServiceExt;

const ADMIN_EMAIL: &str = "admin@hbnb.io";
const ADMIN_PASSWORD: &str = "admin-pass";

struct TestApp {
    router: Router,
    admin_token: String,
}

impl TestApp {
    async fn new() -> Self {
        let state = AppState::in_memory(TokenService::new("test-secret", Duration::minutes(15)));
        state
            .facade
            .ensure_admin(NewUser {
                first_name: "Admin".into(),
                last_name: "HBnB".into(),
                email: ADMIN_EMAIL.into(),
                password: ADMIN_PASSWORD.into(),
                is_admin: true,
            })
            .await
            .unwrap();
        let router = app(state, 64 * 1024);
        let mut test_app = TestApp {
            router,
            admin_token: String::new(),
        };
        test_app.admin_token = test_app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        test_app
    }

    async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, value)
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({"email": email, "password": password})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["access_token"].as_str().unwrap().to_string()
    }

    /// Creates a user as admin and returns (id, token).
    async fn user(&self, first_name: &str, email: &str) -> (String, String) {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/users/",
                Some(&self.admin_token),
                Some(json!({
                    "first_name": first_name,
                    "last_name": "Tester",
                    "email": email,
                    "password": "pw-123456"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let id = body["data"]["id"].as_str().unwrap().to_string();
        (id, self.login(email, "pw-123456").await)
    }

    async fn place(&self, token: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/places/",
                Some(token),
                Some(json!({
                    "title": "Sea view flat",
                    "description": "Bright and quiet",
                    "price": 95.0,
                    "latitude": 43.3,
                    "longitude": 5.37
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

fn message(body: &Value) -> &str {
    body["error"]["message"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn review_rules_over_http() {
    let app = TestApp::new().await;
    let (owner_id, owner) = app.user("Ann", "ann@example.com").await;
    let (_, reviewer) = app.user("Bob", "bob@example.com").await;
    let place_id = app.place(&owner).await;

    let review = json!({"text": "Lovely", "rating": 5, "place_id": place_id});
    let (status, body) = app
        .call(Method::POST, "/api/v1/reviews/", Some(&reviewer), Some(review.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["rating"], 5);
    let review_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .call(Method::POST, "/api/v1/reviews/", Some(&reviewer), Some(review.clone()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(message(&body).contains("already reviewed"), "{body}");

    let (status, body) = app
        .call(Method::POST, "/api/v1/reviews/", Some(&owner), Some(review))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(message(&body).contains("cannot review your own place"), "{body}");

    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/api/v1/reviews/{review_id}"),
            Some(&app.admin_token),
            Some(json!({"text": "Edited by admin"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["text"], "Edited by admin");

    let (status, _) = app
        .call(
            Method::PUT,
            &format!("/api/v1/reviews/{review_id}"),
            Some(&owner),
            Some(json!({"rating": 1})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call(Method::GET, &format!("/api/v1/places/{place_id}/reviews"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 1);

    let (status, body) = app
        .call(Method::GET, &format!("/api/v1/users/{owner_id}/places"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], place_id.as_str());
}

#[tokio::test]
async fn admin_can_edit_someone_elses_place() {
    let app = TestApp::new().await;
    let (owner_id, owner) = app.user("Cleo", "cleo@example.com").await;
    let (_, stranger) = app.user("Dan", "dan@example.com").await;
    let place_id = app.place(&owner).await;
    let uri = format!("/api/v1/places/{place_id}");

    let (status, _) = app
        .call(Method::PUT, &uri, Some(&stranger), Some(json!({"price": 1.0})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call(
            Method::PUT,
            &uri,
            Some(&app.admin_token),
            Some(json!({"title": "Renamed by admin", "price": 120.0})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["title"], "Renamed by admin");
    assert_eq!(body["data"]["price"], 120.0);
    assert_eq!(body["data"]["owner_id"], owner_id.as_str());

    let (status, body) = app.call(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Renamed by admin");
}

#[tokio::test]
async fn rating_out_of_range_is_rejected() {
    let app = TestApp::new().await;
    let (_, owner) = app.user("Ann", "ann@example.com").await;
    let (_, reviewer) = app.user("Bob", "bob@example.com").await;
    let place_id = app.place(&owner).await;
    for rating in [0, 6] {
        let (status, _) = app
            .call(
                Method::POST,
                "/api/v1/reviews/",
                Some(&reviewer),
                Some(json!({"text": "Meh", "rating": rating, "place_id": place_id})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn email_changes_need_an_admin() {
    let app = TestApp::new().await;
    let (ann_id, ann) = app.user("Ann", "ann@example.com").await;
    app.user("Bob", "bob@example.com").await;
    let uri = format!("/api/v1/users/{ann_id}");

    let (status, body) = app
        .call(Method::PUT, &uri, Some(&ann), Some(json!({"email": "ann@new.example.com"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(message(&body).contains("email"), "{body}");

    let (status, body) = app
        .call(Method::PUT, &uri, Some(&ann), Some(json!({"first_name": "Annie"})))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["first_name"], "Annie");

    let (status, body) = app
        .call(
            Method::PUT,
            &uri,
            Some(&app.admin_token),
            Some(json!({"email": "Ann@New.Example.com"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["email"], "ann@new.example.com");
    assert!(body["data"].get("password_hash").is_none());

    let (status, _) = app
        .call(Method::PUT, &uri, Some(&app.admin_token), Some(json!({"email": "bob@example.com"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(Method::PUT, &uri, Some(&app.admin_token), Some(json!({"nickname": "A"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn authentication_and_ownership_errors() {
    let app = TestApp::new().await;
    let (_, ann) = app.user("Ann", "ann@example.com").await;
    let (_, bob) = app.user("Bob", "bob@example.com").await;
    let place_id = app.place(&ann).await;
    let uri = format!("/api/v1/places/{place_id}");

    let (status, _) = app
        .call(Method::PUT, &uri, None, Some(json!({"price": 10.0})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(Method::PUT, &uri, Some(&bob), Some(json!({"price": 10.0})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call(Method::PUT, &uri, Some(&ann), Some(json!({"price": 10.0})))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["price"], 10.0);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/users/",
            Some(&ann),
            Some(json!({"first_name": "C", "last_name": "D", "email": "c@d.io", "password": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.call(Method::GET, "/api/v1/places/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.call(Method::GET, "/api/v1/places/", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "ann@example.com", "password": "wrong"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.call(Method::GET, "/api/v1/auth/me", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "bob@example.com");
}

#[tokio::test]
async fn amenities_and_place_detail() {
    let app = TestApp::new().await;
    let (ann_id, ann) = app.user("Ann", "ann@example.com").await;
    let place_id = app.place(&ann).await;

    let (status, _) = app
        .call(Method::POST, "/api/v1/amenities/", Some(&ann), Some(json!({"name": "Wi-Fi"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/amenities/",
            Some(&app.admin_token),
            Some(json!({"name": "Wi-Fi"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let wifi_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/amenities",
            Some(&app.admin_token),
            Some(json!({"name": "Wi-Fi"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/v1/places/{place_id}/amenities"),
            Some(&ann),
            Some(json!({"amenity_id": wifi_id})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["meta"]["count"], 1);

    let (status, body) = app
        .call(Method::GET, &format!("/api/v1/places/{place_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["owner"]["id"], ann_id.as_str());
    assert_eq!(body["data"]["amenities"][0]["name"], "Wi-Fi");

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/v1/places/{place_id}/amenities/{wifi_id}"),
            Some(&ann),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(Method::GET, &format!("/api/v1/places/{place_id}/amenities"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 0);
}

#[tokio::test]
async fn deleting_a_user_removes_what_they_own() {
    let app = TestApp::new().await;
    let (ann_id, ann) = app.user("Ann", "ann@example.com").await;
    let (bob_id, bob) = app.user("Bob", "bob@example.com").await;
    let anns_place = app.place(&ann).await;
    let bobs_place = app.place(&bob).await;

    for (token, place) in [(&bob, &anns_place), (&ann, &bobs_place)] {
        let (status, _) = app
            .call(
                Method::POST,
                "/api/v1/reviews/",
                Some(token),
                Some(json!({"text": "Fine", "rating": 4, "place_id": place})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/v1/users/{ann_id}"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/v1/users/{ann_id}"), Some(&app.admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .call(Method::GET, &format!("/api/v1/places/{anns_place}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.call(Method::GET, "/api/v1/reviews/", None, None).await;
    assert_eq!(body["meta"]["count"], 0);

    let (status, body) = app
        .call(Method::GET, &format!("/api/v1/users/{bob_id}/places"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 1);
}

#[tokio::test]
async fn operational_routes() {
    let app = TestApp::new().await;
    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app.call(Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storage"], "memory");

    let (status, body) = app.call(Method::GET, "/api/v1/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/api/v1/reviews/").is_some());
}
