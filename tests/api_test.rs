use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use coursehub::api::router;
use coursehub::state::AppState;

async fn setup_app() -> Router {
    let pool: SqlitePool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test db");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    router(AppState { db: pool })
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &Router, username: &str) -> String {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/students/register",
            None,
            Some(json!({"username": username})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["api_token"].as_str().unwrap().to_string()
}

/// Creates subject + course for `token`, returning (course_id, module_id).
async fn seed_course_with_module(app: &Router, token: &str) -> (String, String) {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/subjects",
            Some(token),
            Some(json!({"title": "Programming", "slug": "programming"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let subject_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/courses",
            Some(token),
            Some(json!({
                "subject_id": subject_id,
                "title": "Rust Intro",
                "slug": "rust-intro",
                "overview": "Learn Rust"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let course_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/courses/{course_id}/modules"),
            Some(token),
            Some(json!([{"title": "Basics", "description": "First steps"}])),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let modules = body_json(response).await;
    let module_id = modules[0]["id"].as_str().unwrap().to_string();
    assert_eq!(modules[0]["order"], 0);

    (course_id, module_id)
}

#[tokio::test]
async fn test_health() {
    let app = setup_app().await;
    let response = app.oneshot(request("GET", "/health", None, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_writes_require_authentication() {
    let app = setup_app().await;
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/courses",
            None,
            Some(json!({"subject_id": "s", "title": "t", "slug": "s", "overview": ""})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(request("POST", "/courses", Some("bogus-token"), Some(json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_subject_listing_counts_courses() {
    let app = setup_app().await;
    let token = register(&app, "alice").await;
    seed_course_with_module(&app, &token).await;

    let response = app.clone().oneshot(request("GET", "/subjects", None, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let subjects = body_json(response).await;
    assert_eq!(subjects[0]["slug"], "programming");
    assert_eq!(subjects[0]["course_count"], 1);
}

#[tokio::test]
async fn test_course_listing_is_public_and_filterable() {
    let app = setup_app().await;
    let token = register(&app, "alice").await;
    seed_course_with_module(&app, &token).await;

    let response = app
        .clone()
        .oneshot(request("GET", "/courses?subject=programming", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let courses = body_json(response).await;
    assert_eq!(courses[0]["slug"], "rust-intro");
    assert_eq!(courses[0]["modules"][0]["title"], "Basics");

    let response = app
        .oneshot(request("GET", "/courses?subject=other", None, None))
        .await
        .unwrap();
    let courses = body_json(response).await;
    assert_eq!(courses.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_content_lifecycle_and_listing_shape() {
    let app = setup_app().await;
    let token = register(&app, "alice").await;
    let (_course_id, module_id) = seed_course_with_module(&app, &token).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/modules/{module_id}/contents"),
            Some(&token),
            Some(json!({"type": "text", "title": "Notes", "body": "hello"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let item = body_json(response).await;
    assert_eq!(item["order"], 0);
    assert_eq!(item["content_type"], "text");

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/modules/{module_id}/contents"),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let entries = body_json(response).await;
    assert_eq!(entries[0]["order"], 0);
    assert_eq!(entries[0]["item"]["type"], "text");
    assert_eq!(entries[0]["item"]["title"], "Notes");
    assert_eq!(entries[0]["item"]["body"], "hello");

    let content_id = item["id"].as_str().unwrap();
    let response = app
        .oneshot(request(
            "DELETE",
            &format!("/contents/{content_id}"),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_unknown_content_type_is_rejected() {
    let app = setup_app().await;
    let token = register(&app, "alice").await;
    let (_course_id, module_id) = seed_course_with_module(&app, &token).await;

    let response = app
        .oneshot(request(
            "POST",
            &format!("/modules/{module_id}/contents"),
            Some(&token),
            Some(json!({"type": "podcast", "title": "Nope", "url": "https://example.com"})),
        ))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_module_reorder_endpoint() {
    let app = setup_app().await;
    let token = register(&app, "alice").await;
    let (course_id, first_module) = seed_course_with_module(&app, &token).await;

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/courses/{course_id}/modules"),
            Some(&token),
            Some(json!([{"title": "Advanced", "description": ""}])),
        ))
        .await
        .unwrap();
    let modules = body_json(response).await;
    let second_module = modules[1]["id"].as_str().unwrap().to_string();

    let mut mapping = serde_json::Map::new();
    mapping.insert(first_module.clone(), json!(1));
    mapping.insert(second_module.clone(), json!(0));
    let response = app
        .clone()
        .oneshot(request("POST", "/modules/order", Some(&token), Some(Value::Object(mapping))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(request("GET", &format!("/courses/{course_id}"), None, None))
        .await
        .unwrap();
    let detail = body_json(response).await;
    assert_eq!(detail["modules"][0]["title"], "Advanced");
    assert_eq!(detail["modules"][1]["title"], "Basics");
}

#[tokio::test]
async fn test_enroll_and_content_gate() {
    let app = setup_app().await;
    let owner_token = register(&app, "alice").await;
    let student_token = register(&app, "bob").await;
    let (course_id, _module_id) = seed_course_with_module(&app, &owner_token).await;

    // Metadata is public, full contents are gated.
    let response = app
        .clone()
        .oneshot(request("GET", &format!("/courses/{course_id}"), None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/courses/{course_id}/contents"),
            Some(&student_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/courses/{course_id}/enroll"),
            Some(&student_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"enrolled": true}));

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/courses/{course_id}/enroll"),
            Some(&student_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!({"already_enrolled": true}));

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/courses/{course_id}/contents"),
            Some(&student_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("GET", "/students/courses", Some(&student_token), None))
        .await
        .unwrap();
    let courses = body_json(response).await;
    assert_eq!(courses[0]["id"].as_str().unwrap(), course_id);
}
