use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use roster_backend::app::app::build_router;
use roster_backend::repository::memory_user_repo::InMemoryUserRepository;
use roster_backend::repository::user_repo::UnavailableUserRepository;
use roster_backend::service::user_service::UserServiceImpl;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for .oneshot()

fn setup() -> (Router, Arc<InMemoryUserRepository>) {
    let repo = Arc::new(InMemoryUserRepository::new());
    let service = Arc::new(UserServiceImpl::new(repo.clone()));
    (build_router(service), repo)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body_bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn post_json(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/users")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn create(app: &Router, username: &str, role: &str) -> Value {
    let (status, body) = send(
        app,
        post_json(&json!({
            "username": username,
            "employeeId": "EMP123",
            "email": format!("{username}@example.com"),
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create {username}: {body}");
    body
}

#[tokio::test]
async fn test_list_on_empty_store() {
    let (app, _) = setup();
    let (status, body) = send(&app, get("/users?page=1&limit=10")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "users": [],
            "pagination": {
                "totalCount": 0,
                "totalPages": 0,
                "currentPage": 1,
                "hasNextPage": false,
                "limit": 10
            }
        })
    );
}

#[tokio::test]
async fn test_create_then_find_by_username() {
    let (app, _) = setup();
    let payload = json!({
        "username": "jdoe",
        "employeeId": "AB12CD",
        "email": "j@x.com",
        "role": "admin"
    });
    let (status, created) = send(&app, post_json(&payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["username"], "jdoe");
    assert_eq!(created["employeeId"], "AB12CD");
    assert_eq!(created["email"], "j@x.com");
    assert_eq!(created["role"], "admin");
    let id = created["_id"].as_str().unwrap();
    assert_eq!(id.len(), 24);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));

    let (status, body) = send(&app, get("/users?username=jdoe")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"], json!([created]));
    assert_eq!(body["pagination"]["totalCount"], 1);
}

#[tokio::test]
async fn test_create_assigns_new_identity_each_time() {
    let (app, repo) = setup();
    let first = create(&app, "dup", "manager").await;
    let second = create(&app, "dup", "manager").await;
    assert_ne!(first["_id"], second["_id"]);
    assert_eq!(repo.len().await, 2);
}

#[tokio::test]
async fn test_create_rejects_missing_field() {
    let (app, repo) = setup();
    let (status, body) = send(
        &app,
        post_json(&json!({ "username": "jdoe", "email": "j@x.com", "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("employeeId"));
    assert!(repo.is_empty().await);
}

#[tokio::test]
async fn test_create_rejects_null_and_empty_fields() {
    let (app, repo) = setup();
    for payload in [
        json!({ "username": null, "employeeId": "E1", "email": "j@x.com", "role": "admin" }),
        json!({ "username": "jdoe", "employeeId": "", "email": "j@x.com", "role": "admin" }),
    ] {
        let (status, _) = send(&app, post_json(&payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
    }
    assert!(repo.is_empty().await);
}

#[tokio::test]
async fn test_create_rejects_unknown_role() {
    let (app, repo) = setup();
    let (status, body) = send(
        &app,
        post_json(&json!({
            "username": "jdoe",
            "employeeId": "AB12CD",
            "email": "j@x.com",
            "role": "superuser"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("role"));
    assert!(message.contains("superuser"));
    assert!(repo.is_empty().await);
}

#[tokio::test]
async fn test_create_rejects_malformed_bodies() {
    let (app, _) = setup();

    let not_json = Request::builder()
        .method("POST")
        .uri("/users")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, not_json).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let wrong_type = post_json(&json!({
        "username": 42,
        "employeeId": "AB12CD",
        "email": "j@x.com",
        "role": "admin"
    }));
    let (status, _) = send(&app, wrong_type).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let no_content_type = Request::builder()
        .method("POST")
        .uri("/users")
        .body(Body::from("{}"))
        .unwrap();
    let (status, _) = send(&app, no_content_type).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pagination_windows_and_metadata() {
    let (app, _) = setup();
    for i in 0..25 {
        create(&app, &format!("user{i:02}"), "collector").await;
    }

    let (_, body) = send(&app, get("/users?page=2&limit=10")).await;
    let names: Vec<&str> = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    let expected: Vec<String> = (10..20).map(|i| format!("user{i:02}")).collect();
    assert_eq!(names, expected);
    assert_eq!(
        body["pagination"],
        json!({
            "totalCount": 25,
            "totalPages": 3,
            "currentPage": 2,
            "hasNextPage": true,
            "limit": 10
        })
    );

    let (_, body) = send(&app, get("/users?page=3&limit=10")).await;
    assert_eq!(body["users"].as_array().unwrap().len(), 5);
    assert_eq!(body["pagination"]["hasNextPage"], false);

    let (_, body) = send(&app, get("/users?page=9&limit=10")).await;
    assert!(body["users"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["currentPage"], 9);
    assert_eq!(body["pagination"]["hasNextPage"], false);
}

#[tokio::test]
async fn test_invalid_paging_values_use_defaults() {
    let (app, _) = setup();
    for i in 0..12 {
        create(&app, &format!("u{i}"), "admin").await;
    }
    let (status, body) = send(&app, get("/users?page=0&limit=-5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert_eq!(body["pagination"]["limit"], 10);
    assert_eq!(body["users"].as_array().unwrap().len(), 10);

    let (_, body) = send(&app, get("/users?page=abc&limit=")).await;
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert_eq!(body["pagination"]["limit"], 10);
}

#[tokio::test]
async fn test_role_filter_is_exact() {
    let (app, _) = setup();
    create(&app, "m1", "manager").await;
    create(&app, "a1", "admin").await;
    create(&app, "m2", "manager").await;
    create(&app, "c1", "collector").await;

    let (_, body) = send(&app, get("/users?role=manager")).await;
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u["role"] == "manager"));
    assert_eq!(body["pagination"]["totalCount"], 2);

    let (status, body) = send(&app, get("/users?role=Manager")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["users"].as_array().unwrap().is_empty());

    let (status, body) = send(&app, get("/users?role=7")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["totalCount"], 0);
}

#[tokio::test]
async fn test_username_filter_is_case_insensitive_substring() {
    let (app, _) = setup();
    create(&app, "AbcDef", "admin").await;
    create(&app, "xxABCyy", "collector").await;
    create(&app, "zzz", "admin").await;
    create(&app, "a.c", "admin").await;

    let (_, body) = send(&app, get("/users?username=abc")).await;
    let mut names: Vec<&str> = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, ["AbcDef", "xxABCyy"]);

    let (_, body) = send(&app, get("/users?username=abc&role=admin")).await;
    assert_eq!(body["pagination"]["totalCount"], 1);

    // Metacharacters are literal
    let (_, body) = send(&app, get("/users?username=a.c")).await;
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "a.c");
}

#[tokio::test]
async fn test_list_reports_storage_failure() {
    let service = Arc::new(UserServiceImpl::new(Arc::new(UnavailableUserRepository::new(
        "no reachable servers",
    ))));
    let app = build_router(service);
    let (status, body) = send(&app, get("/users")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().contains("no reachable servers"));
}

#[tokio::test]
async fn test_create_reports_storage_failure_as_bad_request() {
    let service = Arc::new(UserServiceImpl::new(Arc::new(UnavailableUserRepository::new("down"))));
    let app = build_router(service);
    let (status, body) = send(
        &app,
        post_json(&json!({
            "username": "jdoe",
            "employeeId": "AB12CD",
            "email": "j@x.com",
            "role": "admin"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("down"));
}

#[tokio::test]
async fn test_repeated_query_parameters_use_first_value() {
    let (app, _) = setup();
    for i in 0..3 {
        create(&app, &format!("m{i}"), "manager").await;
    }
    create(&app, "a0", "admin").await;

    let (status, body) = send(&app, get("/users?page=1&page=2&limit=2&limit=50&role=manager&role=admin")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert_eq!(body["pagination"]["limit"], 2);
    assert_eq!(body["pagination"]["totalCount"], 3);
    assert_eq!(body["users"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_huge_page_is_an_empty_page() {
    let (app, _) = setup();
    create(&app, "only", "admin").await;
    let (status, body) = send(&app, get("/users?page=1000000000000000000&limit=100")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["users"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["totalCount"], 1);
    assert_eq!(body["pagination"]["hasNextPage"], false);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let (app, _) = setup();

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/users")
        .header(header::ORIGIN, "http://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(preflight).await.unwrap();
    assert!(resp.status().is_success());
    assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let methods = resp.headers()[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    for method in ["GET", "POST", "PUT", "DELETE"] {
        assert!(methods.contains(method), "missing {method} in {methods}");
    }

    let simple = Request::builder()
        .method(Method::GET)
        .uri("/users")
        .header(header::ORIGIN, "http://example.com")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(simple).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_health() {
    let (app, _) = setup();
    let resp = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"OK");
}
