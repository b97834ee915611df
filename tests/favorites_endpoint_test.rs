use axum::http::StatusCode;
use cinelog::{api, Config, Repository};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestApp {
    app: axum::Router,
    _temp: TempDir,
}

async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let url = format!("file:{}", temp_dir.path().join("test.db").display());
    let pool = cinelog::open_store(&url).await.expect("open_store failed");
    let repo = Arc::new(Repository::new(pool));

    let config = Config {
        port: 0,
        database_url: url,
        auth_secret: "test-secret".to_string(),
        token_ttl_secs: 3600,
    };

    let app = api::create_router(api::AppState::new(repo, config));
    TestApp {
        app,
        _temp: temp_dir,
    }
}

async fn request(
    app: axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn register(test_app: &TestApp, email: &str) -> String {
    let (status, body) = request(
        test_app.app.clone(),
        "POST",
        "/v1/auth/register",
        None,
        Some(serde_json::json!({"email": email, "name": "Tester", "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

fn favorite_body(movie_id: &str, title: &str) -> serde_json::Value {
    serde_json::json!({
        "movieId": movie_id,
        "mediaType": "movie",
        "title": title,
        "posterPath": "/poster.jpg"
    })
}

#[tokio::test]
async fn test_favorites_require_auth() {
    let test_app = setup_test_app().await;
    let (status, _) = request(test_app.app.clone(), "GET", "/v1/favorites", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_put_then_list_newest_first() {
    let test_app = setup_test_app().await;
    let token = register(&test_app, "a@x.com").await;

    let (status, body) = request(
        test_app.app.clone(),
        "POST",
        "/v1/favorites",
        Some(&token),
        Some(favorite_body("m1", "Dune")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["title"], "Dune");

    tokio::time::sleep(Duration::from_millis(2)).await;
    request(
        test_app.app.clone(),
        "POST",
        "/v1/favorites",
        Some(&token),
        Some(favorite_body("m2", "Arrival")),
    )
    .await;

    let (status, body) = request(test_app.app.clone(), "GET", "/v1/favorites", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["title"], "Arrival");
    assert_eq!(items[1]["title"], "Dune");
}

#[tokio::test]
async fn test_put_same_key_replaces_in_place() {
    let test_app = setup_test_app().await;
    let token = register(&test_app, "a@x.com").await;

    let (_, first) = request(
        test_app.app.clone(),
        "POST",
        "/v1/favorites",
        Some(&token),
        Some(favorite_body("m1", "Dune")),
    )
    .await;
    let (_, second) = request(
        test_app.app.clone(),
        "POST",
        "/v1/favorites",
        Some(&token),
        Some(favorite_body("m1", "Dune: Part One")),
    )
    .await;

    assert_eq!(second["item"]["id"], first["item"]["id"]);
    assert_eq!(second["item"]["title"], "Dune: Part One");

    let (_, body) = request(test_app.app.clone(), "GET", "/v1/favorites", Some(&token), None).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_removes_and_is_idempotent() {
    let test_app = setup_test_app().await;
    let token = register(&test_app, "a@x.com").await;
    request(
        test_app.app.clone(),
        "POST",
        "/v1/favorites",
        Some(&token),
        Some(favorite_body("m1", "Dune")),
    )
    .await;

    let (status, body) = request(
        test_app.app.clone(),
        "DELETE",
        "/v1/favorites?movieId=m1&mediaType=movie",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, body) = request(test_app.app.clone(), "GET", "/v1/favorites", Some(&token), None).await;
    assert!(body["items"].as_array().unwrap().is_empty());

    // Deleting a key that no longer exists still succeeds.
    let (status, body) = request(
        test_app.app.clone(),
        "DELETE",
        "/v1/favorites?movieId=m1&mediaType=movie",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_delete_requires_movie_id() {
    let test_app = setup_test_app().await;
    let token = register(&test_app, "a@x.com").await;

    let (status, _) = request(
        test_app.app.clone(),
        "DELETE",
        "/v1/favorites?mediaType=movie",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_favorites_are_scoped_per_user() {
    let test_app = setup_test_app().await;
    let token_a = register(&test_app, "a@x.com").await;
    let token_b = register(&test_app, "b@x.com").await;

    request(
        test_app.app.clone(),
        "POST",
        "/v1/favorites",
        Some(&token_a),
        Some(favorite_body("m1", "Dune")),
    )
    .await;

    let (_, body) = request(test_app.app.clone(), "GET", "/v1/favorites", Some(&token_b), None).await;
    assert!(body["items"].as_array().unwrap().is_empty());
}
