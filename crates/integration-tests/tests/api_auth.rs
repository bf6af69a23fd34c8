mod common;

use axum::http::{Method, StatusCode};
use common::http::send;
use common::World;
use serde_json::json;

#[tokio::test]
async fn register_login_and_me() {
    let world = World::new();
    let app = world.router();

    let registered = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "dana", "email": "Dana@Example.com", "password": "hunter22" })),
    )
    .await;
    assert_eq!(registered.status, StatusCode::OK);
    assert_eq!(registered.body["success"], true);
    assert!(registered.body["token"].as_str().is_some());

    let login = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "dana@example.com", "password": "hunter22" })),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    let token = login.body["token"].as_str().unwrap().to_string();

    let me = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["username"], "dana");
    assert_eq!(me.body["data"]["role"], "regular");
    assert!(me.body["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
    let world = World::new();
    world.user("erin").await;
    let app = world.router();

    let reply = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "erin2", "email": "erin@example.com", "password": "hunter22" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.body["error"], "User already exists");
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
    let world = World::new();
    world.user("frank").await;
    let app = world.router();

    let wrong = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "frank@example.com", "password": "nope-nope" })),
    )
    .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let missing = send(&app, Method::POST, "/api/auth/login", None, Some(json!({ "email": "" }))).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn garbage_bearer_token_is_unauthorized() {
    let world = World::new();
    let app = world.router();

    let reply = send(&app, Method::GET, "/api/auth/me", Some("not.a.jwt"), None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn analytics_is_admin_only() {
    let world = World::new();
    let regular = world.user("gina").await;
    let admin = world.admin("root").await;
    let app = world.router();

    let denied = send(
        &app,
        Method::GET,
        "/api/admin/analytics",
        Some(&world.token_for(&regular)),
        None,
    )
    .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let allowed = send(&app, Method::GET, "/api/admin/analytics", Some(&world.token_for(&admin)), None).await;
    assert_eq!(allowed.status, StatusCode::OK);
    assert_eq!(allowed.body["data"]["totalUsers"], 2);
}

#[tokio::test]
async fn health_unknown_routes_and_request_ids() {
    let world = World::new();
    let app = world.router();

    let health = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert!(health.headers.contains_key("x-request-id"));

    let missing = send(&app, Method::GET, "/api/nowhere", None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"], "Route not found");
}
