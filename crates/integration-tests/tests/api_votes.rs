mod common;

use axum::http::{Method, StatusCode};
use common::http::send;
use common::World;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn toggle_round_trip_over_http() {
    let world = World::new();
    let owner = world.user("owner").await;
    let alice = world.user("alice").await;
    let product = world.product(&owner, "Over The Wire").await;
    let app = world.router();
    let token = world.token_for(&alice);
    let body = json!({ "productId": product.id });

    let on = send(&app, Method::POST, "/api/votes/toggle", Some(&token), Some(body.clone())).await;
    assert_eq!(on.status, StatusCode::OK);
    assert_eq!(on.body["success"], true);
    assert_eq!(on.body["data"]["upvoted"], true);
    assert_eq!(on.body["data"]["upvotesCount"], 1);

    let count_uri = format!("/api/votes/count/{}", product.id);
    let count = send(&app, Method::GET, &count_uri, None, None).await;
    assert_eq!(count.body["data"]["upvotesCount"], 1);

    let has_uri = format!("/api/votes/has-upvoted/{}", product.id);
    let has = send(&app, Method::GET, &has_uri, Some(&token), None).await;
    assert_eq!(has.body["data"]["upvoted"], true);

    let off = send(&app, Method::POST, "/api/votes/toggle", Some(&token), Some(body)).await;
    assert_eq!(off.body["data"]["upvoted"], false);
    assert_eq!(off.body["data"]["upvotesCount"], 0);
}

#[tokio::test]
async fn toggle_requires_a_token() {
    let world = World::new();
    let app = world.router();

    let reply = send(
        &app,
        Method::POST,
        "/api/votes/toggle",
        None,
        Some(json!({ "productId": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["success"], false);
}

#[tokio::test]
async fn token_for_a_deleted_account_is_rejected() {
    let world = World::new();
    let app = world.router();
    let token = world.unknown_user_token();

    let reply = send(
        &app,
        Method::POST,
        "/api/votes/toggle",
        Some(&token),
        Some(json!({ "productId": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_or_malformed_product_id_is_bad_request() {
    let world = World::new();
    let alice = world.user("alice").await;
    let app = world.router();
    let token = world.token_for(&alice);

    let missing = send(&app, Method::POST, "/api/votes/toggle", Some(&token), Some(json!({}))).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["error"], "Product ID required");

    let malformed = send(
        &app,
        Method::POST,
        "/api/votes/toggle",
        Some(&token),
        Some(json!({ "productId": "not-an-id" })),
    )
    .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);

    let path = send(&app, Method::GET, "/api/votes/count/not-an-id", None, None).await;
    assert_eq!(path.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let world = World::new();
    let alice = world.user("alice").await;
    let app = world.router();
    let token = world.token_for(&alice);

    let reply = send(
        &app,
        Method::POST,
        "/api/votes/toggle",
        Some(&token),
        Some(json!({ "productId": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn toggles_are_counted_in_metrics() {
    let world = World::new();
    let owner = world.user("owner").await;
    let product = world.product(&owner, "Measured").await;
    let app = world.router();
    let token = world.token_for(&owner);

    send(
        &app,
        Method::POST,
        "/api/votes/toggle",
        Some(&token),
        Some(json!({ "productId": product.id })),
    )
    .await;

    let metrics = send(&app, Method::GET, "/metrics", None, None).await;
    assert_eq!(metrics.status, StatusCode::OK);
    let text = metrics.body.as_str().unwrap_or_default();
    assert!(text.contains("launchpad_mutations_total{kind=\"vote_toggle\"} 1"));
}
