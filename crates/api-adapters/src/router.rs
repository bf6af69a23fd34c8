use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{admin, auth, comments, products, system, users, votes};
use crate::middleware;
use crate::state::AppState;

/// Every route of the public API, wrapped in the standard middleware.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let routes = Router::new()
        // Accounts
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/users/me/profile", get(users::profile))
        // Products
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/{id}",
            get(products::get).put(products::update).delete(products::delete),
        )
        // Comments
        .route("/api/products/{id}/comments", get(comments::list).post(comments::add))
        .route("/api/comments/{id}", put(comments::update).delete(comments::delete))
        .route("/api/comments/{id}/replies", post(comments::reply))
        // Votes
        .route("/api/votes/toggle", post(votes::toggle))
        .route("/api/votes/count/{id}", get(votes::count))
        .route("/api/votes/has-upvoted/{id}", get(votes::has_upvoted))
        // Admin
        .route("/api/admin/analytics", get(admin::analytics))
        // System
        .route("/health", get(system::health))
        .route("/metrics", get(system::metrics))
        .fallback(system::not_found);

    middleware::apply(routes, cors_origins).with_state(state)
}
