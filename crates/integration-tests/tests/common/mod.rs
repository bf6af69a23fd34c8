//! Shared fixtures: a `MemoryStore`-backed world with real JWTs and a
//! plaintext password hasher.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use auth_adapters::JwtCodec;
use chrono::Utc;
use domains::{Comment, PasswordHasher, Principal, Product, Role, Store, TokenCodec, User, UserRepository};
use services::products::NewProduct;
use services::Services;
use storage_adapters::MemoryStore;
use uuid::Uuid;

pub const SECRET: &[u8] = b"integration-test-secret-0123456789";

/// Argon2 is too slow for hundreds of test logins; this keeps the contract
/// without the KDF.
pub struct PlainHasher;

#[async_trait]
impl PasswordHasher for PlainHasher {
    async fn hash(&self, password: &str) -> domains::Result<String> {
        Ok(format!("plain${password}"))
    }

    async fn verify(&self, password: &str, hash: &str) -> domains::Result<bool> {
        Ok(hash.strip_prefix("plain$") == Some(password))
    }
}

pub struct World {
    pub store: Arc<MemoryStore>,
    pub tokens: Arc<JwtCodec>,
    pub services: Services,
}

impl World {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let tokens = Arc::new(JwtCodec::new(SECRET, 24));
        let services = Services::new(
            Store::from_adapter(store.clone()),
            Arc::new(PlainHasher),
            tokens.clone(),
        );
        Self {
            store,
            tokens,
            services,
        }
    }

    async fn insert_user(&self, username: &str, role: Role) -> Principal {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{}@example.com", username.to_lowercase()),
            password_hash: "plain$secret1".into(),
            role,
            avatar: Some(format!("{}.png", username.to_lowercase())),
            created_at: Utc::now(),
        };
        UserRepository::insert(self.store.as_ref(), user.clone())
            .await
            .unwrap();
        Principal::from(&user)
    }

    pub async fn user(&self, username: &str) -> Principal {
        self.insert_user(username, Role::Regular).await
    }

    pub async fn admin(&self, username: &str) -> Principal {
        self.insert_user(username, Role::Admin).await
    }

    pub async fn product(&self, owner: &Principal, name: &str) -> Product {
        self.services
            .products
            .create(owner, new_product(name))
            .await
            .unwrap()
    }

    pub fn token_for(&self, principal: &Principal) -> String {
        self.tokens.issue(principal.id, principal.is_admin()).unwrap()
    }

    pub async fn stored_product(&self, id: Uuid) -> Option<Product> {
        domains::ProductRepository::find_by_id(self.store.as_ref(), id)
            .await
            .unwrap()
    }

    pub async fn vote_rows(&self, product_id: Uuid) -> u64 {
        domains::VoteRepository::count_by_product(self.store.as_ref(), product_id)
            .await
            .unwrap()
    }

    pub async fn stored_comment_opt(&self, id: Uuid) -> Option<Comment> {
        domains::CommentRepository::find_by_id(self.store.as_ref(), id)
            .await
            .unwrap()
    }

    pub async fn stored_comment(&self, id: Uuid) -> Comment {
        self.stored_comment_opt(id).await.expect("comment exists")
    }

    pub async fn user_rows(&self) -> u64 {
        UserRepository::count(self.store.as_ref()).await.unwrap()
    }

    /// A validly signed token whose subject has no account.
    pub fn unknown_user_token(&self) -> String {
        self.tokens.issue(Uuid::new_v4(), false).unwrap()
    }

    pub async fn comment_rows(&self, product_id: Uuid) -> u64 {
        domains::CommentRepository::count_by_product(self.store.as_ref(), product_id)
            .await
            .unwrap()
    }
}

pub fn new_product(name: &str) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        tagline: format!("{name} does one thing well"),
        description: "A longer description of the product.".into(),
        website: "https://example.com".into(),
        category: "DevTools".into(),
        logo: None,
    }
}

#[cfg(feature = "web-axum")]
pub mod http {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use api_adapters::{build_router, AppState, Metrics};

    use super::World;

    impl World {
        pub fn router(&self) -> Router {
            build_router(AppState::new(self.services.clone(), Metrics::new()), &[])
        }
    }

    pub struct Reply {
        pub status: StatusCode,
        pub headers: axum::http::HeaderMap,
        pub body: Value,
    }

    pub async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Reply {
            status,
            headers,
            body,
        }
    }

    pub async fn send_raw(app: &Router, method: Method, uri: &str, token: &str, raw: &str) -> Reply {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        Reply {
            status,
            headers,
            body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        }
    }
}
