//! # Ports
//!
//! Any store or credential adapter must implement these traits to be used by
//! the services. Every single-row write is expected to be atomic; sequences of
//! writes are not.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{CategoryCount, Comment, Product, ProductPage, ProductQuery, ProductSort, User, Vote};

/// Persistence contract for accounts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the username or email is taken.
    async fn insert(&self, user: User) -> Result<()>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn count(&self) -> Result<u64>;
}

/// Persistence contract for products.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert(&self, product: Product) -> Result<()>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>>;
    async fn find_many(&self, ids: Vec<Uuid>) -> Result<Vec<Product>>;
    async fn slug_exists(&self, slug: &str) -> Result<bool>;
    async fn list(&self, query: ProductQuery) -> Result<ProductPage>;

    /// Overwrites the editable fields (name, slug, tagline, description,
    /// website, category, logo). Never touches the counters. Returns the
    /// stored row, or `None` if the product no longer exists.
    async fn update_details(&self, product: Product) -> Result<Option<Product>>;

    /// Returns `true` if a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Best-effort in-place increment of the upvote cache. Missing rows are ignored.
    async fn adjust_upvotes(&self, id: Uuid, delta: i64) -> Result<()>;
    /// Overwrites the upvote cache. Missing rows are ignored.
    async fn set_upvotes_count(&self, id: Uuid, count: i64) -> Result<()>;
    /// Overwrites the comment cache. Missing rows are ignored.
    async fn set_comments_count(&self, id: Uuid, count: i64) -> Result<()>;

    async fn count(&self) -> Result<u64>;
    async fn top(&self, sort: ProductSort, limit: u64) -> Result<Vec<Product>>;
    async fn category_counts(&self) -> Result<Vec<CategoryCount>>;
}

/// Persistence contract for comments and replies.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: Comment) -> Result<()>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>>;
    /// Rows for `ids`, in the order given; missing ids are skipped.
    async fn find_many(&self, ids: Vec<Uuid>) -> Result<Vec<Comment>>;
    /// Top-level comments of a product, newest first.
    async fn list_top_level(&self, product_id: Uuid) -> Result<Vec<Comment>>;

    /// Rewrites content and the author-name snapshot. `None` if the row is gone.
    async fn update_content(&self, id: Uuid, content: String, username: String) -> Result<Option<Comment>>;
    /// Appends `reply_id` to the parent's reply list if not already present.
    async fn append_reply(&self, parent_id: Uuid, reply_id: Uuid) -> Result<()>;
    async fn remove_reply(&self, parent_id: Uuid, reply_id: Uuid) -> Result<()>;

    async fn delete(&self, id: Uuid) -> Result<bool>;
    async fn delete_by_parent(&self, parent_id: Uuid) -> Result<u64>;
    async fn delete_by_product(&self, product_id: Uuid) -> Result<u64>;

    /// Every comment referencing the product, top-level and replies.
    async fn count_by_product(&self, product_id: Uuid) -> Result<u64>;
    async fn count(&self) -> Result<u64>;
}

/// Persistence contract for upvotes.
///
/// Implementations must enforce uniqueness of (product, user) at the store
/// level: a second `insert` for the same pair fails with `Conflict`.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait VoteRepository: Send + Sync {
    async fn insert(&self, vote: Vote) -> Result<()>;
    async fn find(&self, product_id: Uuid, user_id: Uuid) -> Result<Option<Vote>>;
    /// Returns `true` if a row was removed.
    async fn delete(&self, product_id: Uuid, user_id: Uuid) -> Result<bool>;
    async fn delete_by_product(&self, product_id: Uuid) -> Result<u64>;
    async fn count_by_product(&self, product_id: Uuid) -> Result<u64>;
    async fn product_ids_for_user(&self, user_id: Uuid) -> Result<Vec<Uuid>>;
    async fn count(&self) -> Result<u64>;
}

/// Handle to the Entity Store, passed to every service at construction.
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub votes: Arc<dyn VoteRepository>,
}

impl Store {
    pub fn new(
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        comments: Arc<dyn CommentRepository>,
        votes: Arc<dyn VoteRepository>,
    ) -> Self {
        Self {
            users,
            products,
            comments,
            votes,
        }
    }

    /// Builds a handle from one adapter that implements every repository.
    pub fn from_adapter<T>(adapter: Arc<T>) -> Self
    where
        T: UserRepository + ProductRepository + CommentRepository + VoteRepository + 'static,
    {
        Self {
            users: adapter.clone(),
            products: adapter.clone(),
            comments: adapter.clone(),
            votes: adapter,
        }
    }
}

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: Uuid,
    pub admin: bool,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Signs and verifies bearer tokens.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenCodec: Send + Sync {
    fn issue(&self, user_id: Uuid, is_admin: bool) -> Result<String>;
    /// Fails with `Unauthenticated` for malformed, expired, or mis-signed tokens.
    fn verify(&self, token: &str) -> Result<TokenClaims>;
}

/// One-way password hashing.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> Result<String>;
    async fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}
