//! # Domain Models
//!
//! The core entities of the launchpad backend.
//! Cross-references are plain ids; resolving one is an explicit store lookup.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Account privilege level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Regular,
}

impl Role {
    pub fn from_admin_flag(is_admin: bool) -> Self {
        if is_admin {
            Role::Admin
        } else {
            Role::Regular
        }
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string; never leaves the process.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    /// Opaque reference to an uploaded image
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The fixed set of product categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "AI")]
    Ai,
    #[serde(rename = "SaaS")]
    SaaS,
    DevTools,
    Mobile,
    Web,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Ai,
        Category::SaaS,
        Category::DevTools,
        Category::Mobile,
        Category::Web,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Ai => "AI",
            Category::SaaS => "SaaS",
            Category::DevTools => "DevTools",
            Category::Mobile => "Mobile",
            Category::Web => "Web",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DomainError::validation("Please select a valid category"))
    }
}

/// Logo used when a product is submitted without one.
pub const DEFAULT_LOGO: &str = "no-photo.jpg";

/// A submitted product.
///
/// `upvotes_count` and `comments_count` are caches. The Vote and Comment rows
/// referencing the product are authoritative and the caches are re-derived
/// from them after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Derived from the name; not guaranteed unique
    pub slug: String,
    pub tagline: String,
    pub description: String,
    pub website: String,
    pub category: Category,
    #[serde(rename = "user")]
    pub owner_id: Uuid,
    pub logo: String,
    pub upvotes_count: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
}

/// A comment or a reply on a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    #[serde(rename = "product")]
    pub product_id: Uuid,
    #[serde(rename = "user")]
    pub author_id: Uuid,
    /// Author's display name when the comment was written (or last edited)
    pub username: String,
    #[serde(rename = "parentComment")]
    pub parent_id: Option<Uuid>,
    /// Direct children, in the order they were created
    pub replies: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// One user's upvote on one product. Unique per (product, user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: Uuid,
    #[serde(rename = "product")]
    pub product_id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// The authenticated identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

// ── Query shapes ────────────────────────────────────────────────────────────

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductSort {
    #[default]
    Newest,
    Oldest,
    Upvotes,
    Comments,
    Name,
}

impl FromStr for ProductSort {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" | "-createdAt" => Ok(ProductSort::Newest),
            "oldest" | "createdAt" => Ok(ProductSort::Oldest),
            "upvotes" | "-upvotesCount" => Ok(ProductSort::Upvotes),
            "comments" | "-commentsCount" => Ok(ProductSort::Comments),
            "name" => Ok(ProductSort::Name),
            other => Err(DomainError::validation(format!("unknown sort order '{other}'"))),
        }
    }
}

/// Filter, sort and window for a product listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// Case-insensitive substring over name and tagline
    pub search: Option<String>,
    pub category: Option<Category>,
    pub owner_id: Option<Uuid>,
    pub sort: ProductSort,
    pub offset: u64,
    pub limit: u64,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            owner_id: None,
            sort: ProductSort::Newest,
            offset: 0,
            limit: 25,
        }
    }
}

impl ProductQuery {
    /// Whether `product` passes every filter of this query.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = self.category {
            if product.category != category {
                return false;
            }
        }
        if let Some(owner) = self.owner_id {
            if product.owner_id != owner {
                return false;
            }
        }
        match &self.search {
            Some(term) => {
                let term = term.to_lowercase();
                product.name.to_lowercase().contains(&term)
                    || product.tagline.to_lowercase().contains(&term)
            }
            None => true,
        }
    }
}

/// A window of products plus the size of the full filtered set.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: u64,
}

/// Number of products in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category: Category,
    pub count: u64,
}

// ── Read views ──────────────────────────────────────────────────────────────

/// A reply expanded with its author's avatar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_avatar: Option<String>,
}

/// A top-level comment with its replies resolved, newest thread first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThread {
    pub id: Uuid,
    pub content: String,
    #[serde(rename = "product")]
    pub product_id: Uuid,
    #[serde(rename = "user")]
    pub author_id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<ReplyView>,
}

impl CommentThread {
    pub fn new(comment: Comment, replies: Vec<ReplyView>) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            product_id: comment.product_id,
            author_id: comment.author_id,
            username: comment.username,
            created_at: comment.created_at,
            replies,
        }
    }
}
