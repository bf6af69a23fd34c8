//! Read-only rollups over the store.
//!
//! The sub-queries are independent; a snapshot taken during writes may show
//! totals and rankings from slightly different moments.

use chrono::{DateTime, Utc};
use domains::{CategoryCount, Product, ProductSort, Result, Store};
use serde::Serialize;
use uuid::Uuid;

pub const DEFAULT_TOP_N: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub upvotes_count: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductSummary {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            slug: p.slug,
            upvotes_count: p.upvotes_count,
            comments_count: p.comments_count,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub total_products: u64,
    pub total_users: u64,
    pub total_comments: u64,
    pub total_votes: u64,
    pub trending_products: Vec<ProductSummary>,
    pub most_commented_products: Vec<ProductSummary>,
    pub latest_products: Vec<ProductSummary>,
    pub products_by_category: Vec<CategoryCount>,
}

#[derive(Clone)]
pub struct AnalyticsService {
    store: Store,
}

impl AnalyticsService {
    pub fn new(store: &Store) -> Self {
        Self {
            store: store.clone(),
        }
    }

    pub async fn snapshot(&self, limit: u64) -> Result<AnalyticsReport> {
        let products = self.store.products.as_ref();
        let summaries =
            |items: Vec<Product>| -> Vec<ProductSummary> { items.into_iter().map(ProductSummary::from).collect() };

        let mut products_by_category = products.category_counts().await?;
        products_by_category.sort_by(|a, b| b.count.cmp(&a.count).then(a.category.cmp(&b.category)));

        Ok(AnalyticsReport {
            total_products: products.count().await?,
            total_users: self.store.users.count().await?,
            total_comments: self.store.comments.count().await?,
            total_votes: self.store.votes.count().await?,
            trending_products: summaries(products.top(ProductSort::Upvotes, limit).await?),
            most_commented_products: summaries(products.top(ProductSort::Comments, limit).await?),
            latest_products: summaries(products.top(ProductSort::Newest, limit).await?),
            products_by_category,
        })
    }
}
