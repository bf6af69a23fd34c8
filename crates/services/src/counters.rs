//! Recount helpers for the denormalized product counters.
//!
//! The rows are authoritative. These functions re-derive a cache from them and
//! write it back in one single-row update; they are safe to call at any time
//! to repair drift.

use domains::{CommentRepository, ProductRepository, Result, VoteRepository};
use uuid::Uuid;

pub async fn recount_upvotes(
    votes: &dyn VoteRepository,
    products: &dyn ProductRepository,
    product_id: Uuid,
) -> Result<i64> {
    let count = votes.count_by_product(product_id).await? as i64;
    products.set_upvotes_count(product_id, count).await?;
    Ok(count)
}

pub async fn recount_comments(
    comments: &dyn CommentRepository,
    products: &dyn ProductRepository,
    product_id: Uuid,
) -> Result<i64> {
    let count = comments.count_by_product(product_id).await? as i64;
    products.set_comments_count(product_id, count).await?;
    Ok(count)
}
