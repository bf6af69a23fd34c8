//! Follow-up deletes after a product or comment row is removed.
//!
//! Both hooks are idempotent and can be invoked directly to clean up rows
//! orphaned by an interrupted request.

use std::sync::Arc;

use domains::{Comment, CommentRepository, ProductRepository, Result, Store, VoteRepository};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::counters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCascade {
    pub comments_removed: u64,
    pub votes_removed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentCascade {
    pub replies_removed: u64,
    /// Product's comment count after the recount
    pub comments_count: i64,
}

#[derive(Clone)]
pub struct Cascades {
    products: Arc<dyn ProductRepository>,
    comments: Arc<dyn CommentRepository>,
    votes: Arc<dyn VoteRepository>,
}

impl Cascades {
    pub fn new(store: &Store) -> Self {
        Self {
            products: store.products.clone(),
            comments: store.comments.clone(),
            votes: store.votes.clone(),
        }
    }

    /// Removes every comment and vote that references `product_id`.
    pub async fn on_product_deleted(&self, product_id: Uuid) -> Result<ProductCascade> {
        let comments_removed = self.comments.delete_by_product(product_id).await?;
        let votes_removed = self.votes.delete_by_product(product_id).await?;
        info!(%product_id, comments_removed, votes_removed, "product cascade complete");
        Ok(ProductCascade {
            comments_removed,
            votes_removed,
        })
    }

    /// Detaches `comment` from its thread and recounts the product.
    ///
    /// A deleted top-level comment takes its replies with it; a deleted reply
    /// is dropped from its parent's reply list.
    pub async fn on_comment_deleted(&self, comment: &Comment) -> Result<CommentCascade> {
        let replies_removed = match comment.parent_id {
            Some(parent_id) => {
                self.comments.remove_reply(parent_id, comment.id).await?;
                0
            }
            None => self.comments.delete_by_parent(comment.id).await?,
        };
        let comments_count =
            counters::recount_comments(self.comments.as_ref(), self.products.as_ref(), comment.product_id)
                .await?;
        info!(
            comment_id = %comment.id,
            product_id = %comment.product_id,
            replies_removed,
            comments_count,
            "comment cascade complete"
        );
        Ok(CommentCascade {
            replies_removed,
            comments_count,
        })
    }
}
