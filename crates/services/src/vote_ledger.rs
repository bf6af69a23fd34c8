//! # Vote Ledger
//!
//! At most one Vote row exists per (product, user); the store's uniqueness
//! constraint is the only concurrency control. `Product::upvotes_count` is a
//! cache: every toggle nudges it, then overwrites it with a fresh count of the
//! Vote rows so the reported value is never an optimistic echo.
//!
//! A toggle that fails between the row write and the recount leaves the cache
//! stale until the next toggle (or an explicit [`VoteLedger::recount`]) on the
//! same product.

use std::sync::Arc;

use chrono::Utc;
use domains::{DomainError, Principal, ProductRepository, Result, Store, Vote, VoteRepository};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::counters;

/// Post-toggle state reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteState {
    pub upvoted: bool,
    pub upvotes_count: i64,
}

#[derive(Clone)]
pub struct VoteLedger {
    products: Arc<dyn ProductRepository>,
    votes: Arc<dyn VoteRepository>,
}

impl VoteLedger {
    pub fn new(store: &Store) -> Self {
        Self {
            products: store.products.clone(),
            votes: store.votes.clone(),
        }
    }

    /// Flips the principal's vote on `product_id`.
    pub async fn toggle_vote(&self, product_id: Uuid, voter: &Principal) -> Result<VoteState> {
        if self.products.find_by_id(product_id).await?.is_none() {
            return Err(DomainError::not_found("Product", product_id));
        }

        if self.votes.find(product_id, voter.id).await?.is_some() {
            // A concurrent toggle may have removed the row already; either way
            // the pair ends up without a vote.
            let removed = self.votes.delete(product_id, voter.id).await?;
            if removed {
                self.products.adjust_upvotes(product_id, -1).await?;
            }
            let count = self.recount(product_id).await?;
            if removed {
                info!(%product_id, user_id = %voter.id, upvotes = count, "upvote removed");
            } else {
                warn!(%product_id, user_id = %voter.id, upvotes = count, "duplicate unvote converged");
            }
            return Ok(VoteState {
                upvoted: false,
                upvotes_count: count,
            });
        }

        let vote = Vote {
            id: Uuid::new_v4(),
            product_id,
            user_id: voter.id,
            created_at: Utc::now(),
        };
        match self.votes.insert(vote).await {
            Ok(()) => {
                self.products.adjust_upvotes(product_id, 1).await?;
            }
            Err(DomainError::Conflict(_)) => {
                // A concurrent request inserted the same pair first.
                warn!(%product_id, user_id = %voter.id, "duplicate upvote converged");
            }
            Err(err) => return Err(err),
        }
        let count = self.recount(product_id).await?;
        info!(%product_id, user_id = %voter.id, upvotes = count, "upvote added");
        Ok(VoteState {
            upvoted: true,
            upvotes_count: count,
        })
    }

    /// Number of Vote rows for the product.
    pub async fn get_upvotes(&self, product_id: Uuid) -> Result<i64> {
        Ok(self.votes.count_by_product(product_id).await? as i64)
    }

    pub async fn has_upvoted(&self, product_id: Uuid, user_id: Uuid) -> Result<bool> {
        Ok(self.votes.find(product_id, user_id).await?.is_some())
    }

    /// Re-derives `upvotes_count` from the Vote rows and persists it.
    pub async fn recount(&self, product_id: Uuid) -> Result<i64> {
        counters::recount_upvotes(self.votes.as_ref(), self.products.as_ref(), product_id).await
    }
}
