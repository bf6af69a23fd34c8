//! # Comment Tree
//!
//! Two-level threads: top-level comments and their direct replies. A reply
//! always inherits its parent's product. `Product::comments_count` counts both
//! levels and is rebuilt by a full recount after every add or delete.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use domains::{
    Comment, CommentRepository, CommentThread, DomainError, Principal, ProductRepository, ReplyView,
    Result, Store, UserRepository,
};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::access_guard::{AccessGuard, Action};
use crate::cascades::{Cascades, CommentCascade};
use crate::{counters, validation};

/// A freshly written comment and the product's recounted total.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWrite {
    pub comment: Comment,
    pub comments_count: i64,
}

#[derive(Clone)]
pub struct CommentTree {
    users: Arc<dyn UserRepository>,
    products: Arc<dyn ProductRepository>,
    comments: Arc<dyn CommentRepository>,
    cascades: Cascades,
    guard: AccessGuard,
}

impl CommentTree {
    pub fn new(store: &Store, guard: AccessGuard) -> Self {
        Self {
            users: store.users.clone(),
            products: store.products.clone(),
            comments: store.comments.clone(),
            cascades: Cascades::new(store),
            guard,
        }
    }

    /// Adds a top-level comment to `product_id`.
    pub async fn add_comment(&self, product_id: Uuid, author: &Principal, content: &str) -> Result<CommentWrite> {
        let content = validation::comment_content(content, "Comment")?;
        if self.products.find_by_id(product_id).await?.is_none() {
            return Err(DomainError::not_found("Product", product_id));
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            content,
            product_id,
            author_id: author.id,
            username: author.username.clone(),
            parent_id: None,
            replies: Vec::new(),
            created_at: Utc::now(),
        };
        self.comments.insert(comment.clone()).await?;
        let comments_count = self.recount(product_id).await?;
        info!(comment_id = %comment.id, %product_id, user_id = %author.id, comments_count, "comment added");
        Ok(CommentWrite {
            comment,
            comments_count,
        })
    }

    /// Adds a reply under `parent_id`.
    ///
    /// Threads are two levels deep: replying to a reply attaches the new
    /// comment to that reply's top-level parent.
    pub async fn add_reply(&self, parent_id: Uuid, author: &Principal, content: &str) -> Result<CommentWrite> {
        let content = validation::comment_content(content, "Reply")?;
        let mut parent = self
            .comments
            .find_by_id(parent_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", parent_id))?;
        if let Some(root_id) = parent.parent_id {
            debug!(%parent_id, %root_id, "reply to a reply attached to the thread root");
            parent = self
                .comments
                .find_by_id(root_id)
                .await?
                .ok_or_else(|| DomainError::not_found("Comment", root_id))?;
        }
        if self.products.find_by_id(parent.product_id).await?.is_none() {
            return Err(DomainError::not_found("Product", parent.product_id));
        }

        let reply = Comment {
            id: Uuid::new_v4(),
            content,
            product_id: parent.product_id,
            author_id: author.id,
            username: author.username.clone(),
            parent_id: Some(parent.id),
            replies: Vec::new(),
            created_at: Utc::now(),
        };
        self.comments.insert(reply.clone()).await?;
        self.comments.append_reply(parent.id, reply.id).await?;
        let comments_count = self.recount(reply.product_id).await?;
        info!(
            comment_id = %reply.id,
            parent_id = %parent.id,
            product_id = %reply.product_id,
            user_id = %author.id,
            comments_count,
            "reply added"
        );
        Ok(CommentWrite {
            comment: reply,
            comments_count,
        })
    }

    /// Rewrites the content of a comment owned by `requester` (or any, for admins).
    ///
    /// The author-name snapshot is refreshed from the author's current record.
    pub async fn update_comment(&self, comment_id: Uuid, requester: &Principal, content: &str) -> Result<Comment> {
        let existing = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", comment_id))?;
        self.guard
            .authorize(requester, existing.author_id, Action::UpdateComment)?;
        let content = validation::comment_content(content, "Comment")?;

        let username = match self.users.find_by_id(existing.author_id).await? {
            Some(author) => author.username,
            None => existing.username.clone(),
        };
        let updated = self
            .comments
            .update_content(comment_id, content, username)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", comment_id))?;
        info!(%comment_id, user_id = %requester.id, "comment updated");
        Ok(updated)
    }

    /// Deletes a comment owned by `requester` (or any, for admins).
    pub async fn delete_comment(&self, comment_id: Uuid, requester: &Principal) -> Result<CommentCascade> {
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", comment_id))?;
        self.guard
            .authorize(requester, comment.author_id, Action::DeleteComment)?;

        self.comments.delete(comment_id).await?;
        let report = self.cascades.on_comment_deleted(&comment).await?;
        info!(%comment_id, user_id = %requester.id, "comment deleted");
        Ok(report)
    }

    /// Top-level comments of a product, newest first, each with its replies
    /// and the reply authors' avatars.
    pub async fn list_comments(&self, product_id: Uuid) -> Result<Vec<CommentThread>> {
        let top_level = self.comments.list_top_level(product_id).await?;
        let mut avatars: HashMap<Uuid, Option<String>> = HashMap::new();
        let mut threads = Vec::with_capacity(top_level.len());

        for comment in top_level {
            let replies = self.comments.find_many(comment.replies.clone()).await?;
            let mut views = Vec::with_capacity(replies.len());
            for reply in replies {
                let author_avatar = match avatars.get(&reply.author_id) {
                    Some(avatar) => avatar.clone(),
                    None => {
                        let avatar = self
                            .users
                            .find_by_id(reply.author_id)
                            .await?
                            .and_then(|u| u.avatar);
                        avatars.insert(reply.author_id, avatar.clone());
                        avatar
                    }
                };
                views.push(ReplyView {
                    comment: reply,
                    author_avatar,
                });
            }
            threads.push(CommentThread::new(comment, views));
        }
        Ok(threads)
    }

    /// Re-derives `comments_count` from the Comment rows and persists it.
    pub async fn recount(&self, product_id: Uuid) -> Result<i64> {
        counters::recount_comments(self.comments.as_ref(), self.products.as_ref(), product_id).await
    }
}
