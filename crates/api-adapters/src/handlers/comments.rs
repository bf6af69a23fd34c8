//! Comment Tree endpoints.

use axum::extract::{Path, State};
use domains::{Comment, CommentThread};
use serde::Deserialize;
use services::cascades::CommentCascade;

use crate::envelope::Envelope;
use crate::error::ApiResult;
use crate::extract::{parse_id, ApiJson, AuthUser};
use crate::metrics;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    #[serde(default)]
    pub content: String,
}

pub async fn list(State(state): State<AppState>, Path(raw): Path<String>) -> ApiResult<Envelope<Vec<CommentThread>>> {
    let product_id = parse_id(&raw, "product")?;
    let threads = state.services.comments.list_comments(product_id).await?;
    let count = threads.len();
    Ok(Envelope::ok(threads).with_count(count))
}

pub async fn add(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(raw): Path<String>,
    ApiJson(body): ApiJson<CommentBody>,
) -> ApiResult<Envelope<Comment>> {
    let product_id = parse_id(&raw, "product")?;
    let written = state
        .services
        .comments
        .add_comment(product_id, &principal, &body.content)
        .await?;
    state.metrics.record(metrics::COMMENT_ADD);
    Ok(Envelope::created(written.comment).with_comments_count(written.comments_count))
}

pub async fn reply(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(raw): Path<String>,
    ApiJson(body): ApiJson<CommentBody>,
) -> ApiResult<Envelope<Comment>> {
    let parent_id = parse_id(&raw, "comment")?;
    let written = state
        .services
        .comments
        .add_reply(parent_id, &principal, &body.content)
        .await?;
    state.metrics.record(metrics::COMMENT_REPLY);
    Ok(Envelope::created(written.comment).with_comments_count(written.comments_count))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(raw): Path<String>,
    ApiJson(body): ApiJson<CommentBody>,
) -> ApiResult<Envelope<Comment>> {
    let comment_id = parse_id(&raw, "comment")?;
    let comment = state
        .services
        .comments
        .update_comment(comment_id, &principal, &body.content)
        .await?;
    state.metrics.record(metrics::COMMENT_UPDATE);
    Ok(Envelope::ok(comment))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(raw): Path<String>,
) -> ApiResult<Envelope<CommentCascade>> {
    let comment_id = parse_id(&raw, "comment")?;
    let cascade = state.services.comments.delete_comment(comment_id, &principal).await?;
    state.metrics.record(metrics::COMMENT_DELETE);
    Ok(Envelope::ok(cascade).with_comments_count(cascade.comments_count))
}
