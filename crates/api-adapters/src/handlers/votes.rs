//! Vote Ledger endpoints.

use axum::extract::{Path, State};
use domains::DomainError;
use serde::{Deserialize, Serialize};
use services::vote_ledger::VoteState;

use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::extract::{parse_id, ApiJson, AuthUser};
use crate::metrics;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleVoteRequest {
    pub product_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpvoteCount {
    pub upvotes_count: i64,
}

#[derive(Debug, Serialize)]
pub struct HasUpvoted {
    pub upvoted: bool,
}

pub async fn toggle(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<ToggleVoteRequest>,
) -> ApiResult<Envelope<VoteState>> {
    let raw = body
        .product_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::Domain(DomainError::validation("Product ID required")))?;
    let product_id = parse_id(&raw, "product")?;

    let vote = state.services.votes.toggle_vote(product_id, &principal).await?;
    state.metrics.record(metrics::VOTE_TOGGLE);
    Ok(Envelope::ok(vote))
}

pub async fn count(State(state): State<AppState>, Path(raw): Path<String>) -> ApiResult<Envelope<UpvoteCount>> {
    let product_id = parse_id(&raw, "product")?;
    let upvotes_count = state.services.votes.get_upvotes(product_id).await?;
    Ok(Envelope::ok(UpvoteCount { upvotes_count }))
}

pub async fn has_upvoted(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(raw): Path<String>,
) -> ApiResult<Envelope<HasUpvoted>> {
    let product_id = parse_id(&raw, "product")?;
    let upvoted = state.services.votes.has_upvoted(product_id, principal.id).await?;
    Ok(Envelope::ok(HasUpvoted { upvoted }))
}
