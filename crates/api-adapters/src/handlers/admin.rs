use axum::extract::State;
use services::analytics::{AnalyticsReport, DEFAULT_TOP_N};

use crate::envelope::Envelope;
use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::state::AppState;

pub async fn analytics(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> ApiResult<Envelope<AnalyticsReport>> {
    state.services.guard.require_admin(&principal)?;
    let report = state.services.analytics.snapshot(DEFAULT_TOP_N).await?;
    Ok(Envelope::ok(report))
}
