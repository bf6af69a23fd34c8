use axum::extract::State;
use domains::User;
use services::accounts::{Credentials, Registration};

use crate::envelope::{Envelope, TokenBody};
use crate::error::ApiResult;
use crate::extract::{ApiJson, AuthUser};
use crate::metrics;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Registration>,
) -> ApiResult<TokenBody> {
    let token = state.services.accounts.register(body).await?;
    state.metrics.record(metrics::USER_REGISTER);
    Ok(TokenBody::new(token))
}

pub async fn login(State(state): State<AppState>, ApiJson(body): ApiJson<Credentials>) -> ApiResult<TokenBody> {
    Ok(TokenBody::new(state.services.accounts.login(body).await?))
}

pub async fn me(State(state): State<AppState>, AuthUser(principal): AuthUser) -> ApiResult<Envelope<User>> {
    Ok(Envelope::ok(state.services.accounts.me(&principal).await?))
}
