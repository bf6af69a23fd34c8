use axum::extract::State;
use services::accounts::Profile;

use crate::envelope::Envelope;
use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::state::AppState;

pub async fn profile(State(state): State<AppState>, AuthUser(principal): AuthUser) -> ApiResult<Envelope<Profile>> {
    Ok(Envelope::ok(state.services.accounts.profile(&principal).await?))
}
