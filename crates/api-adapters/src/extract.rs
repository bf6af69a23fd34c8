//! Request extractors that reject with the JSON error envelope.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use domains::{DomainError, Principal};
use services::access_guard::bearer_token;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller. Rejects with 401 when the bearer token is
/// missing, invalid, or names a user that no longer exists.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| DomainError::Unauthenticated("Not authorized to access this route".into()))?;

        let principal = state.services.guard.authenticate(token).await?;
        Ok(AuthUser(principal))
    }
}

/// `Json<T>` whose rejection is a 400 envelope instead of axum's plain text.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

/// Parses an id taken from a path segment or body field.
pub fn parse_id(raw: &str, entity: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::Domain(DomainError::validation(format!("Invalid {entity} id: {raw}"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_uuids_only() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "product").unwrap(), id);

        let err = parse_id("507f1f77bcf86cd799439011", "product").unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
