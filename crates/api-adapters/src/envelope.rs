//! Success bodies: `{success: true, data, ...}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use services::products::Pagination;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<Pagination>,
    /// Recounted product total after a comment write
    #[serde(skip_serializing_if = "Option::is_none")]
    comments_count: Option<i64>,
    data: T,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            count: None,
            pagination: None,
            comments_count: None,
            data,
            status: StatusCode::OK,
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(data)
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn with_comments_count(mut self, comments_count: i64) -> Self {
        self.comments_count = Some(comments_count);
        self
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

/// Body returned by register and login.
#[derive(Debug, Serialize)]
pub struct TokenBody {
    pub success: bool,
    pub token: String,
}

impl TokenBody {
    pub fn new(token: String) -> Self {
        Self { success: true, token }
    }
}

impl IntoResponse for TokenBody {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
