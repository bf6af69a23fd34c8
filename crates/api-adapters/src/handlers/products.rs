//! Product catalogue endpoints.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use domains::Product;
use services::cascades::ProductCascade;
use services::products::{ListParams, NewProduct, ProductPatch};

use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::extract::{parse_id, ApiJson, AuthUser};
use crate::metrics;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Envelope<Vec<Product>>> {
    let Query(params) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let listing = state.services.products.list(params).await?;
    let count = listing.products.len();
    Ok(Envelope::ok(listing.products)
        .with_count(count)
        .with_pagination(listing.pagination))
}

pub async fn get(State(state): State<AppState>, Path(raw): Path<String>) -> ApiResult<Envelope<Product>> {
    let id = parse_id(&raw, "product")?;
    Ok(Envelope::ok(state.services.products.get(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<NewProduct>,
) -> ApiResult<Envelope<Product>> {
    let product = state.services.products.create(&principal, body).await?;
    state.metrics.record(metrics::PRODUCT_CREATE);
    Ok(Envelope::created(product))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(raw): Path<String>,
    ApiJson(body): ApiJson<ProductPatch>,
) -> ApiResult<Envelope<Product>> {
    let id = parse_id(&raw, "product")?;
    let product = state.services.products.update(&principal, id, body).await?;
    state.metrics.record(metrics::PRODUCT_UPDATE);
    Ok(Envelope::ok(product))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(raw): Path<String>,
) -> ApiResult<Envelope<ProductCascade>> {
    let id = parse_id(&raw, "product")?;
    let cascade = state.services.products.delete(&principal, id).await?;
    state.metrics.record(metrics::PRODUCT_DELETE);
    Ok(Envelope::ok(cascade))
}
