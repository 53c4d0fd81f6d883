//! Stock-line endpoints.

use crate::{
    api::{AppState, auth::Identity, error::ApiError},
    core::product,
    entities::ProductModel,
    models::NewProductRequest,
};
use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};

/// `GET /products` - every stock line, oldest first.
pub async fn list_products(
    State(state): State<AppState>,
    _identity: Identity,
) -> Result<Json<Vec<ProductModel>>, ApiError> {
    Ok(Json(product::get_all_products(&state.db).await?))
}

/// `GET /products/reorder` - lines below their reorder threshold.
pub async fn list_reorder(
    State(state): State<AppState>,
    _identity: Identity,
) -> Result<Json<Vec<ProductModel>>, ApiError> {
    Ok(Json(product::get_products_needing_reorder(&state.db).await?))
}

/// `POST /products` - stock intake, administrators only.
pub async fn add_product(
    State(state): State<AppState>,
    identity: Identity,
    body: Result<Json<NewProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductModel>), ApiError> {
    identity.require_admin("add stock")?;
    let Json(request) = body?;
    let created = product::create_product(&state.db, request, &identity.name).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
