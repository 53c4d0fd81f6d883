//! Sale endpoints.
//!
//! `POST /sales/sell` is the only way stock quantity changes. The handler hands
//! the request to [`sale::sell_product`], which validates and commits in one
//! transaction; a failure response therefore always means nothing was written.

use crate::{
    api::{AppState, auth::Identity, error::ApiError},
    core::sale,
    entities::SaleModel,
    models::SellRequest,
};
use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};

/// `GET /sales` - every sale, oldest first.
pub async fn list_sales(
    State(state): State<AppState>,
    _identity: Identity,
) -> Result<Json<Vec<SaleModel>>, ApiError> {
    Ok(Json(sale::get_all_sales(&state.db).await?))
}

/// `POST /sales/sell` - `201` for a new sale, `200` when an identical
/// invoiced request was already committed.
pub async fn sell(
    State(state): State<AppState>,
    identity: Identity,
    body: Result<Json<SellRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SaleModel>), ApiError> {
    let Json(request) = body?;
    let product = request.product.clone();
    let requested = request.quantity;

    let outcome = sale::sell_product(&state.db, request, &identity.name)
        .await
        .inspect_err(|e| {
            tracing::info!(product = %product, requested, user = %identity.name, error = %e, "Sale rejected");
        })?;

    let status = if outcome.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(outcome.sale)))
}
