//! Read-only reporting endpoints.

use crate::{
    api::{AppState, auth::Identity, error::ApiError},
    core::{
        ledger::{self, LedgerBalance},
        product, sale,
        summary::{self, ValueSummary},
    },
};
use axum::{Json, extract::State};

/// `GET /summary` - stock value, sold value and profit/loss.
pub async fn value_summary(
    State(state): State<AppState>,
    _identity: Identity,
) -> Result<Json<ValueSummary>, ApiError> {
    let products = product::get_all_products(&state.db).await?;
    let sales = sale::get_all_sales(&state.db).await?;
    Ok(Json(summary::summarize(&products, &sales)))
}

/// `GET /ledger` - per-product reconciliation of received, available and sold units.
pub async fn ledger_balances(
    State(state): State<AppState>,
    _identity: Identity,
) -> Result<Json<Vec<LedgerBalance>>, ApiError> {
    Ok(Json(ledger::reconcile(&state.db).await?))
}
