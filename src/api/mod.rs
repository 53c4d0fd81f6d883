//! HTTP interface - the backing store the client components talk to.
//!
//! Routes are nested under `/api` and every one of them requires a bearer
//! credential. Handlers stay thin: they authenticate, decode, and call into
//! [`crate::core`].

/// Bearer authentication and the user directory
pub mod auth;
/// Domain error to HTTP response mapping
pub mod error;
/// Stock-line endpoints
pub mod products;
/// Summary and ledger endpoints
pub mod reports;
/// Sale endpoints
pub mod sales;

pub use auth::{Identity, UserDirectory};
pub use error::ApiError;

use crate::errors::Result;
use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared data available to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection for all database operations
    pub db: DatabaseConnection,
    /// Configured users, keyed by token
    pub users: Arc<UserDirectory>,
}

impl AppState {
    /// Creates the state from a connection and a user directory.
    #[must_use]
    pub fn new(db: DatabaseConnection, users: UserDirectory) -> Self {
        Self {
            db,
            users: Arc::new(users),
        }
    }
}

/// Builds the full router, nested under `/api`.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/me", get(auth::me))
        .route(
            "/products",
            get(products::list_products).post(products::add_product),
        )
        .route("/products/reorder", get(products::list_reorder))
        .route("/sales", get(sales::list_sales))
        .route("/sales/sell", post(sales::sell))
        .route("/summary", get(reports::value_summary))
        .route("/ledger", get(reports::ledger_balances));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves the API until Ctrl-C.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(bind: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(addr = %listener.local_addr()?, users = state.users.len(), "Stock ledger listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Stock ledger stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::models::{ErrorBody, Failure};
    use crate::test_utils::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn call(
        state: &AppState,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn widget_intake() -> Value {
        json!({
            "date": "2024-05-01",
            "proforma": "PF-1",
            "product": "Widget A",
            "quantity": 5,
            "price": 10.0,
            "oem": "Acme",
            "reorder": 2,
            "addedBy": "ignored"
        })
    }

    #[tokio::test]
    async fn test_requests_without_credential_are_rejected() {
        let state = setup_test_state().await.unwrap();

        let (status, body) = call(&state, "GET", "/api/products", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body: ErrorBody = serde_json::from_value(body).unwrap();
        assert_eq!(body.detail, Failure::Unauthorized);

        let (status, _) = call(&state, "GET", "/api/sales", Some("bogus"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_reports_identity() {
        let state = setup_test_state().await.unwrap();

        let (status, body) = call(&state, "GET", "/api/auth/me", Some(STAFF_TOKEN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"name": "Omar", "role": "staff"}));
    }

    #[tokio::test]
    async fn test_intake_is_admin_only_and_stamps_identity() {
        let state = setup_test_state().await.unwrap();

        let (status, body) = call(
            &state,
            "POST",
            "/api/products",
            Some(STAFF_TOKEN),
            Some(widget_intake()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"]["kind"], json!("forbidden"));

        let (status, body) = call(
            &state,
            "POST",
            "/api/products",
            Some(ADMIN_TOKEN),
            Some(widget_intake()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["product"], json!("Widget A"));
        assert_eq!(body["quantity"], json!(5));
        assert_eq!(body["addedBy"], json!("Amira"));
        assert_eq!(body["date"], json!("2024-05-01"));

        let (status, body) = call(&state, "GET", "/api/products", Some(STAFF_TOKEN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_intake_is_a_validation_failure() {
        let state = setup_test_state().await.unwrap();

        let (status, body) = call(
            &state,
            "POST",
            "/api/products",
            Some(ADMIN_TOKEN),
            Some(json!({"product": "Widget A", "quantity": "lots", "price": 1.0})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"]["kind"], json!("validation"));
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_sell_flow_over_http() {
        let state = setup_test_state().await.unwrap();
        call(
            &state,
            "POST",
            "/api/products",
            Some(ADMIN_TOKEN),
            Some(widget_intake()),
        )
        .await;

        let sale = json!({
            "product": "Widget A",
            "quantity": 2,
            "price": 12.0,
            "customer": "ACME",
            "po": "PO-9",
            "invoice": "INV-9"
        });

        let (status, body) = call(
            &state,
            "POST",
            "/api/sales/sell",
            Some(STAFF_TOKEN),
            Some(sale.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["soldBy"], json!("Omar"));
        assert_eq!(body["quantity"], json!(2));
        assert!(body.get("idempotencyKey").is_none());

        // Identical retry is answered with the original sale
        let (status, replay) = call(
            &state,
            "POST",
            "/api/sales/sell",
            Some(STAFF_TOKEN),
            Some(sale),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(replay["id"], body["id"]);

        let (status, body) = call(
            &state,
            "POST",
            "/api/sales/sell",
            Some(STAFF_TOKEN),
            Some(json!({"product": "Widget A", "quantity": 4, "price": 12.0})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["detail"]["kind"], json!("insufficient_stock"));
        assert_eq!(body["detail"]["available"], json!(3));

        let (status, body) = call(
            &state,
            "POST",
            "/api/sales/sell",
            Some(STAFF_TOKEN),
            Some(json!({"product": "Gadget B", "quantity": 1, "price": 1.0})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"]["kind"], json!("product_not_found"));

        let (_, sales) = call(&state, "GET", "/api/sales", Some(STAFF_TOKEN), None).await;
        assert_eq!(sales.as_array().unwrap().len(), 1);

        let (_, summary) = call(&state, "GET", "/api/summary", Some(STAFF_TOKEN), None).await;
        assert_eq!(summary["stockValue"], json!(30.0));
        assert_eq!(summary["soldValue"], json!(24.0));
        assert_eq!(summary["profitLoss"], json!(-6.0));

        let (_, ledger) = call(&state, "GET", "/api/ledger", Some(STAFF_TOKEN), None).await;
        assert_eq!(
            ledger,
            json!([{
                "product": "Widget A",
                "received": 5,
                "available": 3,
                "sold": 2,
                "balanced": true
            }])
        );
    }

    #[tokio::test]
    async fn test_reorder_listing() {
        let state = setup_test_state().await.unwrap();
        let mut low = widget_intake();
        low["quantity"] = json!(1);
        call(&state, "POST", "/api/products", Some(ADMIN_TOKEN), Some(low)).await;

        let (status, body) =
            call(&state, "GET", "/api/products/reorder", Some(STAFF_TOKEN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }
}
