//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases,
//! building requests with sensible defaults and running the HTTP service on an
//! ephemeral port.

use crate::{
    api::{self, AppState, UserDirectory},
    config::{app::UserConfig, database},
    core::product,
    entities,
    errors::Result,
    models::{NewProductRequest, Role, SellRequest},
};
use sea_orm::{ConnectOptions, DatabaseConnection};

/// Bearer token of the test administrator
pub const ADMIN_TOKEN: &str = "admin-token";
/// Bearer token of the test sales clerk
pub const STAFF_TOKEN: &str = "staff-token";

/// Creates an in-memory `SQLite` database with all tables initialized.
///
/// The pool holds a single connection so the in-memory database is shared by
/// every query, and concurrent transactions queue behind each other.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = sea_orm::Database::connect(options).await?;
    database::create_tables(&db).await?;
    Ok(db)
}

/// Intake request with the given name, quantity and price.
///
/// # Defaults
/// * `date`: None (today)
/// * `proforma`: `"PF-TEST"`
/// * `oem`: `"OEM"`
/// * `reorder`: 0
#[must_use]
pub fn intake_request(name: &str, quantity: i64, price: f64) -> NewProductRequest {
    NewProductRequest {
        date: None,
        proforma: "PF-TEST".to_string(),
        product: name.to_string(),
        quantity,
        price,
        oem: "OEM".to_string(),
        reorder: 0,
    }
}

/// Sale request by product name with no invoice (no de-duplication).
#[must_use]
pub fn sale_request(name: &str, quantity: i64, price: f64) -> SellRequest {
    SellRequest {
        date: None,
        product_id: None,
        product: name.to_string(),
        quantity,
        price,
        customer: "Test Customer".to_string(),
        po: "PO-TEST".to_string(),
        invoice: String::new(),
    }
}

/// Creates a test stock line added by `"test_admin"`.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    quantity: i64,
    price: f64,
) -> Result<entities::product::Model> {
    product::create_product(db, intake_request(name, quantity, price), "test_admin").await
}

/// One admin and one staff user.
#[must_use]
pub fn test_users() -> UserDirectory {
    UserDirectory::from_config(&[
        UserConfig {
            name: "Amira".to_string(),
            role: Role::Admin,
            token: ADMIN_TOKEN.to_string(),
        },
        UserConfig {
            name: "Omar".to_string(),
            role: Role::Staff,
            token: STAFF_TOKEN.to_string(),
        },
    ])
}

/// Application state over a fresh database with the test users.
pub async fn setup_test_state() -> Result<AppState> {
    let db = setup_test_db().await?;
    Ok(AppState::new(db, test_users()))
}

/// Serves the API on `127.0.0.1:0` in the background.
///
/// Returns the base URL (including `/api`) and the database behind it.
pub async fn spawn_test_server() -> Result<(String, DatabaseConnection)> {
    let state = setup_test_state().await?;
    let db = state.db.clone();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = api::router(state);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Test server stopped: {}", e);
        }
    });

    Ok((format!("http://{addr}/api"), db))
}
