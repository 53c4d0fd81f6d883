//! Database configuration module.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. Tables are
//! generated from the entity definitions with `Schema::create_table_from_entity`
//! so the schema always matches the Rust structs, and creation is idempotent so
//! the service can restart against an existing file.

use crate::config::app::DatabaseSettings;
use crate::entities::{Product, Sale};
use crate::errors::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;

/// Default database location when neither config nor environment name one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/stock_ledger.sqlite?mode=rwc";

/// Establishes a connection pool for the configured database.
///
/// `SQLite` admits one writer at a time, so the pool defaults to a single
/// connection; sale transactions then commit strictly one after another.
pub async fn create_connection(settings: &DatabaseSettings) -> Result<DatabaseConnection> {
    ensure_parent_dir(&settings.url)?;
    let mut options = ConnectOptions::new(settings.url.clone());
    options
        .max_connections(settings.max_connections)
        .sqlx_logging(false);

    tracing::debug!(url = %settings.url, max_connections = settings.max_connections, "Connecting to database");
    Database::connect(options).await.map_err(Into::into)
}

/// `mode=rwc` creates the file but not its directory.
fn ensure_parent_dir(url: &str) -> Result<()> {
    let Some(rest) = url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let file = rest.split('?').next().unwrap_or(rest);
    if let Some(parent) = Path::new(file).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Creates the `products` and `sales` tables if they do not exist yet.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // products first: sales carries a foreign key to it
    let mut product_table = schema.create_table_from_entity(Product);
    product_table.if_not_exists();
    let mut sale_table = schema.create_table_from_entity(Sale);
    sale_table.if_not_exists();

    db.execute(builder.build(&product_table)).await?;
    db.execute(builder.build(&sale_table)).await?;

    Ok(())
}
