//! Sale business logic - Records stock leaving the inventory ("stock out").
//!
//! A sale is one write to the ledger even though it touches two tables: the
//! stock line's `quantity` is decremented and a `sales` row is appended inside a
//! single database transaction. A reader sees both changes or neither.
//!
//! The remaining quantity is never taken from the caller. The decrement is a
//! guarded update evaluated by the store at commit time:
//! `UPDATE products SET quantity = quantity - n WHERE id = ? AND quantity >= n`,
//! so two sales racing for the same units cannot both succeed.
//!
//! A non-empty invoice is canonicalized into an idempotency key. Replaying a
//! committed request returns the original sale instead of selling twice.

use crate::{
    core::product::{get_product_by_id, get_products_by_name},
    entities::{Product, Sale, product, sale},
    errors::{Error, Result},
    models::SellRequest,
};
use sea_orm::{
    DatabaseTransaction, DbErr, QueryOrder, RuntimeErr, Set, TransactionTrait, prelude::*,
    sea_query::Expr, sqlx,
};
use std::time::Duration;

/// Result of a sale request that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleOutcome {
    /// The committed sale
    pub sale: sale::Model,
    /// True when the request matched an already committed sale and nothing changed
    pub replayed: bool,
}

/// Retrieves every sale, oldest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_sales<C>(db: &C) -> Result<Vec<sale::Model>>
where
    C: ConnectionTrait,
{
    Sale::find()
        .order_by_asc(sale::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the sales recorded against one stock line, oldest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_sales_for_product<C>(db: &C, product_id: i64) -> Result<Vec<sale::Model>>
where
    C: ConnectionTrait,
{
    Sale::find()
        .filter(sale::Column::ProductId.eq(product_id))
        .order_by_asc(sale::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Canonical idempotency key for an invoice reference.
///
/// Surrounding whitespace and ASCII case are ignored; a blank invoice has no key.
#[must_use]
pub fn canonical_invoice(invoice: &str) -> Option<String> {
    let trimmed = invoice.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_ascii_uppercase())
}

/// Checks a sale request without touching the database.
///
/// # Errors
/// Returns [`Error::Validation`] if:
/// - Neither a line id nor a product name is given
/// - The quantity is zero or negative
/// - The price is negative or not finite (NaN, infinity)
pub fn validate_sale(request: &SellRequest) -> Result<()> {
    if request.product_id.is_none() && request.product.trim().is_empty() {
        return Err(Error::validation("Product name cannot be empty"));
    }

    if request.quantity <= 0 {
        return Err(Error::validation(format!(
            "Quantity must be a positive integer, got {}",
            request.quantity
        )));
    }

    if !request.price.is_finite() || request.price < 0.0 {
        return Err(Error::validation(format!(
            "Price must be a non-negative number, got {}",
            request.price
        )));
    }

    Ok(())
}

/// Whether a stored sale is the committed form of this request.
fn is_same_sale(existing: &sale::Model, request: &SellRequest) -> bool {
    let same_line = request.product_id.map_or_else(
        || existing.name == request.product.trim(),
        |id| existing.product_id == id,
    );

    same_line
        && existing.quantity == request.quantity
        && existing.customer == request.customer.trim()
        && existing.po == request.po.trim()
}

/// Picks the single stock line a request refers to.
async fn resolve_line<C>(db: &C, request: &SellRequest) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let name = request.product.trim();

    if let Some(product_id) = request.product_id {
        let line = get_product_by_id(db, product_id)
            .await?
            .ok_or_else(|| Error::ProductNotFound {
                name: product_id.to_string(),
            })?;

        if !name.is_empty() && line.name != name {
            return Err(Error::ProductNotFound {
                name: format!("{name} (line {product_id})"),
            });
        }
        return Ok(line);
    }

    let mut lines = get_products_by_name(db, name).await?;
    match lines.len() {
        0 => Err(Error::ProductNotFound {
            name: name.to_string(),
        }),
        1 => Ok(lines.remove(0)),
        count => Err(Error::AmbiguousProduct {
            name: name.to_string(),
            lines: count,
        }),
    }
}

/// Number of times a sale is retried when `SQLite` reports the store busy.
const BUSY_RETRIES: u32 = 10;

/// Whether the store refused a lock (`SQLITE_BUSY`, including extended codes).
///
/// Two deferred transactions that both read and then try to write cannot both
/// upgrade their lock; `SQLite` fails one of them at once instead of waiting.
fn is_busy(error: &Error) -> bool {
    let Error::Database(DbErr::Conn(runtime) | DbErr::Exec(runtime) | DbErr::Query(runtime)) = error
    else {
        return false;
    };
    let RuntimeErr::SqlxError(sqlx::Error::Database(db_error)) = runtime else {
        return false;
    };
    db_error
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| (code & 0xff) == 5)
}

/// Sells units from one stock line and records the sale, atomically.
///
/// On success exactly one line lost `request.quantity` units and exactly one
/// sale was appended with the supplied price and `sold_by`. On any error the
/// transaction is rolled back and neither table changes.
///
/// A transaction the store refuses with `SQLITE_BUSY` is rolled back and run
/// again from the start, so it sees the stock left by whichever sale won.
///
/// # Errors
/// Returns:
/// - [`Error::Validation`] for malformed input
/// - [`Error::DuplicateInvoice`] if the invoice belongs to a different sale
/// - [`Error::ProductNotFound`] / [`Error::AmbiguousProduct`] if no single line matches
/// - [`Error::InsufficientStock`] if the line holds fewer units than requested
/// - [`Error::Database`] if the store fails, or stays busy after every retry
pub async fn sell_product(
    db: &DatabaseConnection,
    request: SellRequest,
    sold_by: &str,
) -> Result<SaleOutcome> {
    validate_sale(&request)?;

    let mut attempt = 0;
    loop {
        match try_sell(db, &request, sold_by).await {
            Err(e) if attempt < BUSY_RETRIES && is_busy(&e) => {
                attempt += 1;
                tracing::debug!(attempt, product = %request.product, "Store busy, retrying sale");
                tokio::time::sleep(Duration::from_millis(10 * u64::from(attempt))).await;
            }
            result => return result,
        }
    }
}

/// One attempt: begin, sell, then commit or roll back.
async fn try_sell(
    db: &DatabaseConnection,
    request: &SellRequest,
    sold_by: &str,
) -> Result<SaleOutcome> {
    let txn = db.begin().await?;

    let outcome = match sell_within(&txn, request, sold_by).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Err(rollback) = txn.rollback().await {
                tracing::warn!("Failed to roll back sale: {}", rollback);
            }
            return Err(e);
        }
    };
    txn.commit().await?;

    if outcome.replayed {
        tracing::info!(
            sale_id = outcome.sale.id,
            invoice = %outcome.sale.invoice,
            "Sale replayed, nothing changed"
        );
    } else {
        tracing::info!(
            sale_id = outcome.sale.id,
            product_id = outcome.sale.product_id,
            product = %outcome.sale.name,
            quantity = outcome.sale.quantity,
            sold_by = %outcome.sale.sold_by,
            "Sale committed"
        );
    }
    Ok(outcome)
}

/// The sale's reads and writes, inside an open transaction.
async fn sell_within(
    txn: &DatabaseTransaction,
    request: &SellRequest,
    sold_by: &str,
) -> Result<SaleOutcome> {
    let idempotency_key = canonical_invoice(&request.invoice);

    if let Some(key) = &idempotency_key {
        let existing = Sale::find()
            .filter(sale::Column::IdempotencyKey.eq(key.as_str()))
            .one(txn)
            .await?;

        if let Some(existing) = existing {
            if is_same_sale(&existing, request) {
                return Ok(SaleOutcome {
                    sale: existing,
                    replayed: true,
                });
            }
            return Err(Error::DuplicateInvoice {
                invoice: key.clone(),
            });
        }
    }

    let line = resolve_line(txn, request).await?;

    if line.quantity < request.quantity {
        return Err(Error::InsufficientStock {
            product: line.name,
            available: line.quantity,
            requested: request.quantity,
        });
    }

    // Guarded decrement: the store decides, not the value read above
    let decremented = Product::update_many()
        .col_expr(
            product::Column::Quantity,
            Expr::col(product::Column::Quantity).sub(request.quantity),
        )
        .filter(product::Column::Id.eq(line.id))
        .filter(product::Column::Quantity.gte(request.quantity))
        .exec(txn)
        .await?;

    if decremented.rows_affected != 1 {
        let available = get_product_by_id(txn, line.id)
            .await?
            .map_or(0, |current| current.quantity);
        return Err(Error::InsufficientStock {
            product: line.name,
            available,
            requested: request.quantity,
        });
    }

    let record = sale::ActiveModel {
        date: Set(request
            .date
            .unwrap_or_else(|| chrono::Local::now().date_naive())),
        product_id: Set(line.id),
        name: Set(line.name),
        quantity: Set(request.quantity),
        price: Set(request.price),
        customer: Set(request.customer.trim().to_string()),
        po: Set(request.po.trim().to_string()),
        invoice: Set(request.invoice.trim().to_string()),
        idempotency_key: Set(idempotency_key),
        sold_by: Set(sold_by.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let created = record.insert(txn).await?;

    Ok(SaleOutcome {
        sale: created,
        replayed: false,
    })
}
