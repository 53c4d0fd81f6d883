//! Product business logic - Stock intake and stock-line lookups.
//!
//! Intake is a pure append: a new line is validated and inserted with its
//! received quantity recorded twice, once as the running `quantity` and once as
//! the immutable `received_quantity` used by ledger reconciliation. Nothing in
//! this module ever changes `quantity` afterwards; only a committed sale does.

use crate::{
    entities::{Product, product},
    errors::{Error, Result},
    models::NewProductRequest,
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Retrieves every stock line, oldest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_products<C>(db: &C) -> Result<Vec<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .order_by_asc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds all stock lines carrying exactly this product name.
///
/// Several intakes of the same product produce several lines, so this returns
/// a list rather than an option.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_products_by_name<C>(db: &C, name: &str) -> Result<Vec<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .filter(product::Column::Name.eq(name))
        .order_by_asc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific stock line by its unique ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lines whose remaining quantity is below their reorder threshold.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_products_needing_reorder<C>(db: &C) -> Result<Vec<product::Model>>
where
    C: ConnectionTrait,
{
    Ok(get_all_products(db)
        .await?
        .into_iter()
        .filter(product::Model::needs_reorder)
        .collect())
}

/// Checks an intake request without touching the database.
///
/// # Errors
/// Returns [`Error::Validation`] if:
/// - The product name is empty or whitespace-only
/// - The quantity or reorder threshold is negative
/// - The price is negative or not finite (NaN, infinity)
pub fn validate_new_product(request: &NewProductRequest) -> Result<()> {
    if request.product.trim().is_empty() {
        return Err(Error::validation("Product name cannot be empty"));
    }

    if request.quantity < 0 {
        return Err(Error::validation(format!(
            "Quantity must be a non-negative integer, got {}",
            request.quantity
        )));
    }

    if request.reorder < 0 {
        return Err(Error::validation(format!(
            "Reorder level must be a non-negative integer, got {}",
            request.reorder
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

/// Records a new stock line ("stock in").
///
/// The name and free-text fields are trimmed, the date defaults to today and
/// `added_by` is the authenticated caller, never a value from the request body.
///
/// # Errors
/// Returns an error if validation fails or the database insert fails.
pub async fn create_product(
    db: &DatabaseConnection,
    request: NewProductRequest,
    added_by: &str,
) -> Result<product::Model> {
    validate_new_product(&request)?;

    let now = chrono::Utc::now();
    let date = request
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let line = product::ActiveModel {
        date: Set(date),
        proforma: Set(request.proforma.trim().to_string()),
        name: Set(request.product.trim().to_string()),
        quantity: Set(request.quantity),
        received_quantity: Set(request.quantity),
        price: Set(request.price),
        oem: Set(request.oem.trim().to_string()),
        reorder: Set(request.reorder),
        added_by: Set(added_by.to_string()),
        created_at: Set(now),
        ..Default::default()
    };

    let created = line.insert(db).await?;
    tracing::info!(
        product_id = created.id,
        product = %created.name,
        quantity = created.quantity,
        added_by = %created.added_by,
        "Stock line added"
    );
    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        // Validation runs before any query, so nothing is written
        let db = setup_test_db().await?;

        // Test empty name validation
        let result = create_product(&db, intake_request("", 1, 10.0), "admin").await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        // Test whitespace-only name validation
        let result = create_product(&db, intake_request("   ", 1, 10.0), "admin").await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        // Test negative quantity validation
        let result = create_product(&db, intake_request("Widget A", -1, 10.0), "admin").await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        // Test negative price validation
        let result = create_product(&db, intake_request("Widget A", 1, -10.0), "admin").await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        // Test NaN price validation
        let result = create_product(&db, intake_request("Widget A", 1, f64::NAN), "admin").await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        // Test negative reorder validation
        let mut request = intake_request("Widget A", 1, 10.0);
        request.reorder = -3;
        let result = create_product(&db, request, "admin").await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        assert!(get_all_products(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let mut request = intake_request("  Widget A  ", 12, 15.50);
        request.date = chrono::NaiveDate::from_ymd_opt(2024, 3, 1);
        let product = create_product(&db, request, "amira").await?;

        assert_eq!(product.name, "Widget A");
        assert_eq!(product.quantity, 12);
        assert_eq!(product.received_quantity, 12);
        assert_eq!(product.price, 15.50);
        assert_eq!(product.added_by, "amira");
        assert_eq!(
            product.date,
            chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );

        let found = get_product_by_id(&db, product.id).await?.unwrap();
        assert_eq!(found, product);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_defaults_date_to_today() -> Result<()> {
        let db = setup_test_db().await?;

        let product = create_product(&db, intake_request("Widget A", 1, 1.0), "amira").await?;
        assert_eq!(product.date, chrono::Local::now().date_naive());

        Ok(())
    }

    #[tokio::test]
    async fn test_zero_quantity_intake_allowed() -> Result<()> {
        let db = setup_test_db().await?;

        let product = create_product(&db, intake_request("Placeholder", 0, 0.0), "amira").await?;
        assert_eq!(product.quantity, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_products_by_name_returns_every_line() -> Result<()> {
        let db = setup_test_db().await?;

        let first = create_test_product(&db, "Widget A", 5, 10.0).await?;
        create_test_product(&db, "Gadget B", 2, 4.0).await?;
        let second = create_test_product(&db, "Widget A", 3, 11.0).await?;

        let lines = get_products_by_name(&db, "Widget A").await?;
        assert_eq!(lines, vec![first, second]);

        assert!(get_products_by_name(&db, "widget a").await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_get_all_products_oldest_first() -> Result<()> {
        let db = setup_test_db().await?;

        let a = create_test_product(&db, "Widget A", 5, 10.0).await?;
        let b = create_test_product(&db, "Gadget B", 2, 4.0).await?;

        let all = get_all_products(&db).await?;
        assert_eq!(all, vec![a, b]);

        Ok(())
    }

    #[tokio::test]
    async fn test_products_needing_reorder() -> Result<()> {
        let db = setup_test_db().await?;

        let mut low = intake_request("Cable", 2, 1.0);
        low.reorder = 5;
        let low = create_product(&db, low, "amira").await?;

        let mut fine = intake_request("Switch", 10, 1.0);
        fine.reorder = 5;
        create_product(&db, fine, "amira").await?;

        let flagged = get_products_needing_reorder(&db).await?;
        assert_eq!(flagged, vec![low]);

        Ok(())
    }
}
