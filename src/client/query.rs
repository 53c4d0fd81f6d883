//! Read path: fetch the available-stock and sold-stock collections.
//!
//! Collections are always fetched whole; there is no cache to invalidate.
//! Filtering works on the fetched snapshot and never calls the service.

use crate::{
    client::{StockClient, session::SessionContext},
    core::{
        search::filter_by_name,
        summary::{self, ValueSummary},
    },
    errors::Result,
    models::{SaleLine, StockLine},
};

/// The two collections as fetched together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    /// Available-stock lines
    pub products: Vec<StockLine>,
    /// Sold-stock lines
    pub sales: Vec<SaleLine>,
}

impl Inventory {
    /// Stock lines whose product name contains `needle`, any case.
    pub fn available<'a>(&'a self, needle: &'a str) -> impl Iterator<Item = &'a StockLine> + Clone + 'a {
        filter_by_name(&self.products, needle)
    }

    /// Sales whose product name contains `needle`, any case.
    pub fn sold<'a>(&'a self, needle: &'a str) -> impl Iterator<Item = &'a SaleLine> + Clone + 'a {
        filter_by_name(&self.sales, needle)
    }

    /// Stock lines carrying exactly this product name.
    pub fn lines_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a StockLine> + 'a {
        self.products.iter().filter(move |line| line.product == name)
    }

    /// Stock lines below their reorder threshold.
    pub fn needing_reorder(&self) -> impl Iterator<Item = &StockLine> + '_ {
        self.products.iter().filter(|line| line.needs_reorder())
    }

    /// Stock value, sold value and profit/loss of this snapshot.
    #[must_use]
    pub fn summary(&self) -> ValueSummary {
        summary::summarize(&self.products, &self.sales)
    }
}

/// Fetches stock and sales for a session.
#[derive(Debug, Clone)]
pub struct InventoryQuery {
    client: StockClient,
}

impl InventoryQuery {
    /// Query over the given transport.
    #[must_use]
    pub const fn new(client: StockClient) -> Self {
        Self { client }
    }

    /// `GET /products`
    ///
    /// # Errors
    /// Returns the service's failure or a transport error.
    pub async fn products(&self, session: &SessionContext) -> Result<Vec<StockLine>> {
        self.client.get("/products", session.credential()).await
    }

    /// `GET /sales`
    ///
    /// # Errors
    /// Returns the service's failure or a transport error.
    pub async fn sales(&self, session: &SessionContext) -> Result<Vec<SaleLine>> {
        self.client.get("/sales", session.credential()).await
    }

    /// Fetches both collections concurrently.
    ///
    /// # Errors
    /// Fails if either request fails; no partial snapshot is returned.
    pub async fn fetch(&self, session: &SessionContext) -> Result<Inventory> {
        let (products, sales) = tokio::try_join!(self.products(session), self.sales(session))?;
        tracing::debug!(
            products = products.len(),
            sales = sales.len(),
            "Inventory fetched"
        );
        Ok(Inventory { products, sales })
    }
}
