//! The working view: one session, the current snapshot, and the two mutations.
//!
//! The snapshot is only ever replaced by a fresh fetch. A committed intake or
//! sale is always followed by a full re-fetch of both collections; a rejected
//! one leaves the snapshot untouched. When the re-fetch after a commit fails,
//! the commit still stands and the snapshot is flagged stale until the next
//! successful refresh.

use crate::{
    client::{
        StockClient,
        intake::{ProductForm, ProductIntake},
        query::{Inventory, InventoryQuery},
        sale::{SaleForm, SaleReceipt, SaleTransaction},
        session::SessionContext,
    },
    core::summary::ValueSummary,
    errors::Result,
    models::StockLine,
};

/// Stock and sales as seen by one signed-in user.
#[derive(Debug)]
pub struct Dashboard {
    session: SessionContext,
    query: InventoryQuery,
    intake: ProductIntake,
    sales: SaleTransaction,
    inventory: Inventory,
    stale: bool,
}

impl Dashboard {
    /// Opens the view and performs the initial fetch.
    ///
    /// # Errors
    /// Returns the fetch failure; no dashboard is created without a snapshot.
    pub async fn open(client: StockClient, session: SessionContext) -> Result<Self> {
        let query = InventoryQuery::new(client.clone());
        let inventory = query.fetch(&session).await?;

        Ok(Self {
            query,
            intake: ProductIntake::new(client.clone()),
            sales: SaleTransaction::new(client),
            session,
            inventory,
            stale: false,
        })
    }

    /// Re-fetches both collections and replaces the snapshot.
    ///
    /// # Errors
    /// Returns the fetch failure and marks the snapshot stale.
    pub async fn refresh(&mut self) -> Result<()> {
        match self.query.fetch(&self.session).await {
            Ok(inventory) => {
                self.inventory = inventory;
                self.stale = false;
                Ok(())
            }
            Err(e) => {
                self.stale = true;
                Err(e)
            }
        }
    }

    /// The current snapshot.
    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// The session every request is made with.
    #[must_use]
    pub const fn session(&self) -> &SessionContext {
        &self.session
    }

    /// True when a refresh failed and the snapshot may lag the service.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// Summary figures of the current snapshot.
    #[must_use]
    pub fn summary(&self) -> ValueSummary {
        self.inventory.summary()
    }

    /// Adds a stock line, then re-fetches.
    ///
    /// # Errors
    /// Returns the intake failure; the snapshot is unchanged in that case.
    pub async fn stock_in(&mut self, form: &ProductForm) -> Result<StockLine> {
        let created = self.intake.submit(&self.session, form).await?;
        self.refresh_after_commit().await;
        Ok(created)
    }

    /// Records a sale, then re-fetches.
    ///
    /// # Errors
    /// Returns the sale failure; the snapshot is unchanged in that case.
    pub async fn stock_out(&mut self, form: &SaleForm) -> Result<SaleReceipt> {
        let receipt = self.sales.submit(&self.session, form).await?;
        self.refresh_after_commit().await;
        Ok(receipt)
    }

    /// Ends the session (logout).
    pub fn close(self) {
        self.session.end();
    }

    async fn refresh_after_commit(&mut self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!("Committed, but refresh failed: {}", e);
        }
    }
}
