//! Recording sales ("stock out").
//!
//! The client sends one request naming the stock line and the number of units
//! to sell. It never sends a remaining quantity and never issues a separate
//! stock update: the service validates, decrements and records in one
//! transaction, so any failure response means nothing was committed.
//!
//! Retrying after a timeout is safe when the form carries an invoice: the
//! service recognises the repeat and answers with the original sale.

use crate::{
    client::{
        StockClient,
        intake::{parse_date, parse_integer, parse_price},
        session::SessionContext,
    },
    core::sale::validate_sale,
    errors::Result,
    models::{SaleLine, SellRequest, StockLine},
};

/// Raw sale input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleForm {
    /// `YYYY-MM-DD`, blank for today
    pub date: String,
    /// Stock line picked from the current view, if any
    pub product_id: Option<i64>,
    /// Product name
    pub product: String,
    /// Units to sell
    pub quantity: String,
    /// Unit sale price
    pub price: String,
    /// Customer name
    pub customer: String,
    /// Purchase-order reference
    pub po: String,
    /// Invoice reference
    pub invoice: String,
    /// Units shown as available when the line was picked; display only
    pub available: Option<i64>,
}

impl SaleForm {
    /// Picks a stock line: fills in its id and name, and its stocked price as
    /// the default sale price.
    pub fn select(&mut self, line: &StockLine) {
        self.product_id = line.id;
        self.product.clone_from(&line.product);
        self.available = line.quantity;
        if let Some(price) = line.price {
            self.price = price.to_string();
        }
    }

    /// Parses and validates the form into a request.
    ///
    /// # Errors
    /// Returns [`crate::errors::Error::Validation`] for an empty product,
    /// a non-numeric or non-positive quantity, a non-numeric or negative
    /// price, or a malformed date.
    pub fn validate(&self) -> Result<SellRequest> {
        let request = SellRequest {
            date: parse_date(&self.date)?,
            product_id: self.product_id,
            product: self.product.trim().to_string(),
            quantity: parse_integer("Quantity", &self.quantity)?,
            price: parse_price(&self.price)?,
            customer: self.customer.trim().to_string(),
            po: self.po.trim().to_string(),
            invoice: self.invoice.trim().to_string(),
        };
        validate_sale(&request)?;
        Ok(request)
    }
}

/// What the service answered to a sale.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleReceipt {
    /// The committed sale
    pub sale: SaleLine,
    /// True when this was a repeat of an already committed request
    pub replayed: bool,
}

/// Submits sales.
#[derive(Debug, Clone)]
pub struct SaleTransaction {
    client: StockClient,
}

impl SaleTransaction {
    /// Sale submission over the given transport.
    #[must_use]
    pub const fn new(client: StockClient) -> Self {
        Self { client }
    }

    /// Validates and submits a form.
    ///
    /// # Errors
    /// Returns `Validation` before any request, or the service's
    /// `ProductNotFound`, `AmbiguousProduct`, `InsufficientStock`,
    /// `DuplicateInvoice`, or a transport error.
    pub async fn submit(&self, session: &SessionContext, form: &SaleForm) -> Result<SaleReceipt> {
        let request = form.validate()?;
        self.submit_request(session, &request).await
    }

    /// Submits an already built request.
    ///
    /// # Errors
    /// As [`SaleTransaction::submit`], plus `Validation` from the service.
    pub async fn submit_request(
        &self,
        session: &SessionContext,
        request: &SellRequest,
    ) -> Result<SaleReceipt> {
        let (status, sale): (u16, SaleLine) = self
            .client
            .post("/sales/sell", session.credential(), request)
            .await?;

        let replayed = status == 200;
        tracing::info!(
            product = %sale.product,
            quantity = ?sale.quantity,
            replayed,
            "Sale recorded"
        );
        Ok(SaleReceipt { sale, replayed })
    }
}
