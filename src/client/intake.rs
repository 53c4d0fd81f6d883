//! Stock intake ("stock in").
//!
//! [`ProductForm`] holds fields exactly as typed. Parsing and validation happen
//! before any request is made, so malformed input never reaches the service.

use crate::{
    client::{StockClient, session::SessionContext},
    core::product::validate_new_product,
    errors::{Error, Result},
    models::{NewProductRequest, StockLine},
};
use chrono::NaiveDate;

/// Raw intake input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    /// `YYYY-MM-DD`, blank for today
    pub date: String,
    /// Proforma reference
    pub proforma: String,
    /// Product name
    pub product: String,
    /// Units received
    pub quantity: String,
    /// Unit price
    pub price: String,
    /// Manufacturer
    pub oem: String,
    /// Reorder threshold, blank for none
    pub reorder: String,
}

pub(crate) fn parse_date(raw: &str) -> Result<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| Error::validation(format!("Date '{raw}' is not YYYY-MM-DD: {e}")))
}

pub(crate) fn parse_integer(field: &str, raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| Error::validation(format!("{field} must be a whole number, got '{raw}'")))
}

pub(crate) fn parse_price(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| Error::validation(format!("Price must be a number, got '{raw}'")))
}

impl ProductForm {
    /// Parses and validates the form into a request.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] for an empty name, non-numeric or negative
    /// quantity, price or reorder level, or a malformed date.
    pub fn validate(&self) -> Result<NewProductRequest> {
        let reorder = if self.reorder.trim().is_empty() {
            0
        } else {
            parse_integer("Reorder level", &self.reorder)?
        };

        let request = NewProductRequest {
            date: parse_date(&self.date)?,
            proforma: self.proforma.trim().to_string(),
            product: self.product.trim().to_string(),
            quantity: parse_integer("Quantity", &self.quantity)?,
            price: parse_price(&self.price)?,
            oem: self.oem.trim().to_string(),
            reorder,
        };
        validate_new_product(&request)?;
        Ok(request)
    }
}

/// Records new stock lines.
#[derive(Debug, Clone)]
pub struct ProductIntake {
    client: StockClient,
}

impl ProductIntake {
    /// Intake over the given transport.
    #[must_use]
    pub const fn new(client: StockClient) -> Self {
        Self { client }
    }

    /// Validates and submits a form.
    ///
    /// Non-admin sessions are refused locally; the service enforces the same rule.
    ///
    /// # Errors
    /// Returns [`Error::Forbidden`], [`Error::Validation`], the service's
    /// failure, or a transport error.
    pub async fn submit(&self, session: &SessionContext, form: &ProductForm) -> Result<StockLine> {
        if !session.is_admin() {
            return Err(Error::Forbidden {
                action: "add stock".to_string(),
            });
        }
        let request = form.validate()?;
        self.submit_request(session, &request).await
    }

    /// Submits an already validated request.
    ///
    /// # Errors
    /// Returns the service's failure or a transport error.
    pub async fn submit_request(
        &self,
        session: &SessionContext,
        request: &NewProductRequest,
    ) -> Result<StockLine> {
        let (_, created) = self
            .client
            .post("/products", session.credential(), request)
            .await?;
        Ok(created)
    }
}
