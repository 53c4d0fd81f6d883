//! Stock and sales valuation.
//!
//! Figures are computed from whatever collections the caller holds, so they
//! are always as fresh as the last fetch. A missing or unreadable price or
//! quantity counts as zero: the summary is informational and should render
//! even when a record is damaged.

use crate::{
    entities::{product, sale},
    models::{SaleLine, StockLine},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Anything that carries a unit price and a unit count.
pub trait Priced {
    /// Unit price, `None` when unknown
    fn unit_price(&self) -> Option<f64>;
    /// Unit count, `None` when unknown
    fn units(&self) -> Option<i64>;

    /// `price × quantity`, unknown or non-finite parts taken as zero.
    #[allow(clippy::cast_precision_loss)]
    fn line_value(&self) -> f64 {
        let price = self.unit_price().filter(|p| p.is_finite()).unwrap_or(0.0);
        let units = self.units().unwrap_or(0) as f64;
        price * units
    }
}

impl Priced for product::Model {
    fn unit_price(&self) -> Option<f64> {
        Some(self.price)
    }

    fn units(&self) -> Option<i64> {
        Some(self.quantity)
    }
}

impl Priced for sale::Model {
    fn unit_price(&self) -> Option<f64> {
        Some(self.price)
    }

    fn units(&self) -> Option<i64> {
        Some(self.quantity)
    }
}

impl Priced for StockLine {
    fn unit_price(&self) -> Option<f64> {
        self.price
    }

    fn units(&self) -> Option<i64> {
        self.quantity
    }
}

impl Priced for SaleLine {
    fn unit_price(&self) -> Option<f64> {
        self.price
    }

    fn units(&self) -> Option<i64> {
        self.quantity
    }
}

/// The three headline figures.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueSummary {
    /// Value of stock still on hand
    pub stock_value: f64,
    /// Value of everything sold
    pub sold_value: f64,
    /// `sold_value - stock_value`
    pub profit_loss: f64,
}

impl fmt::Display for ValueSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stock {:.2} | sold {:.2} | profit/loss {:.2}",
            self.stock_value, self.sold_value, self.profit_loss
        )
    }
}

/// Rounds to cents.
#[must_use]
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sum of line values, rounded to cents.
pub fn total_value<'a, T, I>(lines: I) -> f64
where
    T: Priced + 'a,
    I: IntoIterator<Item = &'a T>,
{
    round_cents(lines.into_iter().map(Priced::line_value).sum())
}

/// Values the available stock and the sold stock.
///
/// Profit/loss is taken from the already rounded totals.
pub fn summarize<'a, S, L, IS, IL>(stock: IS, sold: IL) -> ValueSummary
where
    S: Priced + 'a,
    L: Priced + 'a,
    IS: IntoIterator<Item = &'a S>,
    IL: IntoIterator<Item = &'a L>,
{
    let stock_value = total_value(stock);
    let sold_value = total_value(sold);
    ValueSummary {
        stock_value,
        sold_value,
        profit_loss: round_cents(sold_value - stock_value),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    fn stock(price: Option<f64>, quantity: Option<i64>) -> StockLine {
        StockLine {
            price,
            quantity,
            ..StockLine::default()
        }
    }

    fn sold(price: Option<f64>, quantity: Option<i64>) -> SaleLine {
        SaleLine {
            price,
            quantity,
            ..SaleLine::default()
        }
    }

    #[test]
    fn test_summary_figures() {
        let summary = summarize(&[stock(Some(10.0), Some(5))], &[sold(Some(12.0), Some(2))]);

        assert_eq!(summary.stock_value, 50.0);
        assert_eq!(summary.sold_value, 24.0);
        assert_eq!(summary.profit_loss, -26.0);
        assert_eq!(
            summary.to_string(),
            "stock 50.00 | sold 24.00 | profit/loss -26.00"
        );
    }

    #[test]
    fn test_missing_values_count_as_zero() {
        let summary = summarize(
            &[
                stock(None, Some(5)),
                stock(Some(2.5), None),
                stock(Some(f64::NAN), Some(3)),
                stock(Some(1.25), Some(4)),
            ],
            &[sold(None, None)],
        );

        assert_eq!(summary.stock_value, 5.0);
        assert_eq!(summary.sold_value, 0.0);
        assert_eq!(summary.profit_loss, -5.0);
    }

    #[test]
    fn test_empty_collections() {
        let no_stock: Vec<StockLine> = Vec::new();
        let no_sales: Vec<SaleLine> = Vec::new();
        let summary = summarize(&no_stock, &no_sales);
        assert_eq!(summary, ValueSummary::default());
    }

    #[test]
    fn test_rounding_to_cents() {
        let summary = summarize(
            &[stock(Some(0.1), Some(3))],
            &[sold(Some(0.333), Some(3))],
        );

        assert_eq!(summary.stock_value, 0.3);
        assert_eq!(summary.sold_value, 1.0);
        assert_eq!(summary.profit_loss, 0.7);
    }
}
