//! Ledger reconciliation.
//!
//! For every product name the units received at intake must equal the units
//! still available plus the units sold. The balances are derived from the two
//! tables on demand; nothing here is stored.

use crate::{
    core::{product::get_all_products, sale::get_all_sales},
    entities::{product, sale},
    errors::Result,
};
use sea_orm::ConnectionTrait;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Unit counts for one product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerBalance {
    /// Product name
    pub product: String,
    /// Units received over all intakes
    pub received: i64,
    /// Units still on hand
    pub available: i64,
    /// Units sold over all sales
    pub sold: i64,
    /// Whether `available + sold == received`
    pub balanced: bool,
}

impl LedgerBalance {
    fn new(product: String) -> Self {
        Self {
            product,
            received: 0,
            available: 0,
            sold: 0,
            balanced: true,
        }
    }
}

/// Computes per-name balances from already loaded collections.
///
/// Sales are attributed to a name through the line they consumed. A sale that
/// points at an unknown line is grouped under its own recorded name and leaves
/// that group unbalanced.
#[must_use]
pub fn compute_balances(products: &[product::Model], sales: &[sale::Model]) -> Vec<LedgerBalance> {
    let mut balances: BTreeMap<String, LedgerBalance> = BTreeMap::new();
    let mut line_names: HashMap<i64, &str> = HashMap::with_capacity(products.len());

    for line in products {
        line_names.insert(line.id, line.name.as_str());
        let entry = balances
            .entry(line.name.clone())
            .or_insert_with(|| LedgerBalance::new(line.name.clone()));
        entry.received += line.received_quantity;
        entry.available += line.quantity;
    }

    for record in sales {
        let name = line_names
            .get(&record.product_id)
            .map_or_else(|| record.name.clone(), |n| (*n).to_string());
        let entry = balances
            .entry(name.clone())
            .or_insert_with(|| LedgerBalance::new(name));
        entry.sold += record.quantity;
    }

    balances
        .into_values()
        .map(|mut balance| {
            balance.balanced = balance.available + balance.sold == balance.received;
            balance
        })
        .collect()
}

/// Loads both tables and reconciles them.
///
/// # Errors
/// Returns an error if either query fails.
pub async fn reconcile<C>(db: &C) -> Result<Vec<LedgerBalance>>
where
    C: ConnectionTrait,
{
    let products = get_all_products(db).await?;
    let sales = get_all_sales(db).await?;
    let balances = compute_balances(&products, &sales);

    for balance in balances.iter().filter(|b| !b.balanced) {
        tracing::warn!(
            product = %balance.product,
            received = balance.received,
            available = balance.available,
            sold = balance.sold,
            "Ledger out of balance"
        );
    }

    Ok(balances)
}
