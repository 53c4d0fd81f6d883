//! Product-name filtering for stock and sales views.
//!
//! Filtering is pure and local: it never contacts the store and never changes
//! the collection it reads.

use crate::{
    entities::{product, sale},
    models::{SaleLine, StockLine},
};

/// Anything listed under a product name.
pub trait Named {
    /// The product name to match against
    fn product_name(&self) -> &str;
}

impl Named for product::Model {
    fn product_name(&self) -> &str {
        &self.name
    }
}

impl Named for sale::Model {
    fn product_name(&self) -> &str {
        &self.name
    }
}

impl Named for StockLine {
    fn product_name(&self) -> &str {
        &self.product
    }
}

impl Named for SaleLine {
    fn product_name(&self) -> &str {
        &self.product
    }
}

/// Case-insensitive substring match. An empty needle matches everything.
#[must_use]
pub fn name_matches(name: &str, needle: &str) -> bool {
    needle.is_empty() || name.to_lowercase().contains(&needle.to_lowercase())
}

/// Lazily yields the items whose name contains `needle`.
///
/// The iterator is `Clone`, so a view can be walked again without refetching.
pub fn filter_by_name<'a, T: Named>(
    items: &'a [T],
    needle: &'a str,
) -> impl Iterator<Item = &'a T> + Clone + 'a {
    items
        .iter()
        .filter(move |item| name_matches(item.product_name(), needle))
}
