//! Core business logic - framework-agnostic stock, sale and reporting operations.
//!
//! Nothing here knows about HTTP; the API layer and the tests call these
//! functions directly.

/// Ledger reconciliation across intake, stock and sales
pub mod ledger;
/// Stock intake and stock-line lookups
pub mod product;
/// The sale transaction
pub mod sale;
/// Product-name filtering
pub mod search;
/// Stock, sales and profit/loss figures
pub mod summary;
