//! Product entity - One line of available stock.
//!
//! A line is created by stock intake and afterwards only its `quantity` changes,
//! as a side effect of a committed sale. `received_quantity` keeps the intake
//! amount so the ledger can be reconciled.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the stock line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Date the stock was received
    pub date: Date,
    /// Proforma reference, free text
    pub proforma: String,
    /// Product name (e.g., "Widget A")
    #[serde(rename = "product")]
    pub name: String,
    /// Units not yet sold, never negative
    pub quantity: i64,
    /// Units received at intake
    pub received_quantity: i64,
    /// Stocked unit price
    pub price: f64,
    /// Original equipment manufacturer, free text
    pub oem: String,
    /// Advisory reorder threshold
    pub reorder: i64,
    /// Name of the user who recorded the intake
    pub added_by: String,
    /// When the line was recorded
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Whether the remaining quantity has dropped below the reorder threshold.
    #[must_use]
    pub const fn needs_reorder(&self) -> bool {
        self.quantity < self.reorder
    }
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One stock line has many sales
    #[sea_orm(has_many = "super::sale::Entity")]
    Sales,
}

impl Related<super::sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
