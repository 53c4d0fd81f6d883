//! Sale entity - An immutable record of stock leaving through a sale.
//!
//! Each sale points at the stock line it consumed through `product_id`; the
//! `name` column is a display snapshot only. `idempotency_key` holds the
//! canonical invoice so a retried request cannot be recorded twice.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sale database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the sale
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Date of sale
    pub date: Date,
    /// ID of the stock line this sale consumed
    pub product_id: i64,
    /// Product name at the time of sale
    #[serde(rename = "product")]
    pub name: String,
    /// Units sold, always positive
    pub quantity: i64,
    /// Unit sale price, independent of the stocked price
    pub price: f64,
    /// Customer name
    pub customer: String,
    /// Purchase-order reference
    pub po: String,
    /// Invoice reference as supplied
    pub invoice: String,
    /// Canonical invoice used for de-duplication, `None` when no invoice was given
    #[sea_orm(unique)]
    #[serde(default, skip_serializing)]
    pub idempotency_key: Option<String>,
    /// Name of the user who recorded the sale
    pub sold_by: String,
    /// When the sale was committed
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Sale and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each sale belongs to one stock line
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
