//! Period entity - one user's budget for one calendar month.
//!
//! `ending_balance` and `rollover_balance` start out NULL and are written
//! exclusively by the rollover propagator. `rollover_balance` is the
//! cumulative carry *leaving* the period (`rollover_in + ending_balance`),
//! never the local ending balance alone.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Period database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "periods")]
pub struct Model {
    /// Unique identifier for the period
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user reference
    pub user_id: String,
    /// Calendar month, 1-12
    pub month: i32,
    /// Calendar year
    pub year: i32,
    /// Period-local result (`total_income - total_expenses`); None until
    /// computed
    pub ending_balance: Option<f64>,
    /// Cumulative carry leaving this period; None until computed
    pub rollover_balance: Option<f64>,
}

/// Defines relationships between Period and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One period has many planned line items
    #[sea_orm(has_many = "super::line_item::Entity")]
    LineItems,
    /// One period has many actual transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
