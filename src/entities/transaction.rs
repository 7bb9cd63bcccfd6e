//! Transaction entity - an actual money movement inside one period.
//!
//! `envelope_line_id` optionally allocates the transaction to a planned line
//! acting as its envelope. None means the transaction is "free" and counts
//! toward the period total with its full amount. The reference is a plain
//! back-reference by id, never exclusive ownership: a dangling id is treated
//! as free at reconciliation time.

use super::kind::EntryKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the period this transaction belongs to
    pub period_id: i64,
    /// Envelope allocation; None for a free transaction
    pub envelope_line_id: Option<i64>,
    /// Human-readable name (e.g. "Groceries 04/12")
    pub name: String,
    /// Income, expense, or saving
    pub kind: EntryKind,
    /// Transaction amount, non-negative
    pub amount: f64,
    /// Realization timestamp; None while the transaction is only planned
    pub checked_at: Option<DateTimeUtc>,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one period
    #[sea_orm(
        belongs_to = "super::period::Entity",
        from = "Column::PeriodId",
        to = "super::period::Column::Id"
    )]
    Period,
    /// A transaction may be allocated to one envelope line. Deleting the
    /// line frees its transactions instead of blocking the delete.
    #[sea_orm(
        belongs_to = "super::line_item::Entity",
        from = "Column::EnvelopeLineId",
        to = "super::line_item::Column::Id",
        on_delete = "SetNull"
    )]
    EnvelopeLine,
}

impl Related<super::period::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Period.def()
    }
}

impl Related<super::line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EnvelopeLine.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
