//! Line template entity - a reusable planned line owned by a user.
//!
//! Templates seed new periods during onboarding and back the
//! "reset line from template" operation.

use super::kind::{EntryKind, Recurrence};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Line template database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "line_templates")]
pub struct Model {
    /// Unique identifier for the template
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user reference
    pub user_id: String,
    /// Human-readable name
    pub name: String,
    /// Income, expense, or saving
    pub kind: EntryKind,
    /// Default planned amount, non-negative
    pub amount: f64,
    /// Fixed (monthly) or one-off
    pub recurrence: Recurrence,
}

/// Defines relationships between LineTemplate and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One template can back many instantiated line items
    #[sea_orm(has_many = "super::line_item::Entity")]
    LineItems,
}

impl Related<super::line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
