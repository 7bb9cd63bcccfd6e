//! Line item entity - a planned allocation inside one period.
//!
//! Expense and saving lines double as spending envelopes: transactions can be
//! allocated against them by id, and the reconciliation algorithm compares the
//! planned amount with the allocated spend so neither is counted twice.
//! `checked_at` marks a line as realized (confirmed to have occurred).

use super::kind::{EntryKind, Recurrence};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Line item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "line_items")]
pub struct Model {
    /// Unique identifier for the line item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the period this line belongs to
    pub period_id: i64,
    /// Human-readable name (e.g. "Rent", "Salary")
    pub name: String,
    /// Income, expense, or saving
    pub kind: EntryKind,
    /// Planned amount, non-negative
    pub amount: f64,
    /// Fixed (monthly) or one-off
    pub recurrence: Recurrence,
    /// True once the user edited the amount away from its template
    pub manually_adjusted: bool,
    /// Realization timestamp; None while the line is only planned
    pub checked_at: Option<DateTimeUtc>,
    /// Optional link to the template this line was instantiated from
    pub template_id: Option<i64>,
}

/// Defines relationships between LineItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line item belongs to one period
    #[sea_orm(
        belongs_to = "super::period::Entity",
        from = "Column::PeriodId",
        to = "super::period::Column::Id"
    )]
    Period,
    /// A line item may originate from a template. Deleting the template
    /// unlinks its lines instead of blocking the delete.
    #[sea_orm(
        belongs_to = "super::line_template::Entity",
        from = "Column::TemplateId",
        to = "super::line_template::Column::Id",
        on_delete = "SetNull"
    )]
    Template,
    /// One envelope line has many allocated transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::period::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Period.def()
    }
}

impl Related<super::line_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Template.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
