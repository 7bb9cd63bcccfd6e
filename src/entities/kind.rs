//! Shared enums for line items and transactions.
//!
//! `EntryKind` drives every aggregate in the engine: income entries feed the
//! income total, while expense and saving entries both feed the expense total
//! (savings are deliberately treated as money leaving the period).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a planned line or an actual transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Money entering the period
    #[sea_orm(string_value = "income")]
    Income,
    /// Money leaving the period
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Money set aside; aggregates exactly like an expense
    #[sea_orm(string_value = "saving")]
    Saving,
}

impl EntryKind {
    /// True for the kinds that count toward total expenses (expense and
    /// saving alike).
    #[must_use]
    pub const fn is_outflow(self) -> bool {
        matches!(self, Self::Expense | Self::Saving)
    }
}

/// Whether a planned line repeats every month or applies once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    /// Recurs every month (rent, salary)
    #[sea_orm(string_value = "fixed")]
    Fixed,
    /// Applies to a single period only
    #[sea_orm(string_value = "one_off")]
    OneOff,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saving_counts_as_outflow() {
        assert!(EntryKind::Expense.is_outflow());
        assert!(EntryKind::Saving.is_outflow());
        assert!(!EntryKind::Income.is_outflow());
    }

    #[test]
    fn test_kind_stored_as_snake_case() {
        use sea_orm::ActiveEnum;
        assert_eq!(EntryKind::Saving.to_value(), "saving");
        assert_eq!(Recurrence::OneOff.to_value(), "one_off");
    }
}
