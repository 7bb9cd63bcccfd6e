//! Pure per-period metric calculations.
//!
//! All functions here are side-effect free: they take immutable slices of
//! line items and transactions and return plain numbers. Amounts on records
//! are non-negative; direction comes from [`EntryKind`], and saving entries
//! aggregate exactly like expenses. The incoming rollover may be negative.

use crate::core::reconcile;
use crate::entities::{line_item, transaction};

/// Authoritative aggregate for one period, used for persistence and display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodMetrics {
    /// Sum of income lines and income transactions
    pub total_income: f64,
    /// Envelope-aware expense total (see [`reconcile::reconciled_expenses`])
    pub total_expenses: f64,
    /// `total_income + rollover`
    pub available: f64,
    /// `available - total_expenses`; becomes the next period's input
    pub ending_balance: f64,
    /// Period-local view of the same value as `ending_balance`
    pub remaining: f64,
    /// The incoming rollover this aggregate was computed with
    pub rollover: f64,
}

/// Sum of amounts with income kind, across planned lines and actual
/// transactions.
#[must_use]
pub fn total_income(lines: &[line_item::Model], transactions: &[transaction::Model]) -> f64 {
    let from_lines: f64 = lines
        .iter()
        .filter(|line| !line.kind.is_outflow())
        .map(|line| line.amount)
        .sum();
    let from_transactions: f64 = transactions
        .iter()
        .filter(|tx| !tx.kind.is_outflow())
        .map(|tx| tx.amount)
        .sum();
    from_lines + from_transactions
}

/// Naive sum of amounts with expense or saving kind, across both collections.
///
/// Counts an envelope line *and* its allocated transactions in full, so it is
/// only suitable where envelope semantics are irrelevant (historical/legacy
/// display). Authoritative totals go through [`all_metrics`], which uses
/// [`reconcile::reconciled_expenses`] instead.
#[must_use]
pub fn total_expenses(lines: &[line_item::Model], transactions: &[transaction::Model]) -> f64 {
    let from_lines: f64 = lines
        .iter()
        .filter(|line| line.kind.is_outflow())
        .map(|line| line.amount)
        .sum();
    let from_transactions: f64 = transactions
        .iter()
        .filter(|tx| tx.kind.is_outflow())
        .map(|tx| tx.amount)
        .sum();
    from_lines + from_transactions
}

/// What the period has to work with: income plus the incoming rollover
/// (which may be negative).
#[must_use]
pub fn available(total_income: f64, rollover_in: f64) -> f64 {
    total_income + rollover_in
}

/// The value that becomes the next period's input. May be negative:
/// overspending is recorded, not rejected.
#[must_use]
pub fn ending_balance(available: f64, total_expenses: f64) -> f64 {
    available - total_expenses
}

/// Identical to [`ending_balance`], kept as a distinct name because
/// "remaining" is the period-local view while "ending balance" is the value
/// that chains into the next period. Callers must not conflate them when
/// chaining.
#[must_use]
pub fn remaining(available: f64, total_expenses: f64) -> f64 {
    ending_balance(available, total_expenses)
}

/// Same as [`total_income`], restricted to records with a realization
/// timestamp.
#[must_use]
pub fn realized_income(lines: &[line_item::Model], transactions: &[transaction::Model]) -> f64 {
    let from_lines: f64 = lines
        .iter()
        .filter(|line| !line.kind.is_outflow() && line.checked_at.is_some())
        .map(|line| line.amount)
        .sum();
    let from_transactions: f64 = transactions
        .iter()
        .filter(|tx| !tx.kind.is_outflow() && tx.checked_at.is_some())
        .map(|tx| tx.amount)
        .sum();
    from_lines + from_transactions
}

/// Same as [`total_expenses`], restricted to records with a realization
/// timestamp.
#[must_use]
pub fn realized_expenses(lines: &[line_item::Model], transactions: &[transaction::Model]) -> f64 {
    let from_lines: f64 = lines
        .iter()
        .filter(|line| line.kind.is_outflow() && line.checked_at.is_some())
        .map(|line| line.amount)
        .sum();
    let from_transactions: f64 = transactions
        .iter()
        .filter(|tx| tx.kind.is_outflow() && tx.checked_at.is_some())
        .map(|tx| tx.amount)
        .sum();
    from_lines + from_transactions
}

/// `realized_income - realized_expenses`: the confirmed position of the
/// period so far.
#[must_use]
pub fn realized_balance(lines: &[line_item::Model], transactions: &[transaction::Model]) -> f64 {
    realized_income(lines, transactions) - realized_expenses(lines, transactions)
}

/// Computes the full authoritative aggregate for one period.
///
/// The expense total here uses the envelope-aware reconciliation, never the
/// naive sum: a planned line and the transactions allocated against it
/// contribute `max(planned, consumed)` once, not both.
#[must_use]
pub fn all_metrics(
    lines: &[line_item::Model],
    transactions: &[transaction::Model],
    rollover_in: f64,
) -> PeriodMetrics {
    let income = total_income(lines, transactions);
    let expenses = reconcile::reconciled_expenses(lines, transactions);
    let available = available(income, rollover_in);
    let ending = ending_balance(available, expenses);

    PeriodMetrics {
        total_income: income,
        total_expenses: expenses,
        available,
        ending_balance: ending,
        remaining: ending,
        rollover: rollover_in,
    }
}

/// Sanity check over a computed aggregate, used in tests and diagnostics
/// only - it never blocks persistence.
///
/// The identities are checked with strict equality on purpose: coherence is
/// defined over the exact values the calculator produced, not over values
/// within a tolerance.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn validate_coherence(metrics: &PeriodMetrics) -> bool {
    metrics.total_income >= 0.0
        && metrics.total_expenses >= 0.0
        && metrics.available == metrics.total_income + metrics.rollover
        && metrics.ending_balance == metrics.available - metrics.total_expenses
        && metrics.remaining == metrics.ending_balance
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::EntryKind;
    use crate::test_utils::{line_model, transaction_model};

    #[test]
    fn test_surplus_period() {
        // Income 5000, expense 4500, no rollover
        let lines = vec![
            line_model(1, EntryKind::Income, 5000.0),
            line_model(2, EntryKind::Expense, 4500.0),
        ];

        let metrics = all_metrics(&lines, &[], 0.0);
        assert_eq!(metrics.total_income, 5000.0);
        assert_eq!(metrics.available, 5000.0);
        assert_eq!(metrics.ending_balance, 500.0);
        assert_eq!(metrics.remaining, 500.0);
        assert!(validate_coherence(&metrics));
    }

    #[test]
    fn test_positive_rollover_feeds_available() {
        // Income 5200, expense 4800, rollover in 500
        let lines = vec![
            line_model(1, EntryKind::Income, 5200.0),
            line_model(2, EntryKind::Expense, 4800.0),
        ];

        let metrics = all_metrics(&lines, &[], 500.0);
        assert_eq!(metrics.available, 5700.0);
        assert_eq!(metrics.ending_balance, 900.0);
        assert!(validate_coherence(&metrics));
    }

    #[test]
    fn test_overspend_absorbed_by_accumulated_surplus() {
        // Income 5100, expense 5200, rollover in 900: the local deficit is
        // absorbed, not rejected
        let lines = vec![
            line_model(1, EntryKind::Income, 5100.0),
            line_model(2, EntryKind::Expense, 5200.0),
        ];

        let metrics = all_metrics(&lines, &[], 900.0);
        assert_eq!(metrics.available, 6000.0);
        assert_eq!(metrics.ending_balance, 800.0);
        assert!(validate_coherence(&metrics));
    }

    #[test]
    fn test_negative_rollover_allowed() {
        let lines = vec![
            line_model(1, EntryKind::Income, 1000.0),
            line_model(2, EntryKind::Expense, 1000.0),
        ];

        let metrics = all_metrics(&lines, &[], -250.0);
        assert_eq!(metrics.available, 750.0);
        assert_eq!(metrics.ending_balance, -250.0);
        assert!(validate_coherence(&metrics));
    }

    #[test]
    fn test_saving_counts_as_expense() {
        let lines = vec![
            line_model(1, EntryKind::Income, 3000.0),
            line_model(2, EntryKind::Expense, 1000.0),
            line_model(3, EntryKind::Saving, 500.0),
        ];

        assert_eq!(total_expenses(&lines, &[]), 1500.0);
        let metrics = all_metrics(&lines, &[], 0.0);
        assert_eq!(metrics.total_expenses, 1500.0);
        assert_eq!(metrics.ending_balance, 1500.0);
    }

    #[test]
    fn test_totals_cover_both_collections() {
        let lines = vec![line_model(1, EntryKind::Income, 2000.0)];
        let transactions = vec![
            transaction_model(1, EntryKind::Income, 150.0, None),
            transaction_model(2, EntryKind::Expense, 40.0, None),
        ];

        assert_eq!(total_income(&lines, &transactions), 2150.0);
        assert_eq!(total_expenses(&lines, &transactions), 40.0);
    }

    #[test]
    fn test_naive_total_double_counts_envelopes() {
        // The naive sum counts the envelope line and its allocated
        // transaction both; all_metrics does not
        let lines = vec![line_model(1, EntryKind::Expense, 500.0)];
        let transactions = vec![transaction_model(1, EntryKind::Expense, 100.0, Some(1))];

        assert_eq!(total_expenses(&lines, &transactions), 600.0);
        assert_eq!(all_metrics(&lines, &transactions, 0.0).total_expenses, 500.0);
    }

    #[test]
    fn test_realized_metrics_ignore_unchecked_records() {
        let now = chrono::Utc::now();
        let mut checked_income = line_model(1, EntryKind::Income, 2000.0);
        checked_income.checked_at = Some(now);
        let planned_income = line_model(2, EntryKind::Income, 500.0);
        let mut checked_expense = line_model(3, EntryKind::Expense, 300.0);
        checked_expense.checked_at = Some(now);

        let lines = vec![checked_income, planned_income, checked_expense];
        let mut checked_tx = transaction_model(1, EntryKind::Expense, 50.0, None);
        checked_tx.checked_at = Some(now);
        let planned_tx = transaction_model(2, EntryKind::Expense, 75.0, None);
        let transactions = vec![checked_tx, planned_tx];

        assert_eq!(realized_income(&lines, &transactions), 2000.0);
        assert_eq!(realized_expenses(&lines, &transactions), 350.0);
        assert_eq!(realized_balance(&lines, &transactions), 1650.0);
    }

    #[test]
    fn test_empty_period_is_coherent() {
        let metrics = all_metrics(&[], &[], 0.0);
        assert_eq!(metrics.total_income, 0.0);
        assert_eq!(metrics.total_expenses, 0.0);
        assert_eq!(metrics.ending_balance, 0.0);
        assert!(validate_coherence(&metrics));
    }

    #[test]
    fn test_validate_coherence_rejects_broken_aggregates() {
        let mut metrics = all_metrics(&[], &[], 0.0);
        metrics.available = 1.0;
        assert!(!validate_coherence(&metrics));

        let mut metrics = all_metrics(&[], &[], 0.0);
        metrics.total_income = -5.0;
        metrics.available = -5.0;
        assert!(!validate_coherence(&metrics));

        let mut metrics = all_metrics(&[], &[], 0.0);
        metrics.remaining = 3.0;
        assert!(!validate_coherence(&metrics));
    }
}
