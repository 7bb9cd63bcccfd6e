//! Envelope reconciliation - expense totals without double-counting.
//!
//! Every expense or saving line is a budget envelope. Transactions allocated
//! to an envelope are summed and compared against the planned amount: the
//! envelope contributes `max(planned, consumed)`, so the plan acts as a floor
//! and only the overage counts beyond it. Free transactions (no allocation)
//! contribute their full amount directly.

use crate::entities::{line_item, transaction};
use std::collections::{HashMap, HashSet};

/// Computes the envelope-aware expense total for one period.
///
/// Algorithm, over records with expense or saving kind:
/// 1. group allocated transactions by envelope line id and sum them,
/// 2. every envelope line contributes `max(planned, consumed)`,
/// 3. free transactions are added in full.
///
/// A transaction whose envelope reference does not match any qualifying line
/// (deleted line, income line, or the synthesized rollover line, which is
/// never a stored line item) is treated as free. Multiple transactions
/// against one envelope are summed before the max comparison, not compared
/// individually.
#[must_use]
pub fn reconciled_expenses(
    lines: &[line_item::Model],
    transactions: &[transaction::Model],
) -> f64 {
    let envelope_ids: HashSet<i64> = lines
        .iter()
        .filter(|line| line.kind.is_outflow())
        .map(|line| line.id)
        .collect();

    let mut consumed: HashMap<i64, f64> = HashMap::new();
    let mut free = 0.0;
    for tx in transactions.iter().filter(|tx| tx.kind.is_outflow()) {
        match tx.envelope_line_id.filter(|id| envelope_ids.contains(id)) {
            Some(envelope_id) => *consumed.entry(envelope_id).or_insert(0.0) += tx.amount,
            None => free += tx.amount,
        }
    }

    let envelopes: f64 = lines
        .iter()
        .filter(|line| line.kind.is_outflow())
        .map(|line| {
            let spent = consumed.get(&line.id).copied().unwrap_or(0.0);
            line.amount.max(spent)
        })
        .sum();

    envelopes + free
}
