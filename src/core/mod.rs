//! Core business logic - framework-agnostic budgeting operations.
//!
//! `metrics` and `reconcile` are pure arithmetic over line items and
//! transactions; `rollover` threads the cumulative carry through the period
//! chain; `period`, `line_item` and `transaction` are the mutation entry
//! points that trigger recomputation for the owning period.

/// Planned line item operations (create, adjust, realize, reset from template)
pub mod line_item;
/// Pure per-period metric calculations
pub mod metrics;
/// Period lifecycle and read-side overview
pub mod period;
/// Envelope reconciliation - expense totals without double-counting
pub mod reconcile;
/// Rollover propagation across the period chain
pub mod rollover;
/// Actual transaction operations (create, allocate, realize, delete)
pub mod transaction;

use crate::errors::{Error, Result};

/// Amounts are magnitudes: non-negative and finite. Direction comes from
/// the entry kind.
pub(crate) fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

/// Calendar months are numbered 1-12.
pub(crate) fn validate_month(month: i32) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(Error::Validation {
            message: format!("month must be between 1 and 12, got {month}"),
        })
    }
}
