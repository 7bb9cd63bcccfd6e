//! Rollover propagation across the period chain.
//!
//! A mutation to a line item or transaction triggers [`RolloverPropagator::recompute_and_propagate`]
//! for the owning period: the incoming rollover is resolved from the previous
//! period's persisted `rollover_balance` (which already embeds all prior
//! history), the period's balances are recomputed and persisted - all within
//! one repository scope - and the cascade continues forward through every
//! stored successor so the chain stays consistent. The walk is an explicit loop over successive
//! (month, year) keys - a repository lookup returning None terminates it -
//! so the work is bounded by the number of stored periods.
//!
//! Failure policy: any lookup or computation failure during propagation is
//! caught at single-period granularity and that period's result is treated
//! as absent (logged at `warn`, never raised), so one unreachable period
//! neither fails the triggering mutation nor stops later periods from being
//! examined.

use crate::{
    core::metrics,
    entities::{EntryKind, Period},
    errors::Result,
    repo::{PeriodRepository, PeriodScope},
};
use sea_orm::{DatabaseConnection, EntityTrait};
use tracing::{debug, warn};

/// Virtual line representing the carry entering a period.
///
/// Never stored: synthesized from the previous period's `rollover_balance`
/// for display and aggregation. A non-negative carry reads as income, a
/// negative one as an expense of the absolute amount. It is not editable and
/// can never be an envelope target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RolloverLine {
    /// Absolute carried amount
    pub amount: f64,
    /// Income for a surplus, expense for a deficit
    pub kind: EntryKind,
    /// Always true; distinguishes the synthesized line in mixed displays
    pub is_rollover: bool,
}

impl RolloverLine {
    /// Synthesizes the virtual line for a carry balance.
    ///
    /// A balance of exactly zero carries nothing and produces no line.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn from_balance(balance: f64) -> Option<Self> {
        if balance == 0.0 {
            return None;
        }
        Some(Self {
            amount: balance.abs(),
            kind: if balance >= 0.0 {
                EntryKind::Income
            } else {
                EntryKind::Expense
            },
            is_rollover: true,
        })
    }
}

/// Convenience read returned by [`RolloverPropagator::available_to_spend`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvailableToSpend {
    /// Period-local result: `total_income - total_expenses`
    pub ending_balance: f64,
    /// Incoming rollover resolved from the previous period
    pub rollover: f64,
    /// Cumulative carry leaving the period: `rollover + ending_balance`
    pub rollover_balance: f64,
    /// `ending_balance + rollover` - what is still spendable overall
    pub available_to_spend: f64,
}

/// One period's freshly persisted balances.
#[derive(Debug, Clone, Copy)]
struct RecomputedPeriod {
    ending_balance: f64,
    rollover_in: f64,
    rollover_balance: f64,
}

/// Orchestrates balance recomputation over an injected [`PeriodRepository`].
#[derive(Debug, Clone)]
pub struct RolloverPropagator<R> {
    repo: R,
}

impl<R: PeriodRepository> RolloverPropagator<R> {
    /// Builds a propagator over the given repository.
    pub const fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Recomputes the balances of one period and cascades forward through
    /// every stored successor, earliest first.
    ///
    /// Returns the triggering period's virtual [`RolloverLine`], or `None`
    /// when the period has no stored record, carries exactly zero, or its
    /// recomputation failed (the error is logged, not raised).
    ///
    /// # Errors
    /// Only for malformed input (month outside 1-12); storage and
    /// computation failures never surface here.
    pub async fn recompute_and_propagate(
        &self,
        user_id: &str,
        month: i32,
        year: i32,
    ) -> Result<Option<RolloverLine>> {
        super::validate_month(month)?;

        let mut carried: Option<RolloverLine> = None;
        let (mut current_month, mut current_year) = (month, year);
        let mut is_triggering = true;

        loop {
            match self.recompute_period(user_id, current_month, current_year).await {
                Ok(Some(recomputed)) => {
                    debug!(
                        user_id,
                        month = current_month,
                        year = current_year,
                        ending_balance = recomputed.ending_balance,
                        rollover_balance = recomputed.rollover_balance,
                        "recomputed period balances"
                    );
                    if is_triggering {
                        carried = RolloverLine::from_balance(recomputed.rollover_balance);
                    }
                }
                Ok(None) => {
                    // No stored record: nothing to recompute. Only the
                    // triggering period can be missing; successors come from
                    // next_period lookups.
                    if is_triggering {
                        return Ok(None);
                    }
                }
                Err(error) => {
                    warn!(
                        user_id,
                        month = current_month,
                        year = current_year,
                        %error,
                        "period recomputation failed; treating its rollover as absent"
                    );
                }
            }
            is_triggering = false;

            let next = match self.repo.next_period(user_id, current_month, current_year).await {
                Ok(next) => next,
                Err(error) => {
                    warn!(user_id, %error, "next-period lookup failed; stopping cascade");
                    None
                }
            };
            match next {
                Some(period) => {
                    current_month = period.month;
                    current_year = period.year;
                }
                None => break,
            }
        }

        Ok(carried)
    }

    /// Convenience read: resolves the incoming rollover, recomputes and
    /// persists this period's balances, and reports what is still spendable,
    /// without cascading into later periods.
    ///
    /// Returns `None` gracefully when the period has no stored record or any
    /// step fails.
    pub async fn available_to_spend(
        &self,
        user_id: &str,
        month: i32,
        year: i32,
    ) -> Option<AvailableToSpend> {
        match self.recompute_period(user_id, month, year).await {
            Ok(Some(recomputed)) => Some(AvailableToSpend {
                ending_balance: recomputed.ending_balance,
                rollover: recomputed.rollover_in,
                rollover_balance: recomputed.rollover_balance,
                available_to_spend: recomputed.ending_balance + recomputed.rollover_in,
            }),
            Ok(None) => None,
            Err(error) => {
                warn!(user_id, month, year, %error, "available-to-spend read failed");
                None
            }
        }
    }

    /// The virtual rollover line entering a period, read from the previous
    /// period's persisted carry. For display; does not recompute anything.
    pub async fn incoming_rollover_line(
        &self,
        user_id: &str,
        month: i32,
        year: i32,
    ) -> Result<Option<RolloverLine>> {
        let scope = self.repo.begin().await?;
        let previous = scope.previous_period(user_id, month, year).await?;
        scope.commit().await?;
        Ok(previous
            .and_then(|p| p.rollover_balance)
            .and_then(RolloverLine::from_balance))
    }

    /// Steps 1-3 of the propagation algorithm for a single period: resolve
    /// the incoming rollover, compute the aggregate, persist. Everything runs
    /// inside one repository scope, so concurrent writers of the same period
    /// cannot interleave between the reads and the balance write.
    ///
    /// `ending_balance` is persisted as the period-local result
    /// (`total_income - total_expenses`); the cumulative carry is
    /// `rollover_in + ending_balance`, never reset to the local result alone.
    async fn recompute_period(
        &self,
        user_id: &str,
        month: i32,
        year: i32,
    ) -> Result<Option<RecomputedPeriod>> {
        let scope = self.repo.begin().await?;
        let Some(period) = scope.period(user_id, month, year).await? else {
            scope.commit().await?;
            return Ok(None);
        };

        let rollover_in = scope
            .previous_period(user_id, month, year)
            .await?
            .and_then(|previous| previous.rollover_balance)
            .unwrap_or(0.0);

        let lines = scope.line_items(period.id).await?;
        let transactions = scope.transactions(period.id).await?;
        let aggregate = metrics::all_metrics(&lines, &transactions, rollover_in);

        let ending_balance = aggregate.total_income - aggregate.total_expenses;
        let rollover_balance = rollover_in + ending_balance;
        scope
            .persist_balances(period.id, ending_balance, rollover_balance)
            .await?;
        scope.commit().await?;

        Ok(Some(RecomputedPeriod {
            ending_balance,
            rollover_in,
            rollover_balance,
        }))
    }
}

/// Fires the cascade for the period owning a mutated record.
///
/// Used by the mutation entry points after their own work committed; cascade
/// failures are logged and swallowed so the mutation's outcome is independent
/// of the recomputation.
pub(crate) async fn recompute_owning_period(db: &DatabaseConnection, period_id: i64) {
    let period = match Period::find_by_id(period_id).one(db).await {
        Ok(Some(period)) => period,
        Ok(None) => {
            warn!(period_id, "owning period vanished before recomputation");
            return;
        }
        Err(error) => {
            warn!(period_id, %error, "owning period lookup failed; skipping recomputation");
            return;
        }
    };

    let propagator =
        RolloverPropagator::new(crate::repo::SeaOrmPeriodRepository::new(db.clone()));
    if let Err(error) = propagator
        .recompute_and_propagate(&period.user_id, period.month, period.year)
        .await
    {
        warn!(period_id, %error, "balance recomputation failed after mutation");
    }
}
