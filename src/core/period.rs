//! Period lifecycle and the read-side overview.
//!
//! A period is one user's budgeting month, keyed by (user, month, year).
//! Creation recomputes the chain immediately so a freshly opened month picks
//! up the carry of its predecessor; the overview bundles everything a caller
//! needs to render a month in one read.

use crate::{
    core::{
        metrics::{self, PeriodMetrics},
        rollover::{RolloverLine, RolloverPropagator, recompute_owning_period},
    },
    entities::{LineItem, Period, Transaction, line_item, period, transaction},
    errors::{Error, Result},
    repo::SeaOrmPeriodRepository,
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Everything needed to render one budgeting month.
#[derive(Debug, Clone)]
pub struct PeriodOverview {
    /// The stored period record with its persisted balances
    pub period: period::Model,
    /// Virtual carry line entering the month, if any
    pub incoming_rollover: Option<RolloverLine>,
    /// Planned line items, oldest first
    pub lines: Vec<line_item::Model>,
    /// Actual transactions, oldest first
    pub transactions: Vec<transaction::Model>,
    /// Aggregate metrics including the incoming rollover
    pub metrics: PeriodMetrics,
}

/// Looks up one user's period by its (month, year) key.
pub async fn get_period(
    db: &DatabaseConnection,
    user_id: &str,
    month: i32,
    year: i32,
) -> Result<Option<period::Model>> {
    Period::find()
        .filter(period::Column::UserId.eq(user_id))
        .filter(period::Column::Month.eq(month))
        .filter(period::Column::Year.eq(year))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Opens a new budgeting month for a user.
///
/// The (user, month, year) key must not already exist. Balances are
/// recomputed right away, so the returned record already carries the
/// predecessor's rollover.
pub async fn create_period(
    db: &DatabaseConnection,
    user_id: &str,
    month: i32,
    year: i32,
) -> Result<period::Model> {
    super::validate_month(month)?;
    if get_period(db, user_id, month, year).await?.is_some() {
        return Err(Error::Validation {
            message: format!("period {month}/{year} already exists for {user_id}"),
        });
    }

    let model = period::ActiveModel {
        user_id: Set(user_id.to_string()),
        month: Set(month),
        year: Set(year),
        ending_balance: Set(None),
        rollover_balance: Set(None),
        ..Default::default()
    };
    let created = model.insert(db).await?;

    recompute_owning_period(db, created.id).await;

    // Re-fetch: recomputation persisted the initial balances
    Period::find_by_id(created.id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "period",
            id: created.id.to_string(),
        })
}

/// Assembles the full read-side view of a month.
///
/// # Errors
/// `NotFound` when no period exists at the key.
pub async fn period_overview(
    db: &DatabaseConnection,
    user_id: &str,
    month: i32,
    year: i32,
) -> Result<PeriodOverview> {
    let period = get_period(db, user_id, month, year)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "period",
            id: format!("{user_id} {month}/{year}"),
        })?;

    let propagator = RolloverPropagator::new(SeaOrmPeriodRepository::new(db.clone()));
    let incoming_rollover = propagator.incoming_rollover_line(user_id, month, year).await?;
    let rollover_in = incoming_rollover.map_or(0.0, |line| match line.kind {
        crate::entities::EntryKind::Expense => -line.amount,
        _ => line.amount,
    });

    let lines = LineItem::find()
        .filter(line_item::Column::PeriodId.eq(period.id))
        .order_by_asc(line_item::Column::Id)
        .all(db)
        .await?;
    let transactions = Transaction::find()
        .filter(transaction::Column::PeriodId.eq(period.id))
        .order_by_asc(transaction::Column::Id)
        .all(db)
        .await?;

    let metrics = metrics::all_metrics(&lines, &transactions, rollover_in);

    Ok(PeriodOverview {
        period,
        incoming_rollover,
        lines,
        transactions,
        metrics,
    })
}
