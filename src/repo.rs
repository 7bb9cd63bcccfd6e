//! Storage abstraction consumed by the rollover propagator.
//!
//! [`PeriodRepository`] is the seam between the engine and persistence: the
//! propagator is generic over it, so tests can substitute an implementation
//! without touching production behavior. Recomputing one period happens
//! inside a [`PeriodScope`]: every read feeding the metric computation and
//! the final balance write go through the same scope, which the SeaORM
//! implementation backs with a database transaction. Concurrent writers of
//! the same period are therefore serialized and cannot persist balances
//! computed from a stale read.
//!
//! The chronological neighbors of a period are found by decrementing or
//! incrementing the (month, year) key - wrapping at the December/January
//! boundary - and looking the key up, never by sequential id.

use crate::{
    entities::{LineItem, Period, Transaction, line_item, period, transaction},
    errors::{Error, Result},
};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, QueryOrder, Set, TransactionTrait,
    prelude::*,
};

/// The (month, year) key immediately before the given one.
#[must_use]
pub const fn previous_month(month: i32, year: i32) -> (i32, i32) {
    if month == 1 { (12, year - 1) } else { (month - 1, year) }
}

/// The (month, year) key immediately after the given one.
#[must_use]
pub const fn next_month(month: i32, year: i32) -> (i32, i32) {
    if month == 12 { (1, year + 1) } else { (month + 1, year) }
}

/// Storage contract for periods, their line items and transactions.
///
/// Native async methods; the propagator consumes implementors through a
/// generic parameter, so no additional `Send` bounds are imposed here.
#[allow(async_fn_in_trait)]
pub trait PeriodRepository {
    /// Scope a single period's recomputation runs in.
    type Scope: PeriodScope;

    /// Opens a read-compute-persist scope for one period.
    async fn begin(&self) -> Result<Self::Scope>;

    /// The stored period chronologically after (month, year), one step
    /// forward. None terminates a propagation cascade.
    async fn next_period(
        &self,
        user_id: &str,
        month: i32,
        year: i32,
    ) -> Result<Option<period::Model>>;
}

/// One period recomputation's window onto storage.
///
/// All reads and the balance write of one recomputation share a scope;
/// dropping a scope without [`commit`](Self::commit) discards its write.
#[allow(async_fn_in_trait)]
pub trait PeriodScope {
    /// Looks up one user's period by its (month, year) key.
    async fn period(&self, user_id: &str, month: i32, year: i32) -> Result<Option<period::Model>>;

    /// The stored period chronologically before (month, year), one step back.
    async fn previous_period(
        &self,
        user_id: &str,
        month: i32,
        year: i32,
    ) -> Result<Option<period::Model>>;

    /// All planned line items of a period.
    async fn line_items(&self, period_id: i64) -> Result<Vec<line_item::Model>>;

    /// All actual transactions of a period.
    async fn transactions(&self, period_id: i64) -> Result<Vec<transaction::Model>>;

    /// Writes the computed balances onto the period record.
    async fn persist_balances(
        &self,
        period_id: i64,
        ending_balance: f64,
        rollover_balance: f64,
    ) -> Result<()>;

    /// Commits the scope, making its balance write visible.
    async fn commit(self) -> Result<()>;
}

async fn find_by_key<C: ConnectionTrait>(
    db: &C,
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

/// SeaORM-backed repository over a `SQLite` (or any sea-orm) connection.
#[derive(Debug, Clone)]
pub struct SeaOrmPeriodRepository {
    db: DatabaseConnection,
}

impl SeaOrmPeriodRepository {
    /// Wraps an open database connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl PeriodRepository for SeaOrmPeriodRepository {
    type Scope = SeaOrmPeriodScope;

    async fn begin(&self) -> Result<SeaOrmPeriodScope> {
        Ok(SeaOrmPeriodScope {
            txn: self.db.begin().await?,
        })
    }

    async fn next_period(
        &self,
        user_id: &str,
        month: i32,
        year: i32,
    ) -> Result<Option<period::Model>> {
        let (month, year) = next_month(month, year);
        find_by_key(&self.db, user_id, month, year).await
    }
}

/// Transaction-backed scope over a SeaORM connection.
///
/// Dropping the scope uncommitted rolls the transaction back when the
/// connection returns to the pool.
pub struct SeaOrmPeriodScope {
    txn: DatabaseTransaction,
}

impl PeriodScope for SeaOrmPeriodScope {
    async fn period(&self, user_id: &str, month: i32, year: i32) -> Result<Option<period::Model>> {
        find_by_key(&self.txn, user_id, month, year).await
    }

    async fn previous_period(
        &self,
        user_id: &str,
        month: i32,
        year: i32,
    ) -> Result<Option<period::Model>> {
        let (month, year) = previous_month(month, year);
        find_by_key(&self.txn, user_id, month, year).await
    }

    async fn line_items(&self, period_id: i64) -> Result<Vec<line_item::Model>> {
        LineItem::find()
            .filter(line_item::Column::PeriodId.eq(period_id))
            .order_by_asc(line_item::Column::Id)
            .all(&self.txn)
            .await
            .map_err(Into::into)
    }

    async fn transactions(&self, period_id: i64) -> Result<Vec<transaction::Model>> {
        Transaction::find()
            .filter(transaction::Column::PeriodId.eq(period_id))
            .order_by_asc(transaction::Column::Id)
            .all(&self.txn)
            .await
            .map_err(Into::into)
    }

    async fn persist_balances(
        &self,
        period_id: i64,
        ending_balance: f64,
        rollover_balance: f64,
    ) -> Result<()> {
        let period = Period::find_by_id(period_id)
            .one(&self.txn)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "period",
                id: period_id.to_string(),
            })?;

        let mut active: period::ActiveModel = period.into();
        active.ending_balance = Set(Some(ending_balance));
        active.rollover_balance = Set(Some(rollover_balance));
        active.update(&self.txn).await?;
        Ok(())
    }

    async fn commit(self) -> Result<()> {
        self.txn.commit().await.map_err(Into::into)
    }
}
