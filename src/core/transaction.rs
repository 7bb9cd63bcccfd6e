//! Actual transaction operations.
//!
//! Transactions are the actual side of a period. Allocating one to an
//! expense or saving line makes that line its envelope; leaving the
//! allocation empty makes it free, counting toward the total in full.
//! Every mutation commits on its own validation terms and then triggers
//! balance recomputation for the owning period.

use crate::{
    core::rollover::recompute_owning_period,
    entities::{EntryKind, LineItem, Period, Transaction, transaction},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Retrieves all transactions of a period, oldest first.
pub async fn list_transactions(
    db: &DatabaseConnection,
    period_id: i64,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::PeriodId.eq(period_id))
        .order_by_asc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a transaction by its unique ID.
pub async fn get_transaction_by_id(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<Option<transaction::Model>> {
    Transaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Records a transaction in a period and recomputes the owning chain.
///
/// When an envelope allocation is supplied, the referenced line must exist
/// in the same period - here the missing referent blocks a user-initiated
/// action, so it surfaces instead of silently degrading to free.
/// `checked_at` is the caller-supplied realization instant, or `None` for a
/// planned transaction.
pub async fn create_transaction(
    db: &DatabaseConnection,
    period_id: i64,
    envelope_line_id: Option<i64>,
    name: &str,
    kind: EntryKind,
    amount: f64,
    checked_at: Option<DateTimeUtc>,
) -> Result<transaction::Model> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "name cannot be empty".to_string(),
        });
    }
    super::validate_amount(amount)?;

    Period::find_by_id(period_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "period",
            id: period_id.to_string(),
        })?;
    if let Some(line_id) = envelope_line_id {
        require_envelope_line(db, period_id, line_id).await?;
    }

    let model = transaction::ActiveModel {
        period_id: Set(period_id),
        envelope_line_id: Set(envelope_line_id),
        name: Set(name.trim().to_string()),
        kind: Set(kind),
        amount: Set(amount),
        checked_at: Set(checked_at),
        ..Default::default()
    };
    let created = model.insert(db).await?;

    recompute_owning_period(db, period_id).await;
    Ok(created)
}

/// Changes a transaction's amount.
pub async fn update_transaction_amount(
    db: &DatabaseConnection,
    transaction_id: i64,
    amount: f64,
) -> Result<transaction::Model> {
    super::validate_amount(amount)?;
    let tx = require_transaction(db, transaction_id).await?;
    let period_id = tx.period_id;

    let mut active: transaction::ActiveModel = tx.into();
    active.amount = Set(amount);
    let updated = active.update(db).await?;

    recompute_owning_period(db, period_id).await;
    Ok(updated)
}

/// Allocates the transaction to an envelope line, or frees it with `None`.
pub async fn assign_envelope(
    db: &DatabaseConnection,
    transaction_id: i64,
    envelope_line_id: Option<i64>,
) -> Result<transaction::Model> {
    let tx = require_transaction(db, transaction_id).await?;
    let period_id = tx.period_id;

    if let Some(line_id) = envelope_line_id {
        require_envelope_line(db, period_id, line_id).await?;
    }

    let mut active: transaction::ActiveModel = tx.into();
    active.envelope_line_id = Set(envelope_line_id);
    let updated = active.update(db).await?;

    recompute_owning_period(db, period_id).await;
    Ok(updated)
}

/// Marks a transaction as realized at the given instant, or back to planned
/// with `None`.
pub async fn set_transaction_checked(
    db: &DatabaseConnection,
    transaction_id: i64,
    checked_at: Option<DateTimeUtc>,
) -> Result<transaction::Model> {
    let tx = require_transaction(db, transaction_id).await?;
    let period_id = tx.period_id;

    let mut active: transaction::ActiveModel = tx.into();
    active.checked_at = Set(checked_at);
    let updated = active.update(db).await?;

    recompute_owning_period(db, period_id).await;
    Ok(updated)
}

/// Deletes a transaction and recomputes the owning chain.
pub async fn delete_transaction(db: &DatabaseConnection, transaction_id: i64) -> Result<()> {
    let tx = require_transaction(db, transaction_id).await?;
    let period_id = tx.period_id;

    tx.delete(db).await?;

    recompute_owning_period(db, period_id).await;
    Ok(())
}

async fn require_transaction(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<transaction::Model> {
    Transaction::find_by_id(transaction_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "transaction",
            id: transaction_id.to_string(),
        })
}

async fn require_envelope_line(
    db: &DatabaseConnection,
    period_id: i64,
    line_id: i64,
) -> Result<()> {
    let line = LineItem::find_by_id(line_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "envelope line",
            id: line_id.to_string(),
        })?;
    if line.period_id != period_id {
        return Err(Error::NotFound {
            entity: "envelope line",
            id: format!("{line_id} (not in period {period_id})"),
        });
    }
    Ok(())
}
