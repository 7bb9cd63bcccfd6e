//! Shared test utilities for `PocketPlan`.
//!
//! Provides an in-memory `SQLite` setup, entity factories with sensible
//! defaults for integration tests, and plain model builders for the pure
//! calculation tests that never touch a database.

use crate::{
    entities::{EntryKind, Recurrence, line_item, line_template, period, transaction},
    errors::Result,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Installs a tracing subscriber honoring `RUST_LOG`, once per process.
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Creates a period with uncomputed balances.
pub async fn create_test_period(
    db: &DatabaseConnection,
    user_id: &str,
    month: i32,
    year: i32,
) -> Result<period::Model> {
    let model = period::ActiveModel {
        user_id: Set(user_id.to_string()),
        month: Set(month),
        year: Set(year),
        ending_balance: Set(None),
        rollover_balance: Set(None),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Creates a planned line item with defaults: fixed recurrence, not
/// manually adjusted, unchecked, no template link.
pub async fn create_test_line(
    db: &DatabaseConnection,
    period_id: i64,
    kind: EntryKind,
    amount: f64,
) -> Result<line_item::Model> {
    let model = line_item::ActiveModel {
        period_id: Set(period_id),
        name: Set("Test line".to_string()),
        kind: Set(kind),
        amount: Set(amount),
        recurrence: Set(Recurrence::Fixed),
        manually_adjusted: Set(false),
        checked_at: Set(None),
        template_id: Set(None),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Creates a transaction, optionally allocated to an envelope line.
pub async fn create_test_transaction(
    db: &DatabaseConnection,
    period_id: i64,
    kind: EntryKind,
    amount: f64,
    envelope_line_id: Option<i64>,
) -> Result<transaction::Model> {
    let model = transaction::ActiveModel {
        period_id: Set(period_id),
        envelope_line_id: Set(envelope_line_id),
        name: Set("Test transaction".to_string()),
        kind: Set(kind),
        amount: Set(amount),
        checked_at: Set(None),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Creates a reusable line template for a user.
pub async fn create_test_template(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
    kind: EntryKind,
    amount: f64,
) -> Result<line_template::Model> {
    let model = line_template::ActiveModel {
        user_id: Set(user_id.to_string()),
        name: Set(name.to_string()),
        kind: Set(kind),
        amount: Set(amount),
        recurrence: Set(Recurrence::Fixed),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// In-memory line item builder for pure calculation tests.
#[must_use]
pub fn line_model(id: i64, kind: EntryKind, amount: f64) -> line_item::Model {
    line_item::Model {
        id,
        period_id: 1,
        name: format!("line {id}"),
        kind,
        amount,
        recurrence: Recurrence::Fixed,
        manually_adjusted: false,
        checked_at: None,
        template_id: None,
    }
}

/// In-memory transaction builder for pure calculation tests.
#[must_use]
pub fn transaction_model(
    id: i64,
    kind: EntryKind,
    amount: f64,
    envelope_line_id: Option<i64>,
) -> transaction::Model {
    transaction::Model {
        id,
        period_id: 1,
        envelope_line_id,
        name: format!("transaction {id}"),
        kind,
        amount,
        checked_at: None,
    }
}
