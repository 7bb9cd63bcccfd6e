//! Planned line item operations.
//!
//! Line items are the planned side of a period: income to expect, expenses
//! to budget, savings to set aside. Expense and saving lines double as
//! envelopes for transactions. Every mutation here commits on its own
//! validation terms and then triggers balance recomputation for the owning
//! period; a failed recomputation never fails the mutation.

use crate::{
    core::rollover::recompute_owning_period,
    entities::{
        EntryKind, LineItem, LineTemplate, Period, Recurrence, line_item, line_template,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Retrieves all line items of a period, oldest first.
pub async fn list_line_items(
    db: &DatabaseConnection,
    period_id: i64,
) -> Result<Vec<line_item::Model>> {
    LineItem::find()
        .filter(line_item::Column::PeriodId.eq(period_id))
        .order_by_asc(line_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a line item by its unique ID.
pub async fn get_line_item_by_id(
    db: &DatabaseConnection,
    line_id: i64,
) -> Result<Option<line_item::Model>> {
    LineItem::find_by_id(line_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new planned line in a period and recomputes the owning chain.
///
/// Validates that the name is non-empty, the amount is non-negative and
/// finite, and the period exists.
pub async fn create_line_item(
    db: &DatabaseConnection,
    period_id: i64,
    name: &str,
    kind: EntryKind,
    amount: f64,
    recurrence: Recurrence,
) -> Result<line_item::Model> {
    validate_name(name)?;
    super::validate_amount(amount)?;
    require_period(db, period_id).await?;

    let line = line_item::ActiveModel {
        period_id: Set(period_id),
        name: Set(name.trim().to_string()),
        kind: Set(kind),
        amount: Set(amount),
        recurrence: Set(recurrence),
        manually_adjusted: Set(false),
        checked_at: Set(None),
        template_id: Set(None),
        ..Default::default()
    };
    let created = line.insert(db).await?;

    recompute_owning_period(db, period_id).await;
    Ok(created)
}

/// Changes the planned amount of a line, marking it as manually adjusted.
pub async fn update_line_item_amount(
    db: &DatabaseConnection,
    line_id: i64,
    amount: f64,
) -> Result<line_item::Model> {
    super::validate_amount(amount)?;
    let line = require_line(db, line_id).await?;
    let period_id = line.period_id;

    let mut active: line_item::ActiveModel = line.into();
    active.amount = Set(amount);
    active.manually_adjusted = Set(true);
    let updated = active.update(db).await?;

    recompute_owning_period(db, period_id).await;
    Ok(updated)
}

/// Marks a line as realized at the given instant, or back to planned with
/// `None`. The instant is supplied by the caller so recomputation stays
/// deterministic.
pub async fn set_line_checked(
    db: &DatabaseConnection,
    line_id: i64,
    checked_at: Option<DateTimeUtc>,
) -> Result<line_item::Model> {
    let line = require_line(db, line_id).await?;
    let period_id = line.period_id;

    let mut active: line_item::ActiveModel = line.into();
    active.checked_at = Set(checked_at);
    let updated = active.update(db).await?;

    recompute_owning_period(db, period_id).await;
    Ok(updated)
}

/// Deletes a line item. Transactions allocated to it are freed and count
/// toward the period total in full from then on.
pub async fn delete_line_item(db: &DatabaseConnection, line_id: i64) -> Result<()> {
    let line = require_line(db, line_id).await?;
    let period_id = line.period_id;

    line.delete(db).await?;

    recompute_owning_period(db, period_id).await;
    Ok(())
}

/// Restores a line's name, kind, amount and recurrence from its template.
///
/// Surfaced as not-found when the line has no template link or the template
/// was deleted, since this blocks the user-initiated reset.
pub async fn reset_line_from_template(
    db: &DatabaseConnection,
    line_id: i64,
) -> Result<line_item::Model> {
    let line = require_line(db, line_id).await?;
    let period_id = line.period_id;

    let template_id = line.template_id.ok_or(Error::NotFound {
        entity: "line template",
        id: format!("no template linked to line {line_id}"),
    })?;
    let template = LineTemplate::find_by_id(template_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "line template",
            id: template_id.to_string(),
        })?;

    let mut active: line_item::ActiveModel = line.into();
    active.name = Set(template.name);
    active.kind = Set(template.kind);
    active.amount = Set(template.amount);
    active.recurrence = Set(template.recurrence);
    active.manually_adjusted = Set(false);
    let updated = active.update(db).await?;

    recompute_owning_period(db, period_id).await;
    Ok(updated)
}

/// Instantiates all of a user's templates into a period (onboarding flow).
/// The whole batch inserts atomically, then one recomputation runs.
pub async fn instantiate_templates(
    db: &DatabaseConnection,
    user_id: &str,
    period_id: i64,
) -> Result<Vec<line_item::Model>> {
    let period = require_period(db, period_id).await?;
    if period.user_id != user_id {
        return Err(Error::Validation {
            message: format!("period {period_id} does not belong to user {user_id}"),
        });
    }

    let templates = LineTemplate::find()
        .filter(line_template::Column::UserId.eq(user_id))
        .order_by_asc(line_template::Column::Id)
        .all(db)
        .await?;

    let txn = db.begin().await?;
    let mut created = Vec::with_capacity(templates.len());
    for template in templates {
        let line = line_item::ActiveModel {
            period_id: Set(period_id),
            name: Set(template.name),
            kind: Set(template.kind),
            amount: Set(template.amount),
            recurrence: Set(template.recurrence),
            manually_adjusted: Set(false),
            checked_at: Set(None),
            template_id: Set(Some(template.id)),
            ..Default::default()
        };
        created.push(line.insert(&txn).await?);
    }
    txn.commit().await?;

    recompute_owning_period(db, period_id).await;
    Ok(created)
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "name cannot be empty".to_string(),
        });
    }
    Ok(())
}

async fn require_period(
    db: &DatabaseConnection,
    period_id: i64,
) -> Result<crate::entities::period::Model> {
    Period::find_by_id(period_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "period",
            id: period_id.to_string(),
        })
}

async fn require_line(db: &DatabaseConnection, line_id: i64) -> Result<line_item::Model> {
    LineItem::find_by_id(line_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "line item",
            id: line_id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{
        create_test_period, create_test_template, create_test_transaction, setup_test_db,
    };

    async fn stored_carry(db: &DatabaseConnection, period_id: i64) -> Option<f64> {
        Period::find_by_id(period_id)
            .one(db)
            .await
            .unwrap()
            .unwrap()
            .rollover_balance
    }

    #[tokio::test]
    async fn test_create_line_item_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let period = create_test_period(&db, "alice", 1, 2024).await?;

        let empty_name = create_line_item(
            &db,
            period.id,
            "   ",
            EntryKind::Expense,
            100.0,
            Recurrence::Fixed,
        )
        .await;
        assert!(matches!(
            empty_name.unwrap_err(),
            Error::Validation { message: _ }
        ));

        let negative = create_line_item(
            &db,
            period.id,
            "Rent",
            EntryKind::Expense,
            -50.0,
            Recurrence::Fixed,
        )
        .await;
        assert!(matches!(
            negative.unwrap_err(),
            Error::InvalidAmount { amount: -50.0 }
        ));

        let non_finite = create_line_item(
            &db,
            period.id,
            "Rent",
            EntryKind::Expense,
            f64::NAN,
            Recurrence::Fixed,
        )
        .await;
        assert!(matches!(
            non_finite.unwrap_err(),
            Error::InvalidAmount { amount: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_line_item_unknown_period() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_line_item(
            &db,
            999,
            "Rent",
            EntryKind::Expense,
            100.0,
            Recurrence::Fixed,
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { entity: "period", .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_line_item_triggers_recomputation() -> Result<()> {
        let db = setup_test_db().await?;
        let period = create_test_period(&db, "alice", 1, 2024).await?;

        let line = create_line_item(
            &db,
            period.id,
            "Salary",
            EntryKind::Income,
            2500.0,
            Recurrence::Fixed,
        )
        .await?;
        assert_eq!(line.name, "Salary");
        assert!(!line.manually_adjusted);

        assert_eq!(stored_carry(&db, period.id).await, Some(2500.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_amount_marks_manual_adjustment() -> Result<()> {
        let db = setup_test_db().await?;
        let period = create_test_period(&db, "alice", 1, 2024).await?;
        let line = create_line_item(
            &db,
            period.id,
            "Groceries",
            EntryKind::Expense,
            400.0,
            Recurrence::Fixed,
        )
        .await?;

        let updated = update_line_item_amount(&db, line.id, 450.0).await?;
        assert_eq!(updated.amount, 450.0);
        assert!(updated.manually_adjusted);

        assert_eq!(stored_carry(&db, period.id).await, Some(-450.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_set_line_checked_uses_explicit_instant() -> Result<()> {
        let db = setup_test_db().await?;
        let period = create_test_period(&db, "alice", 1, 2024).await?;
        let line = create_line_item(
            &db,
            period.id,
            "Salary",
            EntryKind::Income,
            2500.0,
            Recurrence::Fixed,
        )
        .await?;

        let as_of = chrono::DateTime::parse_from_rfc3339("2024-01-28T12:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let checked = set_line_checked(&db, line.id, Some(as_of)).await?;
        assert_eq!(checked.checked_at, Some(as_of));

        let unchecked = set_line_checked(&db, line.id, None).await?;
        assert_eq!(unchecked.checked_at, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_leaves_allocated_transactions_free() -> Result<()> {
        let db = setup_test_db().await?;
        let period = create_test_period(&db, "alice", 1, 2024).await?;
        let envelope = create_line_item(
            &db,
            period.id,
            "Groceries",
            EntryKind::Expense,
            400.0,
            Recurrence::Fixed,
        )
        .await?;
        create_test_transaction(&db, period.id, EntryKind::Expense, 120.0, Some(envelope.id))
            .await?;

        // Envelope floor dominates while the line exists
        crate::core::rollover::recompute_owning_period(&db, period.id).await;
        assert_eq!(stored_carry(&db, period.id).await, Some(-400.0));

        // After deletion the transaction reconciles as free
        delete_line_item(&db, envelope.id).await?;
        assert_eq!(stored_carry(&db, period.id).await, Some(-120.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_line_from_template() -> Result<()> {
        let db = setup_test_db().await?;
        let period = create_test_period(&db, "alice", 1, 2024).await?;
        let template =
            create_test_template(&db, "alice", "Rent", EntryKind::Expense, 900.0).await?;
        let lines = instantiate_templates(&db, "alice", period.id).await?;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].template_id, Some(template.id));

        let adjusted = update_line_item_amount(&db, lines[0].id, 950.0).await?;
        assert!(adjusted.manually_adjusted);

        let reset = reset_line_from_template(&db, lines[0].id).await?;
        assert_eq!(reset.amount, 900.0);
        assert_eq!(reset.name, "Rent");
        assert!(!reset.manually_adjusted);
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_without_template_link_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let period = create_test_period(&db, "alice", 1, 2024).await?;
        let line = create_line_item(
            &db,
            period.id,
            "Ad hoc",
            EntryKind::Expense,
            50.0,
            Recurrence::OneOff,
        )
        .await?;

        let result = reset_line_from_template(&db, line.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { entity: "line template", .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_with_deleted_template_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let period = create_test_period(&db, "alice", 1, 2024).await?;
        let template =
            create_test_template(&db, "alice", "Rent", EntryKind::Expense, 900.0).await?;
        let lines = instantiate_templates(&db, "alice", period.id).await?;

        template.delete(&db).await?;

        let result = reset_line_from_template(&db, lines[0].id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { entity: "line template", .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_instantiate_templates_checks_ownership() -> Result<()> {
        let db = setup_test_db().await?;
        let period = create_test_period(&db, "alice", 1, 2024).await?;

        let result = instantiate_templates(&db, "bob", period.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { message: _ }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_instantiate_templates_recomputes_once() -> Result<()> {
        let db = setup_test_db().await?;
        let period = create_test_period(&db, "alice", 1, 2024).await?;
        create_test_template(&db, "alice", "Salary", EntryKind::Income, 3000.0).await?;
        create_test_template(&db, "alice", "Rent", EntryKind::Expense, 900.0).await?;
        create_test_template(&db, "alice", "Savings", EntryKind::Saving, 400.0).await?;

        let created = instantiate_templates(&db, "alice", period.id).await?;
        assert_eq!(created.len(), 3);

        // 3000 - 900 - 400
        assert_eq!(stored_carry(&db, period.id).await, Some(1700.0));
        Ok(())
    }
}
