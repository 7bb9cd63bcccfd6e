//! Database configuration module for `PocketPlan`.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. Tables
//! are generated with `Schema::create_table_from_entity`, so the database
//! schema follows the entity definitions without manual SQL.

use crate::entities::{LineItem, LineTemplate, Period, Transaction};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from `DATABASE_URL`, falling back to a default
/// local `SQLite` file. A `.env` file next to the binary is honored.
pub fn get_database_url() -> String {
    dotenvy::dotenv().ok();
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/pocketplan.sqlite".to_string())
}

/// Establishes a connection to the `SQLite` database.
///
/// # Errors
/// Returns `Error::Storage` when the connection cannot be opened.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates all tables from the entity definitions: periods, line items,
/// transactions and line templates.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let period_table = schema.create_table_from_entity(Period);
    let line_item_table = schema.create_table_from_entity(LineItem);
    let transaction_table = schema.create_table_from_entity(Transaction);
    let template_table = schema.create_table_from_entity(LineTemplate);

    db.execute(builder.build(&period_table)).await?;
    db.execute(builder.build(&line_item_table)).await?;
    db.execute(builder.build(&transaction_table)).await?;
    db.execute(builder.build(&template_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        line_item::Model as LineItemModel, line_template::Model as LineTemplateModel,
        period::Model as PeriodModel, transaction::Model as TransactionModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Tables exist when querying them succeeds
        let _: Vec<PeriodModel> = Period::find().limit(1).all(&db).await?;
        let _: Vec<LineItemModel> = LineItem::find().limit(1).all(&db).await?;
        let _: Vec<TransactionModel> = Transaction::find().limit(1).all(&db).await?;
        let _: Vec<LineTemplateModel> = LineTemplate::find().limit(1).all(&db).await?;

        Ok(())
    }
}
