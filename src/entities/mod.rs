//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod kind;
pub mod line_item;
pub mod line_template;
pub mod period;
pub mod transaction;

pub use kind::{EntryKind, Recurrence};

// Re-export specific types to avoid conflicts
pub use line_item::{Column as LineItemColumn, Entity as LineItem, Model as LineItemModel};
pub use line_template::{
    Column as LineTemplateColumn, Entity as LineTemplate, Model as LineTemplateModel,
};
pub use period::{Column as PeriodColumn, Entity as Period, Model as PeriodModel};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
