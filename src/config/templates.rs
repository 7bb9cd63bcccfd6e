//! Line template configuration loading from config.toml
//!
//! Templates defined in config.toml seed a user's reusable line templates on
//! first run or when templates are missing. Seeding is idempotent: a template
//! already present under the same name is left untouched.

use crate::{
    entities::{EntryKind, LineTemplate, Recurrence, line_template},
    errors::{Error, Result},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// List of line template configurations to seed
    pub templates: Vec<TemplateConfig>,
}

/// Configuration for a single line template
#[derive(Debug, Deserialize, Clone)]
pub struct TemplateConfig {
    /// Name of the template, unique per user
    pub name: String,
    /// Income, expense or saving
    pub kind: EntryKind,
    /// Default planned amount
    pub amount: f64,
    /// Fixed (recurs every month) or one-off
    pub recurrence: Recurrence,
}

/// Loads template configuration from a TOML file.
///
/// # Errors
/// Returns `Error::Config` when the file cannot be read, the TOML syntax is
/// invalid, or required fields are missing.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads template configuration from the default location (./config.toml).
///
/// # Errors
/// Same conditions as [`load_config`].
pub fn load_default_config() -> Result<Config> {
    load_config("config.toml")
}

/// Seeds a user's line templates from configuration.
///
/// Only templates whose name the user does not have yet are inserted.
/// Returns the number of templates created.
pub async fn seed_templates(
    db: &DatabaseConnection,
    user_id: &str,
    config: &Config,
) -> Result<usize> {
    let mut created = 0;
    for template in &config.templates {
        let existing = LineTemplate::find()
            .filter(line_template::Column::UserId.eq(user_id))
            .filter(line_template::Column::Name.eq(template.name.as_str()))
            .one(db)
            .await?;
        if existing.is_some() {
            continue;
        }

        let model = line_template::ActiveModel {
            user_id: Set(user_id.to_string()),
            name: Set(template.name.clone()),
            kind: Set(template.kind),
            amount: Set(template.amount),
            recurrence: Set(template.recurrence),
            ..Default::default()
        };
        model.insert(db).await?;
        created += 1;
    }

    if created > 0 {
        info!(user_id, created, "seeded line templates from configuration");
    }
    Ok(created)
}
