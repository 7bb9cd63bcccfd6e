/// Database configuration and connection management
pub mod database;

/// Line template configuration loading from config.toml
pub mod templates;
