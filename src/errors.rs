//! Unified error types for the budgeting engine.
//!
//! The taxonomy mirrors how failures surface to callers: validation problems
//! abort an operation before any computation starts, missing referents are
//! surfaced only where they block a user-initiated action, and storage or
//! unexpected failures inside balance propagation are caught per period and
//! reported as an absent result rather than bubbled up.

use thiserror::Error;

/// All errors produced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input to a public operation (e.g. month outside 1-12,
    /// empty name). Recomputation does not start.
    #[error("Validation error: {message}")]
    Validation {
        /// Description of what was rejected
        message: String,
    },

    /// A negative or non-finite amount was supplied.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// A referenced entity (period, line item, template) does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity that was looked up
        entity: &'static str,
        /// Identifier used for the lookup
        id: String,
    },

    /// Configuration file or environment problem.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration failure
        message: String,
    },

    /// Repository read/write failure. Not retried by this crate; during
    /// propagation the affected period's result is treated as absent.
    #[error("Storage error: {0}")]
    Storage(#[from] sea_orm::DbErr),

    /// Failure outside the other categories. No operation in this crate
    /// produces it - the calculators are pure and cannot fail - but it is
    /// part of the public surface so embedding callers can fold their own
    /// collaborator failures into the same taxonomy. Inside propagation it
    /// would follow the same absent-result policy as [`Error::Storage`].
    #[error("Unexpected error: {message}")]
    Unexpected {
        /// Description of the failure
        message: String,
    },
}

/// Convenience `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
