use std::path::PathBuf;

use thiserror::Error;

use crate::{ids::ItemId, item::ItemType, item_state::AvailabilityStatus};

/// Failures reported by catalog operations and the input parsers.
///
/// Every variant is recoverable by the caller; nothing here is retried
/// because every failure is deterministic for a given input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    /// No catalog entry with this identifier
    #[error("No item with id: {0}")]
    ItemNotFound(ItemId),
    /// Entry exists but is borrowed or archived
    #[error("Item not available: {display}")]
    ItemUnavailable {
        /// Identifier of the rejected item
        id: ItemId,
        /// Status observed under the item guard
        status: AvailabilityStatus,
        /// Display line of the item at rejection time
        display: String,
    },
    /// Return attempted without an active loan
    #[error("Item not currently borrowed: {display}")]
    ItemNotBorrowed {
        /// Identifier of the item
        id: ItemId,
        /// Display line of the item at rejection time
        display: String,
    },
    /// An entry with this identifier was already added
    #[error("Duplicate item id: {0}")]
    DuplicateItem(ItemId),
    /// Item carries a daily fine rate below zero
    #[error("Invalid fine rate {rate} for item {id}: must not be negative")]
    InvalidFineRate {
        /// Identifier of the rejected item
        id: ItemId,
        /// The offending daily rate
        rate: rust_decimal::Decimal,
    },
    /// Identifier string is not a plain non-negative integer
    #[error("Invalid ID format: '{input}'. {reason}")]
    InvalidIdFormat {
        /// Raw input
        input: String,
        /// What was wrong with it
        reason: &'static str,
    },
    /// Duration string does not have the `<integer> <unit>` shape
    #[error("Unrecognized duration format: '{input}'. {reason}")]
    InvalidDurationFormat {
        /// Raw input
        input: String,
        /// What was wrong with it
        reason: &'static str,
    },
    /// Duration string has the right shape but an unknown unit
    #[error("Unsupported duration unit '{unit}' in: '{input}'")]
    UnsupportedDurationUnit {
        /// Raw input
        input: String,
        /// The unit token that was not recognized
        unit: String,
    },
    /// Kind-specific operation invoked on the wrong kind of item
    #[error("Cannot {operation} item {id}: not supported for {kind}")]
    UnsupportedOperation {
        /// Identifier of the item
        id: ItemId,
        /// Kind of the item
        kind: ItemType,
        /// Name of the attempted operation
        operation: &'static str,
    },
    /// Due date falls outside the representable calendar
    #[error("Loan of {days} days starting {start} runs past the supported calendar")]
    DateOutOfRange {
        /// Start of the loan
        start: chrono::NaiveDate,
        /// Requested loan length in days
        days: u64,
    },
    /// Fine amount exceeded the decimal range
    #[error("Fine amount overflowed for item {0}")]
    FineOverflow(ItemId),
}

/// Failures while loading a [`crate::config::DeskConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid JSON for this schema
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        /// Path that was parsed
        path: PathBuf,
        /// Underlying JSON failure
        #[source]
        source: serde_json::Error,
    },
    /// A value is syntactically valid but unusable
    #[error("Invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Result alias for catalog operations
pub type LibraryResult<T> = Result<T, LibraryError>;
