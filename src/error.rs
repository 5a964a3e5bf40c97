//! Error types for taskdesk operations.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::Role;
use crate::storage::Collection;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing a collection file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored data is not valid JSON for the collection.
    #[error("Malformed {collection} data: {source}")]
    Parse {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A required collection has never been written.
    #[error("The {0} collection does not exist")]
    MissingCollection(Collection),

    #[error("Task {0} not found")]
    TaskNotFound(u64),

    #[error("Unknown employee '{0}'")]
    UnknownEmployee(String),

    /// Logged hours must be a finite, non-negative number.
    #[error("Invalid hours {0}: must be a non-negative number")]
    InvalidHours(f64),

    #[error("Invalid priority '{0}'. Use High, Medium or Low.")]
    InvalidPriority(String),

    #[error("Deadline {0} is in the past")]
    DeadlineInPast(NaiveDate),

    /// Deliberately does not say which of username or password was wrong.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("This action requires the {0} role")]
    PermissionDenied(Role),

    /// The OS random source could not produce a salt.
    #[error("Failed to generate a salt: {0}")]
    Random(#[from] getrandom::Error),

    #[error("Malformed password hash")]
    MalformedPasswordHash,
}
