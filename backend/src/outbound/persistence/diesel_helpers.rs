//! Shared error mapping for Diesel adapters.
//!
//! Storage failures are surfaced to clients with the underlying database
//! message, so the helpers keep that message and only classify whether the
//! connection or the statement failed.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Coarse classification of a storage failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StorageFault {
    /// The connection was unavailable or closed mid-statement.
    Connection(String),
    /// The statement itself failed.
    Query(String),
}

/// Extract a readable message from a pool error.
pub(crate) fn map_pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Classify a Diesel error and emit debug context for `operation`.
pub(crate) fn classify_diesel_error(error: DieselError, operation: &str) -> StorageFault {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
        }
        _ => debug!(%error, %operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            StorageFault::Connection(info.message().to_owned())
        }
        DieselError::DatabaseError(_, info) => StorageFault::Query(info.message().to_owned()),
        DieselError::BrokenTransactionManager => {
            StorageFault::Connection("transaction manager is broken".to_owned())
        }
        other => StorageFault::Query(other.to_string()),
    }
}
