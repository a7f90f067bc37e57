//! Shared Diesel error mapping for the repository adapters.
//!
//! Every port error generated by `define_port_error!` exposes `connection`
//! and `query` constructors, so the adapters hand those in as closures and
//! this module decides which one a given failure belongs to.

use tracing::debug;

use super::pool::PoolError;

/// Map a pool failure into a port's connection error.
pub(crate) fn map_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map a Diesel failure into a port's query or connection error.
///
/// `NotFound` and query-builder failures count as query errors; only a
/// closed connection maps to the connection constructor. Details are logged
/// at debug level and never leak into the returned message.
pub(crate) fn map_diesel_error<E>(
    error: diesel::result::Error,
    query: impl Fn(&'static str) -> E,
    connection: impl Fn(&'static str) -> E,
) -> E {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => query("database error"),
        _ => query("database error"),
    }
}
