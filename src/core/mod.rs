//! Core curation logic, independent of the HTTP layer.
//!
//! Functions take a database connection (and, where needed, the raw store or
//! image store) and return [`crate::errors::Result`].

pub mod category;
pub mod names;
pub mod promotion;
pub mod raw_medicine;
pub mod valid_name;

use crate::errors::Error;
use sea_orm::{DbErr, SqlErr};

/// Converts a unique-index violation into `conflict`, any other database error into [`Error::Database`].
///
/// The `name_key` indexes make inserts an atomic insert-if-absent even when two
/// requests pass the existence check at the same time.
pub(crate) fn unique_violation_or(err: DbErr, conflict: impl FnOnce() -> Error) -> Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => conflict(),
        _ => Error::Database(err),
    }
}
