//! Driver seam and SQLite connection bootstrap.
//!
//! # Responsibility
//! - Define the [`Driver`] contract the query layer executes against.
//! - Open and configure SQLite connections with full-text scoring support.
//!
//! # Invariants
//! - Rows are materialized eagerly; no cursor outlives a driver call.
//! - Connections returned by `open_db*` have `quarry_match` registered.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod driver;
pub mod fulltext;
mod open;

pub use driver::{Driver, Row};
pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Failure reported by a non-SQLite driver implementation.
    Driver(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Driver(message) => write!(f, "driver failure: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Driver(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
