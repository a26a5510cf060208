//! Query-layer error types.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for query builder APIs.
pub type QueryResult<T> = Result<T, QueryError>;

/// Builder invariant violated before or instead of execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    MissingTable,
    MissingSelect,
    MissingWhere,
    /// A non-first filter clause was added without a logic gate.
    MissingLogicGate {
        column: String,
    },
    InvalidLogicGate(String),
    InvalidSearchModifier(String),
    /// Row count requested before any statement was executed.
    NotExecuted,
    PlaceholderMismatch {
        placeholders: usize,
        values: usize,
    },
}

impl Display for ConstructionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTable => write!(f, "no table specified"),
            Self::MissingSelect => write!(f, "no columns selected"),
            Self::MissingWhere => write!(f, "no filter clauses specified"),
            Self::MissingLogicGate { column } => {
                write!(f, "clause on `{column}` requires a logic gate (AND/OR)")
            }
            Self::InvalidLogicGate(token) => {
                write!(f, "invalid logic gate `{token}`; expected AND|OR")
            }
            Self::InvalidSearchModifier(value) => {
                write!(f, "invalid full-text search modifier `{value}`")
            }
            Self::NotExecuted => write!(f, "no query has been executed yet"),
            Self::PlaceholderMismatch {
                placeholders,
                values,
            } => write!(
                f,
                "statement has {placeholders} placeholders but {values} bind values"
            ),
        }
    }
}

impl Error for ConstructionError {}

/// Error returned by [`super::QueryBuilder`] operations.
#[derive(Debug)]
pub enum QueryError {
    Construction(ConstructionError),
    /// Driver failure while preparing, binding or executing `query`.
    Database {
        query: String,
        source: DbError,
    },
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Construction(err) => write!(f, "invalid query: {err}"),
            Self::Database { query, source } => {
                write!(f, "database error while executing `{query}`: {source}")
            }
        }
    }
}

impl Error for QueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Construction(err) => Some(err),
            Self::Database { source, .. } => Some(source),
        }
    }
}

impl From<ConstructionError> for QueryError {
    fn from(value: ConstructionError) -> Self {
        Self::Construction(value)
    }
}
