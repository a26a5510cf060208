//! Fluent SELECT construction and execution.
//!
//! # Responsibility
//! - Accumulate clause fragments and render one parameterized statement.
//! - Keep bind values in exact placeholder order.
//! - Execute through a [`crate::db::Driver`] and expose diagnostics.

pub mod builder;
pub mod clause;
pub mod dialect;
mod error;
mod placeholder;

pub use builder::QueryBuilder;
pub use clause::{Clause, LogicGate, MatchExpression, Predicate, SearchModifier};
pub use dialect::{CostProbe, Dialect};
pub use error::{ConstructionError, QueryError, QueryResult};
