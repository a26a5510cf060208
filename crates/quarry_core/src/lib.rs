//! SQL query construction and multi-column full-text search.
//!
//! Layers, leaves first: [`query`] renders and executes parameterized
//! SELECT statements, [`guard`] gates identifiers through allow lists, and
//! [`search`] orchestrates per-column full-text queries with ranking and
//! pagination.

pub mod config;
pub mod db;
pub mod guard;
pub mod logging;
pub mod query;
pub mod search;

pub use config::{ConfigError, QuarryConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult, Driver, Row};
pub use guard::{AllowList, DataGuard, GuardError, GuardResult, IdentifierKind};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use query::{
    ConstructionError, Dialect, LogicGate, QueryBuilder, QueryError, QueryResult, SearchModifier,
};
pub use rusqlite::types::Value;
pub use search::{
    ColumnResult, FullTextSearch, Pagination, QueryPerformance, SearchEnvelope, SearchError,
    SearchResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
