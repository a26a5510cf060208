//! Multi-column full-text search entry points.
//!
//! # Responsibility
//! - Expose the fluent [`FullTextSearch`] orchestrator.
//! - Keep result envelope shaping inside core.

pub mod engine;
pub mod result;

pub use engine::{FullTextSearch, SearchError, SearchResult};
pub use result::{ColumnResult, Pagination, QueryPerformance, SearchEnvelope};
