//! Search result envelope types.
//!
//! Serialized field names follow the envelope consumed by presentation
//! layers: `{results: [{column, items, query, performance, resultTotal,
//! pagination?}], performance, columns}`.

use crate::db::Row;
use serde::Serialize;

/// Pagination block derived from an unfiltered count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_entries: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub limit: u64,
    pub offset: u64,
}

impl Pagination {
    /// Computes page math for `total` entries.
    ///
    /// A `limit` of zero means unbounded: everything is on page 1 of 1.
    pub fn new(total_entries: u64, offset: u64, limit: u64) -> Self {
        let (total_pages, current_page) = if limit == 0 {
            (1, 1)
        } else {
            (total_entries.div_ceil(limit), offset / limit + 1)
        };

        Self {
            total_entries,
            total_pages,
            current_page,
            limit,
            offset,
        }
    }
}

/// Timing and engine cost for one column query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPerformance {
    pub elapsed_ms: f64,
    /// Raw row returned by the dialect's cost probe.
    pub cost: Option<Row>,
}

/// Results for one searched column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnResult {
    pub column: String,
    pub items: Vec<Row>,
    pub query: String,
    pub performance: QueryPerformance,
    /// Rows on this page.
    pub result_total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl ColumnResult {
    /// Ranking key: total matching entries, or the page row count when no
    /// pagination block exists.
    pub fn total_entries(&self) -> u64 {
        self.pagination
            .map(|pagination| pagination.total_entries)
            .unwrap_or(self.result_total as u64)
    }
}

/// Top-level result of one multi-column search.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SearchEnvelope {
    /// Sorted descending by [`ColumnResult::total_entries`].
    pub results: Vec<ColumnResult>,
    /// Wall-clock seconds for the whole search.
    pub performance: f64,
    pub columns: Vec<String>,
}

impl SearchEnvelope {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Sorts column results descending by total entries. Ties keep search order.
pub(crate) fn rank(results: &mut [ColumnResult]) {
    results.sort_by(|left, right| right.total_entries().cmp(&left.total_entries()));
}
