//! Multi-column full-text search orchestration.
//!
//! # Responsibility
//! - Run one independent full-text query per searched column.
//! - Pair every column query with an unlimited `COUNT(*)` query for
//!   pagination.
//! - Rank column results by total matching entries.
//!
//! # Invariants
//! - Columns are processed sequentially; each column's search and count
//!   queries complete before the next column starts.
//! - A failure in any column fails the whole search; no partial envelope is
//!   stored.

use super::result::{rank, ColumnResult, Pagination, QueryPerformance, SearchEnvelope};
use crate::config::{QuarryConfig, DEFAULT_LIMIT};
use crate::db::Driver;
use crate::guard::{AllowList, DataGuard, GuardError};
use log::{debug, error, info};
use serde_json::Value as JsonValue;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const COUNT_SELECT: &str = "COUNT(*) AS count";

pub type SearchResult<T> = Result<T, SearchError>;

/// Search-level failure. Display output is always prefixed `search failed:`.
#[derive(Debug)]
pub enum SearchError {
    MissingTable,
    MissingColumns,
    MissingTerms,
    MissingSelect,
    /// The count query returned no row, no `count` column, or a value that
    /// is not a non-negative integer.
    InvalidCount(String),
    Guard(GuardError),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTable => write!(f, "search failed: no table to search"),
            Self::MissingColumns => write!(f, "search failed: no columns to search"),
            Self::MissingTerms => write!(f, "search failed: no search terms"),
            Self::MissingSelect => write!(f, "search failed: no columns to select"),
            Self::InvalidCount(message) => {
                write!(f, "search failed: invalid count row: {message}")
            }
            Self::Guard(err) => write!(f, "search failed: {err}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Guard(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GuardError> for SearchError {
    fn from(value: GuardError) -> Self {
        Self::Guard(value)
    }
}

/// Fluent multi-column full-text search.
///
/// Configure with the setters, then call [`Self::execute`]. Setters may be
/// called again afterwards; the next execution overwrites the cached
/// envelope.
pub struct FullTextSearch<'conn, D: Driver + ?Sized> {
    guard: DataGuard<'conn, D>,
    table: Option<String>,
    terms: Vec<String>,
    columns: Vec<String>,
    select: Vec<String>,
    offset: u64,
    count: u64,
    order: Vec<String>,
    joins: Vec<String>,
    results: SearchEnvelope,
}

impl<'conn, D: Driver + ?Sized> FullTextSearch<'conn, D> {
    /// Creates an unrestricted search paging by [`DEFAULT_LIMIT`].
    pub fn new(driver: &'conn D) -> Self {
        Self {
            guard: DataGuard::new(driver),
            table: None,
            terms: Vec::new(),
            columns: Vec::new(),
            select: Vec::new(),
            offset: 0,
            count: DEFAULT_LIMIT,
            order: Vec::new(),
            joins: Vec::new(),
            results: SearchEnvelope::default(),
        }
    }

    /// Creates a search with allow lists and page size from `config`.
    pub fn with_config(driver: &'conn D, config: &QuarryConfig) -> Self {
        let mut search = Self::new(driver);
        search
            .allow(config.table_allow_list(), config.column_allow_list())
            .limit(0, config.default_limit);
        search
    }

    /// Sets the searched table and replaces the search terms.
    pub fn search<I, S>(&mut self, table: impl Into<String>, terms: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table = Some(table.into());
        self.terms = terms.into_iter().map(Into::into).collect();
        self
    }

    /// Adds columns to search; each gets its own query and result entry.
    pub fn columns<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn select<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn limit(&mut self, offset: u64, count: u64) -> &mut Self {
        self.offset = offset;
        self.count = count;
        self
    }

    /// Adds order expressions ranked ahead of the composite relevance key.
    pub fn order<I, S>(&mut self, expressions: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order.extend(expressions.into_iter().map(Into::into));
        self
    }

    pub fn join<I, S>(&mut self, clauses: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.joins.extend(clauses.into_iter().map(Into::into));
        self
    }

    /// Replaces the table and column allow lists of the underlying guard.
    pub fn allow(&mut self, tables: AllowList, columns: AllowList) -> &mut Self {
        self.guard.set_allow_list(tables, columns);
        self
    }

    /// Runs the search and caches the ranked envelope.
    ///
    /// # Errors
    /// - Validation variants when table, columns, terms or select are unset.
    /// - [`SearchError::Guard`] wrapping access, validation or database
    ///   failures from any column.
    pub fn execute(&mut self) -> SearchResult<&SearchEnvelope> {
        let started_at = Instant::now();

        match self.run(started_at) {
            Ok(envelope) => {
                info!(
                    "event=search_execute module=search status=ok columns={} duration_ms={}",
                    envelope.columns.len(),
                    started_at.elapsed().as_millis()
                );
                self.results = envelope;
                Ok(&self.results)
            }
            Err(err) => {
                error!(
                    "event=search_execute module=search status=error columns={} duration_ms={} error={}",
                    self.columns.len(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Envelope of the last successful execution; empty before the first.
    pub fn results(&self) -> &SearchEnvelope {
        &self.results
    }

    /// Most recently rendered statement of the underlying guard.
    pub fn search_query(&self) -> SearchResult<String> {
        Ok(self.guard.last_query()?)
    }

    fn run(&mut self, started_at: Instant) -> SearchResult<SearchEnvelope> {
        let table = match self.table.as_deref() {
            Some(table) if !table.trim().is_empty() => table.to_string(),
            _ => return Err(SearchError::MissingTable),
        };
        if self.columns.is_empty() {
            return Err(SearchError::MissingColumns);
        }
        if self.terms.iter().all(|term| term.trim().is_empty()) {
            return Err(SearchError::MissingTerms);
        }
        if self.select.is_empty() {
            return Err(SearchError::MissingSelect);
        }

        let mut results = Vec::with_capacity(self.columns.len());
        for column in self.columns.clone() {
            results.push(self.search_column(&table, &column)?);
        }
        rank(&mut results);

        Ok(SearchEnvelope {
            results,
            performance: started_at.elapsed().as_secs_f64(),
            columns: self.columns.clone(),
        })
    }

    fn search_column(&mut self, table: &str, column: &str) -> SearchResult<ColumnResult> {
        let searched = [column];

        self.guard
            .match_against(table, &self.select, &searched, &self.terms, true)?
            .limit(self.offset, self.count)
            .order_by(self.order.iter().cloned())
            .join(self.joins.iter().cloned());

        let started_at = Instant::now();
        let items = self.guard.execute()?;
        let elapsed_ms = started_at.elapsed().as_secs_f64() * 1000.0;
        let query = self.guard.last_query()?;
        let cost = self.guard.performance()?;
        let result_total = items.len();

        let total = self.count_matches(table, &searched)?;
        let pagination = (total > 0).then(|| Pagination::new(total, self.offset, self.count));

        debug!(
            "event=search_column module=search status=ok rows={} total={} duration_ms={}",
            result_total,
            total,
            started_at.elapsed().as_millis()
        );

        Ok(ColumnResult {
            column: column.to_string(),
            items,
            query,
            performance: QueryPerformance { elapsed_ms, cost },
            result_total,
            pagination,
        })
    }

    fn count_matches(&mut self, table: &str, searched: &[&str]) -> SearchResult<u64> {
        self.guard
            .match_against(table, &self.select, searched, &self.terms, false)?
            .replace_select([COUNT_SELECT])
            .join(self.joins.iter().cloned());

        let rows = self.guard.execute()?;
        let row = rows.first().ok_or_else(|| {
            SearchError::InvalidCount("count query returned no rows".to_string())
        })?;
        let value = row
            .get("count")
            .ok_or_else(|| SearchError::InvalidCount("missing `count` column".to_string()))?;
        parse_count(value)
    }
}

/// Accepts an integer count or its decimal string form.
fn parse_count(value: &JsonValue) -> SearchResult<u64> {
    let parsed = match value {
        JsonValue::Number(number) => number.as_u64(),
        JsonValue::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| SearchError::InvalidCount(format!("invalid count `{value}`")))
}
