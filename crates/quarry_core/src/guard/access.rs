//! Allow-list gate in front of the query builder.
//!
//! # Responsibility
//! - Reject table and column identifiers outside the configured allow lists.
//! - Build the two canned search shapes (LIKE and full-text) as pending
//!   builders the caller may refine before execution.
//!
//! # Invariants
//! - Every identifier is checked before a builder is created.
//! - At most one builder is pending; building a new one replaces it.

use super::allow_list::{AllowList, IdentifierKind};
use crate::db::{Driver, Row};
use crate::query::{LogicGate, QueryBuilder, QueryError, SearchModifier};
use log::warn;
use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type GuardResult<T> = Result<T, GuardError>;

#[derive(Debug)]
pub enum GuardError {
    /// Identifier is absent from its allow list.
    AccessDenied { kind: IdentifierKind, name: String },
    EmptySearchTerms,
    /// `execute` was called with no pending builder.
    NothingToExecute,
    /// A query was requested before any builder existed.
    NoQueryBuilt,
    Query(QueryError),
}

impl Display for GuardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessDenied { kind, name } => {
                write!(f, "access denied: {kind} `{name}` is not allowed")
            }
            Self::EmptySearchTerms => write!(f, "search terms must not be empty"),
            Self::NothingToExecute => write!(f, "database error: no query is pending execution"),
            Self::NoQueryBuilt => write!(f, "no query has been built yet"),
            Self::Query(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GuardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Query(err) => Some(err),
            _ => None,
        }
    }
}

impl From<QueryError> for GuardError {
    fn from(value: QueryError) -> Self {
        Self::Query(value)
    }
}

/// Data access gate producing pre-configured builders.
pub struct DataGuard<'conn, D: Driver + ?Sized> {
    driver: &'conn D,
    tables: AllowList,
    columns: AllowList,
    pending: Option<QueryBuilder<'conn, D>>,
}

impl<'conn, D: Driver + ?Sized> DataGuard<'conn, D> {
    /// Creates an unrestricted guard.
    pub fn new(driver: &'conn D) -> Self {
        Self {
            driver,
            tables: AllowList::Unrestricted,
            columns: AllowList::Unrestricted,
            pending: None,
        }
    }

    /// Replaces both allow lists.
    pub fn set_allow_list(&mut self, tables: AllowList, columns: AllowList) -> &mut Self {
        self.tables = tables;
        self.columns = columns;
        self
    }

    /// Builds `SELECT <columns> FROM <table> WHERE col LIKE ? AND ...` with one
    /// `%term%` clause per column and term.
    pub fn search_like_query<C, T>(
        &mut self,
        table: &str,
        columns: &[C],
        terms: &[T],
    ) -> GuardResult<&mut QueryBuilder<'conn, D>>
    where
        C: AsRef<str>,
        T: AsRef<str>,
    {
        self.check(IdentifierKind::Table, table)?;
        self.check_columns(columns)?;
        let terms = non_blank(terms)?;

        let mut builder = QueryBuilder::new(self.driver);
        builder
            .select(columns.iter().map(|column| column.as_ref().to_string()))
            .from(table);
        for column in columns {
            for term in &terms {
                builder.and_where(
                    column.as_ref(),
                    "LIKE",
                    Value::Text(format!("%{term}%")),
                );
            }
        }

        Ok(self.pending.insert(builder))
    }

    /// Builds a full-text query with one boolean-mode match per term over all
    /// `columns`, joined with `OR`.
    pub fn match_against<S, C, T>(
        &mut self,
        table: &str,
        select: &[S],
        columns: &[C],
        terms: &[T],
        include_relevance: bool,
    ) -> GuardResult<&mut QueryBuilder<'conn, D>>
    where
        S: AsRef<str>,
        C: AsRef<str>,
        T: AsRef<str>,
    {
        self.check(IdentifierKind::Table, table)?;
        self.check_columns(select)?;
        self.check_columns(columns)?;
        let terms = non_blank(terms)?;

        let columns = columns
            .iter()
            .map(|column| column.as_ref().to_string())
            .collect::<Vec<_>>();
        let mut builder = QueryBuilder::new(self.driver);
        builder
            .select(select.iter().map(|column| column.as_ref().to_string()))
            .from(table);
        for term in &terms {
            builder.match_against(
                columns.iter().cloned(),
                term,
                SearchModifier::Boolean.as_sql(),
                Some(LogicGate::Or),
                include_relevance,
            )?;
        }

        Ok(self.pending.insert(builder))
    }

    /// Executes the pending builder and returns all rows.
    pub fn execute(&mut self) -> GuardResult<Vec<Row>> {
        let builder = self.pending.as_mut().ok_or(GuardError::NothingToExecute)?;
        Ok(builder.execute()?)
    }

    /// Text of the last executed statement, or the pending one rendered.
    pub fn last_query(&self) -> GuardResult<String> {
        let builder = self.pending.as_ref().ok_or(GuardError::NoQueryBuilt)?;
        match builder.last_query() {
            Some(sql) => Ok(sql.to_string()),
            None => Ok(builder.build()?.0),
        }
    }

    /// Cost probe of the pending builder.
    pub fn performance(&self) -> GuardResult<Option<Row>> {
        let builder = self.pending.as_ref().ok_or(GuardError::NothingToExecute)?;
        Ok(builder.performance()?)
    }

    pub fn pending(&self) -> Option<&QueryBuilder<'conn, D>> {
        self.pending.as_ref()
    }

    fn check_columns<C: AsRef<str>>(&self, columns: &[C]) -> GuardResult<()> {
        columns
            .iter()
            .try_for_each(|column| self.check(IdentifierKind::Column, column.as_ref()))
    }

    fn check(&self, kind: IdentifierKind, name: &str) -> GuardResult<()> {
        let list = match kind {
            IdentifierKind::Table => &self.tables,
            IdentifierKind::Column => &self.columns,
        };
        if list.permits(name) {
            return Ok(());
        }

        warn!("event=guard_access module=guard status=denied kind={kind} name={name}");
        Err(GuardError::AccessDenied {
            kind,
            name: name.to_string(),
        })
    }
}

fn non_blank<T: AsRef<str>>(terms: &[T]) -> GuardResult<Vec<String>> {
    let terms = terms
        .iter()
        .map(|term| term.as_ref().trim())
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();
    if terms.is_empty() {
        return Err(GuardError::EmptySearchTerms);
    }
    Ok(terms)
}
