//! Fluent SELECT builder.
//!
//! # Responsibility
//! - Accumulate select list, table, joins, filters, grouping, ordering and
//!   pagination for exactly one logical query.
//! - Render a parameterized statement and its bind values in placeholder order.
//!
//! # Invariants
//! - The first filter clause always carries [`LogicGate::Start`].
//! - Every later clause carries an explicit `And`/`Or` gate.
//! - Bind value count equals placeholder count before the driver is called.
//! - Join, group and order fragments are trusted raw SQL and are emitted
//!   verbatim.

use super::clause::{
    wildcard_pattern, Clause, LogicGate, MatchExpression, Predicate, SearchModifier,
};
use super::dialect::{CostProbe, Dialect};
use super::error::{ConstructionError, QueryError, QueryResult};
use super::placeholder::{count_placeholders, interpolate};
use crate::db::{Driver, Row};
use log::{debug, error};
use rusqlite::types::Value;
use std::time::Instant;

/// Single-use SELECT builder bound to one driver.
///
/// Configuration calls return `&mut Self` for chaining; [`Self::execute`]
/// renders and runs the statement.
pub struct QueryBuilder<'conn, D: Driver + ?Sized> {
    driver: &'conn D,
    select: Vec<String>,
    table: Option<String>,
    joins: Vec<String>,
    clauses: Vec<Clause>,
    matches: Vec<MatchExpression>,
    group: Vec<String>,
    order: Vec<String>,
    offset: u64,
    count: u64,
    last_query: Option<String>,
    last_params: Vec<Value>,
    row_count: Option<usize>,
}

impl<'conn, D: Driver + ?Sized> QueryBuilder<'conn, D> {
    pub fn new(driver: &'conn D) -> Self {
        Self {
            driver,
            select: Vec::new(),
            table: None,
            joins: Vec::new(),
            clauses: Vec::new(),
            matches: Vec::new(),
            group: Vec::new(),
            order: Vec::new(),
            offset: 0,
            count: 0,
            last_query: None,
            last_params: Vec::new(),
            row_count: None,
        }
    }

    /// Appends columns or expressions to the select list. Duplicates are kept.
    pub fn select<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Replaces the select list.
    pub fn replace_select<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select.clear();
        self.select(columns)
    }

    pub fn from(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = Some(table.into());
        self
    }

    pub fn group_by<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn order_by<I, S>(&mut self, expressions: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order.extend(expressions.into_iter().map(Into::into));
        self
    }

    /// Appends raw join fragments, e.g. `LEFT JOIN albums ON albums.id = tracks.album_id`.
    pub fn join<I, S>(&mut self, clauses: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.joins.extend(clauses.into_iter().map(Into::into));
        self
    }

    /// Sets pagination. A `count` of zero renders no `LIMIT`.
    pub fn limit(&mut self, offset: u64, count: u64) -> &mut Self {
        self.offset = offset;
        self.count = count;
        self
    }

    /// Appends `<column> <operator> ?` bound to `value`.
    ///
    /// The first clause is always gated by [`LogicGate::Start`], whatever
    /// `gate` says. Later clauses fail without an `And`/`Or` gate.
    pub fn where_clause(
        &mut self,
        column: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
        gate: Option<LogicGate>,
    ) -> QueryResult<&mut Self> {
        self.where_with_modifier(column, operator, value, gate, "")
    }

    /// Like [`Self::where_clause`], with the placeholder rendered as
    /// `(? <modifier>)` when `modifier` is not blank.
    ///
    /// A non-blank `modifier` must be one of the recognized search modes;
    /// on failure no clause is appended.
    pub fn where_with_modifier(
        &mut self,
        column: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
        gate: Option<LogicGate>,
        modifier: &str,
    ) -> QueryResult<&mut Self> {
        let modifier = if modifier.trim().is_empty() {
            None
        } else {
            Some(SearchModifier::parse(modifier)?)
        };
        let column = column.into();
        let gate = self.resolve_gate(gate, &column)?;
        self.clauses.push(Clause {
            predicate: Predicate::Compare {
                column,
                operator: operator.into(),
                modifier,
            },
            value: value.into(),
            gate,
        });
        Ok(self)
    }

    pub fn and_where(
        &mut self,
        column: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.push_gated(column.into(), operator.into(), value.into(), LogicGate::And)
    }

    pub fn or_where(
        &mut self,
        column: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.push_gated(column.into(), operator.into(), value.into(), LogicGate::Or)
    }

    /// Appends a full-text predicate over `columns`.
    ///
    /// `modifier` must be one of the recognized search modes; on failure no
    /// clause is appended. The term is bound as `*value*`. A missing `gate`
    /// defaults to `And` after the first clause.
    pub fn match_against<I, S>(
        &mut self,
        columns: I,
        value: &str,
        modifier: &str,
        gate: Option<LogicGate>,
        include_relevance: bool,
    ) -> QueryResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let modifier = SearchModifier::parse(modifier)?;
        let columns = columns.into_iter().map(Into::into).collect::<Vec<String>>();
        let gate = if self.clauses.is_empty() {
            LogicGate::Start
        } else {
            match gate {
                Some(LogicGate::Start) | None => LogicGate::And,
                Some(gate) => gate,
            }
        };
        let pattern = wildcard_pattern(value);

        self.clauses.push(Clause {
            predicate: Predicate::Match {
                columns: columns.clone(),
                modifier,
            },
            value: Value::Text(pattern.clone()),
            gate,
        });
        self.matches.push(MatchExpression {
            columns,
            term: value.to_string(),
            pattern,
            modifier,
            include_relevance,
        });
        Ok(self)
    }

    /// Renders the statement and its bind values without executing.
    pub fn build(&self) -> QueryResult<(String, Vec<Value>)> {
        let table = match self.table.as_deref() {
            Some(table) if !table.trim().is_empty() => table,
            _ => return Err(ConstructionError::MissingTable.into()),
        };
        if self.select.is_empty() {
            return Err(ConstructionError::MissingSelect.into());
        }
        if self.clauses.is_empty() {
            return Err(ConstructionError::MissingWhere.into());
        }

        let dialect = self.driver.dialect();
        let mut params = Vec::new();
        let mut select = Vec::with_capacity(self.select.len() + self.matches.len() * 2);
        let mut relevance = Vec::new();

        for expression in self.matches.iter().filter(|m| m.include_relevance) {
            let n = relevance.len();
            select.push(format!(
                "{} AS relevance_{n}",
                dialect.match_expression(&expression.columns, expression.modifier)
            ));
            params.push(Value::Text(expression.pattern.clone()));
            select.push(format!("? AS search_term_{n}"));
            params.push(Value::Text(expression.term.clone()));
            relevance.push(format!("relevance_{n}"));
        }
        select.extend(self.select.iter().cloned());

        let mut order = self.order.clone();
        if !relevance.is_empty() {
            order.push(format!("({}) DESC", relevance.join(" + ")));
        }

        let mut parts = vec![format!("SELECT {}", select.join(", ")), format!("FROM {table}")];
        if !self.joins.is_empty() {
            parts.push(self.joins.join(" "));
        }
        for clause in &self.clauses {
            parts.push(format!(
                "{} {}",
                clause.gate.as_sql(),
                render_predicate(&clause.predicate, dialect)
            ));
            params.push(clause.value.clone());
        }
        if !self.group.is_empty() {
            parts.push(format!("GROUP BY {}", self.group.join(", ")));
        }
        if !order.is_empty() {
            parts.push(format!("ORDER BY {}", order.join(", ")));
        }
        if self.count > 0 {
            parts.push(format!("LIMIT {}, {}", self.offset, self.count));
        }

        Ok((parts.join(" "), params))
    }

    /// Renders, binds and runs the statement, returning every row.
    ///
    /// # Errors
    /// - Construction error when table, select list or filters are missing,
    ///   or when raw fragments introduce extra placeholders.
    /// - Database error wrapping any driver failure.
    pub fn execute(&mut self) -> QueryResult<Vec<Row>> {
        let started_at = Instant::now();
        let (sql, params) = self.build()?;

        let placeholders = count_placeholders(&sql);
        if placeholders != params.len() {
            return Err(ConstructionError::PlaceholderMismatch {
                placeholders,
                values: params.len(),
            }
            .into());
        }

        self.last_query = Some(sql.clone());
        self.last_params = params;
        self.row_count = None;

        match self.driver.fetch_all(&sql, &self.last_params) {
            Ok(rows) => {
                debug!(
                    "event=query_execute module=query status=ok params={} rows={} duration_ms={}",
                    self.last_params.len(),
                    rows.len(),
                    started_at.elapsed().as_millis()
                );
                self.row_count = Some(rows.len());
                Ok(rows)
            }
            Err(err) => {
                error!(
                    "event=query_execute module=query status=error params={} duration_ms={} error={}",
                    self.last_params.len(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(QueryError::Database {
                    query: sql,
                    source: err,
                })
            }
        }
    }

    /// Rows returned by the last execution.
    pub fn row_count(&self) -> QueryResult<usize> {
        self.row_count
            .ok_or_else(|| ConstructionError::NotExecuted.into())
    }

    /// Statement text of the last execution.
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// Bind values of the last execution, in placeholder order.
    pub fn bind_values(&self) -> &[Value] {
        &self.last_params
    }

    /// Last statement text, optionally with bind values spliced in as literals.
    ///
    /// The interpolated form is for diagnostics only and is not safe to run.
    pub fn query_text(&self, with_parameters: bool) -> Option<String> {
        let sql = self.last_query.as_deref()?;
        if with_parameters {
            Some(interpolate(sql, &self.last_params))
        } else {
            Some(sql.to_string())
        }
    }

    /// Runs the dialect's cost probe and returns its first row.
    ///
    /// Returns `None` when the probe yields nothing, or when a plan probe is
    /// requested before any statement was executed.
    pub fn performance(&self) -> QueryResult<Option<Row>> {
        let (sql, params) = match self.driver.dialect().cost_probe() {
            CostProbe::Status(sql) => (sql.to_string(), Vec::new()),
            CostProbe::ExplainPlan => match self.last_query.as_deref() {
                Some(last) => (format!("EXPLAIN QUERY PLAN {last}"), self.last_params.clone()),
                None => return Ok(None),
            },
        };

        let rows = self
            .driver
            .fetch_all(&sql, &params)
            .map_err(|source| QueryError::Database { query: sql, source })?;
        Ok(rows.into_iter().next())
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn match_expressions(&self) -> &[MatchExpression] {
        &self.matches
    }

    fn push_gated(
        &mut self,
        column: String,
        operator: String,
        value: Value,
        gate: LogicGate,
    ) -> &mut Self {
        let gate = if self.clauses.is_empty() {
            LogicGate::Start
        } else {
            gate
        };
        self.clauses.push(Clause {
            predicate: Predicate::Compare {
                column,
                operator,
                modifier: None,
            },
            value,
            gate,
        });
        self
    }

    fn resolve_gate(
        &self,
        requested: Option<LogicGate>,
        column: &str,
    ) -> Result<LogicGate, ConstructionError> {
        if self.clauses.is_empty() {
            return Ok(LogicGate::Start);
        }
        match requested {
            Some(LogicGate::And) => Ok(LogicGate::And),
            Some(LogicGate::Or) => Ok(LogicGate::Or),
            Some(LogicGate::Start) | None => Err(ConstructionError::MissingLogicGate {
                column: column.to_string(),
            }),
        }
    }
}

fn render_predicate(predicate: &Predicate, dialect: Dialect) -> String {
    match predicate {
        Predicate::Compare {
            column,
            operator,
            modifier: None,
        } => format!("{column} {operator} ?"),
        Predicate::Compare {
            column,
            operator,
            modifier: Some(modifier),
        } => format!("{column} {operator} (? {})", modifier.as_sql()),
        Predicate::Match { columns, modifier } => dialect.match_expression(columns, *modifier),
    }
}
