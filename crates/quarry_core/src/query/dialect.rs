//! SQL dialect differences the builder has to care about.

use super::clause::SearchModifier;
use crate::db::fulltext::MATCH_FUNCTION;

/// Target engine flavor for full-text predicates and cost probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `MATCH(cols) AGAINST (? <modifier>)` with a status-variable cost probe.
    MySql,
    /// Registered `quarry_match` scalar function with a query-plan probe.
    Sqlite,
}

/// How a dialect reports the cost of the last executed statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostProbe {
    /// Standalone statement without bind values.
    Status(&'static str),
    /// `EXPLAIN QUERY PLAN` over the last statement with its bind values.
    ExplainPlan,
}

impl Dialect {
    /// Renders a full-text predicate with exactly one placeholder.
    pub fn match_expression(self, columns: &[String], modifier: SearchModifier) -> String {
        match self {
            Self::MySql => format!(
                "MATCH({}) AGAINST (? {})",
                columns.join(", "),
                modifier.as_sql()
            ),
            Self::Sqlite => format!(
                "{MATCH_FUNCTION}(?, '{}', {})",
                modifier.as_sql(),
                columns.join(", ")
            ),
        }
    }

    pub fn cost_probe(self) -> CostProbe {
        match self {
            Self::MySql => CostProbe::Status("SHOW STATUS LIKE 'Last_query_cost'"),
            Self::Sqlite => CostProbe::ExplainPlan,
        }
    }
}
