//! Filter clause and full-text match declarations.

use super::error::ConstructionError;
use rusqlite::types::Value;
use std::str::FromStr;

/// Connective placed in front of a filter clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicGate {
    /// Marker for the first clause; rendered as `WHERE`.
    Start,
    And,
    Or,
}

impl LogicGate {
    /// SQL keyword emitted in front of the clause.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Start => "WHERE",
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl FromStr for LogicGate {
    type Err = ConstructionError;

    /// Parses a caller-supplied `AND`/`OR` token. `Start` is never parsed.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            _ => Err(ConstructionError::InvalidLogicGate(value.to_string())),
        }
    }
}

/// Full-text search mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchModifier {
    Boolean,
    NaturalLanguage,
    NaturalLanguageWithExpansion,
    WithExpansion,
}

const BOOLEAN_MODE: &str = "IN BOOLEAN MODE";
const NATURAL_LANGUAGE_MODE: &str = "IN NATURAL LANGUAGE MODE";
const NATURAL_LANGUAGE_EXPANSION_MODE: &str = "IN NATURAL LANGUAGE MODE WITH QUERY EXPANSION";
const EXPANSION_MODE: &str = "WITH QUERY EXPANSION";

impl SearchModifier {
    /// Parses one of the four recognized modifier keyword strings.
    ///
    /// Matching is case-insensitive and tolerates repeated whitespace.
    pub fn parse(value: &str) -> Result<Self, ConstructionError> {
        let normalized = value
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();

        match normalized.as_str() {
            BOOLEAN_MODE => Ok(Self::Boolean),
            NATURAL_LANGUAGE_MODE => Ok(Self::NaturalLanguage),
            NATURAL_LANGUAGE_EXPANSION_MODE => Ok(Self::NaturalLanguageWithExpansion),
            EXPANSION_MODE => Ok(Self::WithExpansion),
            _ => Err(ConstructionError::InvalidSearchModifier(value.to_string())),
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Boolean => BOOLEAN_MODE,
            Self::NaturalLanguage => NATURAL_LANGUAGE_MODE,
            Self::NaturalLanguageWithExpansion => NATURAL_LANGUAGE_EXPANSION_MODE,
            Self::WithExpansion => EXPANSION_MODE,
        }
    }
}

/// Predicate shape of one filter clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `<column> <operator> ?`, or `<column> <operator> (? <modifier>)`
    /// when a search modifier is attached.
    Compare {
        column: String,
        operator: String,
        modifier: Option<SearchModifier>,
    },
    /// Full-text predicate rendered by the dialect.
    Match {
        columns: Vec<String>,
        modifier: SearchModifier,
    },
}

/// One filter clause in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub predicate: Predicate,
    pub value: Value,
    pub gate: LogicGate,
}

/// Full-text match recorded alongside its filter clause.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchExpression {
    pub columns: Vec<String>,
    /// Search term as supplied by the caller.
    pub term: String,
    /// Term wrapped in wildcard markers, bound into the predicate.
    pub pattern: String,
    pub modifier: SearchModifier,
    /// Whether the relevance score is selected and summed into ordering.
    pub include_relevance: bool,
}

/// Wraps a search term in wildcard markers for partial matching.
pub fn wildcard_pattern(term: &str) -> String {
    format!("*{term}*")
}
