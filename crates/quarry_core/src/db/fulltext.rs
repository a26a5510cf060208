//! Full-text scoring function for SQLite connections.
//!
//! SQLite has no `MATCH ... AGAINST` predicate, so the SQLite dialect renders
//! full-text clauses as calls to [`MATCH_FUNCTION`]:
//! `quarry_match(needle, modifier, column, ...)`.
//!
//! # Invariants
//! - The score is `0.0` for non-matching rows, so the call works as both a
//!   `WHERE` predicate and a relevance column.
//! - In boolean mode every term must occur at least once.

use super::DbResult;
use crate::query::clause::SearchModifier;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::Connection;

/// Name of the registered scalar function.
pub const MATCH_FUNCTION: &str = "quarry_match";

const OPERATOR_CHARS: &[char] = &['*', '+', '-', '"', '~', '<', '>', '(', ')', '@'];

/// Registers [`MATCH_FUNCTION`] on the given connection.
pub fn register_fulltext_functions(conn: &Connection) -> DbResult<()> {
    conn.create_scalar_function(
        MATCH_FUNCTION,
        -1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            if ctx.len() < 3 {
                return Err(rusqlite::Error::UserFunctionError(
                    "quarry_match expects a needle, a modifier and at least one column".into(),
                ));
            }

            let needle: String = ctx.get(0)?;
            let modifier: String = ctx.get(1)?;
            let modifier =
                SearchModifier::parse(&modifier).unwrap_or(SearchModifier::NaturalLanguage);

            let haystacks = (2..ctx.len())
                .filter_map(|idx| match ctx.get_raw(idx) {
                    ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).to_lowercase()),
                    _ => None,
                })
                .collect::<Vec<_>>();

            Ok(relevance_score(&needle, modifier, &haystacks))
        },
    )?;
    Ok(())
}

/// Scores lowercased `haystacks` against a full-text needle.
pub fn relevance_score(needle: &str, modifier: SearchModifier, haystacks: &[String]) -> f64 {
    let terms = search_terms(needle);
    if terms.is_empty() {
        return 0.0;
    }

    let mut total = 0usize;
    for term in &terms {
        let hits = haystacks
            .iter()
            .map(|haystack| haystack.matches(term.as_str()).count())
            .sum::<usize>();
        if hits == 0 && modifier == SearchModifier::Boolean {
            return 0.0;
        }
        total += hits;
    }

    total as f64
}

fn search_terms(needle: &str) -> Vec<String> {
    needle
        .split_whitespace()
        .map(|term| term.trim_matches(OPERATOR_CHARS).to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}
