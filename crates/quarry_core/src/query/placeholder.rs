//! Placeholder scanning over rendered SQL text.
//!
//! Quoted literals and quoted identifiers are skipped, so a `?` inside
//! `'...'`, `"..."` or `` `...` `` never counts as a placeholder.

use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;

static SQL_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"'(?:[^']|'')*'|"(?:[^"]|"")*"|`[^`]*`|\?"#).expect("valid sql token regex")
});

/// Counts positional placeholders outside quoted sections.
pub(crate) fn count_placeholders(sql: &str) -> usize {
    SQL_TOKEN_RE
        .find_iter(sql)
        .filter(|token| token.as_str() == "?")
        .count()
}

/// Substitutes quoted literals for placeholders, left to right.
///
/// Debug rendering only; placeholders beyond the supplied values stay as `?`.
pub(crate) fn interpolate(sql: &str, values: &[Value]) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut values = values.iter();
    let mut last_end = 0;

    for token in SQL_TOKEN_RE.find_iter(sql) {
        if token.as_str() != "?" {
            continue;
        }
        out.push_str(&sql[last_end..token.start()]);
        match values.next() {
            Some(value) => out.push_str(&literal(value)),
            None => out.push('?'),
        }
        last_end = token.end();
    }
    out.push_str(&sql[last_end..]);
    out
}

/// Renders one bind value as a SQL literal.
pub(crate) fn literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(number) => number.to_string(),
        Value::Real(number) => number.to_string(),
        Value::Text(text) => format!("'{}'", text.replace('\'', "''")),
        Value::Blob(bytes) => {
            let hex = bytes.iter().map(|byte| format!("{byte:02X}")).collect::<String>();
            format!("X'{hex}'")
        }
    }
}
