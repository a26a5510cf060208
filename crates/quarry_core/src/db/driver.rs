//! Connection provider contract and its SQLite implementation.

use super::DbResult;
use crate::query::dialect::Dialect;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde_json::{Map, Number, Value as JsonValue};

/// One materialized result row: column name to JSON value, in select order.
pub type Row = Map<String, JsonValue>;

/// Open database handle the query layer executes against.
///
/// Implementations own prepare/bind/execute and report failures as
/// [`super::DbError`]. Credentials, retries and pooling stay with the caller.
pub trait Driver {
    /// SQL dialect used to render full-text predicates and cost probes.
    fn dialect(&self) -> Dialect;

    /// Prepares `sql`, binds `params` positionally and returns every row.
    fn fetch_all(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>>;
}

impl Driver for Connection {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn fetch_all(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        let mut stmt = self.prepare(sql)?;
        let names = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Row::new();
            for (idx, name) in names.iter().enumerate() {
                record.insert(name.clone(), value_ref_to_json(row.get_ref(idx)?));
            }
            out.push(record);
        }

        Ok(out)
    }
}

fn value_ref_to_json(value: ValueRef<'_>) -> JsonValue {
    match value {
        ValueRef::Null => JsonValue::Null,
        ValueRef::Integer(number) => JsonValue::from(number),
        ValueRef::Real(number) => Number::from_f64(number)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        ValueRef::Text(bytes) => JsonValue::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => {
            JsonValue::Array(bytes.iter().map(|byte| JsonValue::from(*byte)).collect())
        }
    }
}
