#![allow(dead_code)]

use quarry_core::{open_db_in_memory, DbError, DbResult, Dialect, Driver, Row, Value};
use rusqlite::Connection;
use serde_json::Value as JsonValue;
use std::cell::RefCell;

/// One statement seen by [`RecordingDriver`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub sql: String,
    pub params: Vec<Value>,
}

type Responder = Box<dyn Fn(&str, &[Value]) -> DbResult<Vec<Row>>>;

/// MySQL-dialect driver that records statements and answers from a closure.
pub struct RecordingDriver {
    calls: RefCell<Vec<RecordedCall>>,
    responder: Responder,
}

impl RecordingDriver {
    pub fn new(responder: impl Fn(&str, &[Value]) -> DbResult<Vec<Row>> + 'static) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// Answers every statement with no rows.
    pub fn empty() -> Self {
        Self::new(|_, _| Ok(Vec::new()))
    }

    /// Answers every statement with a driver failure.
    pub fn failing(message: &'static str) -> Self {
        Self::new(move |_, _| Err(DbError::Driver(message.to_string())))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }
}

impl Driver for RecordingDriver {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn fetch_all(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        self.calls.borrow_mut().push(RecordedCall {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        (self.responder)(sql, params)
    }
}

/// Converts a `json!({...})` object into a row.
pub fn row(value: JsonValue) -> Row {
    value
        .as_object()
        .cloned()
        .expect("row fixture must be a JSON object")
}

pub fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

/// In-memory database with a small `tracks` catalogue.
pub fn tracks_db() -> Connection {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE albums (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL
        );
        CREATE TABLE tracks (
            id INTEGER PRIMARY KEY,
            track TEXT NOT NULL,
            artist TEXT NOT NULL,
            label TEXT NOT NULL,
            album_id INTEGER REFERENCES albums(id)
        );
        INSERT INTO albums (id, title) VALUES
            (1, 'Kind of Blue'),
            (2, 'Milestones'),
            (3, 'Blue Train');
        INSERT INTO tracks (id, track, artist, label, album_id) VALUES
            (1, 'So What', 'Miles Davis', 'Columbia', 1),
            (2, 'Freddie Freeloader', 'Miles Davis', 'Columbia', 1),
            (3, 'Blue in Green', 'Miles Davis & Bill Evans', 'Columbia', 1),
            (4, 'Miles Ahead', 'Miles Davis', 'Columbia', NULL),
            (5, 'Milestones', 'Miles Davis Sextet', 'Columbia', 2),
            (6, 'Moanin''', 'Art Blakey', 'Blue Note', NULL),
            (7, 'Blue Train', 'John Coltrane', 'Blue Note', 3),
            (8, 'Davis Cup', 'Eddie Harris', 'Atlantic', NULL),
            (9, 'Song for My Father', 'Horace Silver', 'Blue Note', NULL),
            (10, 'Miles Davis Blues', 'Sonny Rollins', 'Prestige', NULL);",
    )
    .unwrap();
    conn
}
