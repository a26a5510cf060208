mod common;

use common::{row, text, tracks_db, RecordingDriver};
use quarry_core::{
    AllowList, FullTextSearch, GuardError, IdentifierKind, QuarryConfig, QueryError, SearchError,
};
use serde_json::json;
use std::error::Error;

/// Fake MySQL catalogue: 12 `track` matches, 95 `artist` matches.
fn catalogue_driver() -> RecordingDriver {
    RecordingDriver::new(|sql, _| {
        if sql.starts_with("SHOW STATUS") {
            return Ok(vec![row(json!({
                "Variable_name": "Last_query_cost",
                "Value": "2.5"
            }))]);
        }
        let total = if sql.contains("MATCH(track)") { 12 } else { 95 };
        if sql.starts_with("SELECT COUNT(*)") {
            return Ok(vec![row(json!({ "count": total }))]);
        }
        Ok((0..10)
            .map(|id| row(json!({ "id": id, "track": "So What", "artist": "Miles Davis" })))
            .collect())
    })
}

#[test]
fn searches_each_column_independently_and_ranks_by_total() {
    let driver = catalogue_driver();
    let mut search = FullTextSearch::new(&driver);
    search
        .search("tracks", ["Miles", "Davis"])
        .columns(["track", "artist"])
        .select(["id", "track", "artist"])
        .limit(0, 10);

    let envelope = search.execute().unwrap().clone();
    assert_eq!(envelope.columns, vec!["track", "artist"]);
    assert!(envelope.performance >= 0.0);

    let ranked = envelope
        .results
        .iter()
        .map(|result| result.column.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ranked, vec!["artist", "track"]);

    let artist = &envelope.results[0];
    assert_eq!(artist.result_total, 10);
    assert_eq!(artist.items.len(), 10);
    let pagination = artist.pagination.unwrap();
    assert_eq!(pagination.total_entries, 95);
    assert_eq!(pagination.total_pages, 10);
    assert_eq!(pagination.current_page, 1);
    assert_eq!(
        artist.performance.cost.as_ref().unwrap()["Value"],
        json!("2.5")
    );

    let track = &envelope.results[1];
    assert_eq!(
        track.query,
        "SELECT MATCH(track) AGAINST (? IN BOOLEAN MODE) AS relevance_0, ? AS search_term_0, \
         MATCH(track) AGAINST (? IN BOOLEAN MODE) AS relevance_1, ? AS search_term_1, \
         id, track, artist FROM tracks \
         WHERE MATCH(track) AGAINST (? IN BOOLEAN MODE) \
         OR MATCH(track) AGAINST (? IN BOOLEAN MODE) \
         ORDER BY (relevance_0 + relevance_1) DESC LIMIT 0, 10"
    );
    assert_eq!(track.pagination.unwrap().total_pages, 2);
}

#[test]
fn every_column_runs_search_probe_then_count() {
    let driver = catalogue_driver();
    let mut search = FullTextSearch::new(&driver);
    search
        .search("tracks", ["Miles", "Davis"])
        .columns(["track", "artist"])
        .select(["id", "track", "artist"])
        .join(["LEFT JOIN albums ON albums.id = tracks.album_id"])
        .limit(0, 10);
    search.execute().unwrap();

    let calls = driver.calls();
    assert_eq!(calls.len(), 6);
    assert!(calls[0].sql.contains("MATCH(track)"));
    assert!(calls[1].sql.starts_with("SHOW STATUS"));
    assert_eq!(
        calls[2].sql,
        "SELECT COUNT(*) AS count FROM tracks \
         LEFT JOIN albums ON albums.id = tracks.album_id \
         WHERE MATCH(track) AGAINST (? IN BOOLEAN MODE) \
         OR MATCH(track) AGAINST (? IN BOOLEAN MODE)"
    );
    assert_eq!(calls[2].params, vec![text("*Miles*"), text("*Davis*")]);
    assert_eq!(
        calls[0].params,
        vec![
            text("*Miles*"),
            text("Miles"),
            text("*Davis*"),
            text("Davis"),
            text("*Miles*"),
            text("*Davis*"),
        ]
    );
    assert!(calls[3].sql.contains("MATCH(artist)"));
    assert!(calls[5].sql.starts_with("SELECT COUNT(*) AS count FROM tracks"));
}

#[test]
fn pagination_reflects_offset() {
    let driver = catalogue_driver();
    let mut search = FullTextSearch::new(&driver);
    search
        .search("tracks", ["Miles"])
        .columns(["artist"])
        .select(["id"])
        .limit(20, 10);

    let envelope = search.execute().unwrap();
    let pagination = envelope.results[0].pagination.unwrap();
    assert_eq!(pagination.total_entries, 95);
    assert_eq!(pagination.total_pages, 10);
    assert_eq!(pagination.current_page, 3);
    assert_eq!(pagination.offset, 20);
    assert_eq!(pagination.limit, 10);
}

#[test]
fn user_order_precedes_relevance() {
    let driver = catalogue_driver();
    let mut search = FullTextSearch::new(&driver);
    search
        .search("tracks", ["Miles"])
        .columns(["track"])
        .select(["id"])
        .order(["id ASC"]);
    search.execute().unwrap();

    let query = search.results().results[0].query.clone();
    assert!(query.ends_with("ORDER BY id ASC, (relevance_0) DESC LIMIT 0, 10"));
}

#[test]
fn zero_total_omits_pagination() {
    let driver = RecordingDriver::new(|sql, _| {
        if sql.starts_with("SELECT COUNT(*)") {
            Ok(vec![row(json!({ "count": 0 }))])
        } else {
            Ok(Vec::new())
        }
    });
    let mut search = FullTextSearch::new(&driver);
    search
        .search("tracks", ["Zappa"])
        .columns(["track", "artist"])
        .select(["id"]);

    let envelope = search.execute().unwrap();
    assert_eq!(envelope.results.len(), 2);
    for result in &envelope.results {
        assert_eq!(result.result_total, 0);
        assert!(result.pagination.is_none());
        assert_eq!(result.total_entries(), 0);
        assert!(result.performance.cost.is_none());
    }

    let value = serde_json::to_value(envelope).unwrap();
    assert!(value["results"][0].get("pagination").is_none());
    assert_eq!(value["columns"], json!(["track", "artist"]));
}

#[test]
fn missing_configuration_is_reported_per_field() {
    let driver = RecordingDriver::empty();

    let mut search = FullTextSearch::new(&driver);
    search.columns(["track"]).select(["id"]);
    assert!(matches!(
        search.execute().unwrap_err(),
        SearchError::MissingTable
    ));

    let mut search = FullTextSearch::new(&driver);
    search.search("tracks", ["Miles"]).select(["id"]);
    assert!(matches!(
        search.execute().unwrap_err(),
        SearchError::MissingColumns
    ));

    let mut search = FullTextSearch::new(&driver);
    search
        .search("tracks", Vec::<String>::new())
        .columns(["track"])
        .select(["id"]);
    assert!(matches!(
        search.execute().unwrap_err(),
        SearchError::MissingTerms
    ));

    let mut search = FullTextSearch::new(&driver);
    search.search("tracks", ["Miles"]).columns(["track"]);
    let err = search.execute().unwrap_err();
    assert!(matches!(err, SearchError::MissingSelect));
    assert!(err.to_string().starts_with("search failed:"));

    assert!(driver.calls().is_empty());
}

#[test]
fn access_errors_are_wrapped_as_search_errors() {
    let driver = RecordingDriver::empty();
    let mut search = FullTextSearch::new(&driver);
    search
        .allow(AllowList::from_names(["albums"]), AllowList::Unrestricted)
        .search("tracks", ["Miles"])
        .columns(["track"])
        .select(["id"]);

    let err = search.execute().unwrap_err();
    assert!(matches!(
        err,
        SearchError::Guard(GuardError::AccessDenied { kind: IdentifierKind::Table, .. })
    ));
    assert!(err.to_string().starts_with("search failed: access denied"));
    assert!(err.source().is_some());
}

#[test]
fn failure_in_later_column_discards_partial_results() {
    let driver = RecordingDriver::new(|sql, _| {
        if sql.contains("MATCH(artist)") {
            Err(quarry_core::DbError::Driver("lost connection".to_string()))
        } else if sql.starts_with("SELECT COUNT(*)") {
            Ok(vec![row(json!({ "count": 3 }))])
        } else {
            Ok(Vec::new())
        }
    });
    let mut search = FullTextSearch::new(&driver);
    search
        .search("tracks", ["Miles"])
        .columns(["track", "artist"])
        .select(["id"]);

    let err = search.execute().unwrap_err();
    assert!(matches!(
        err,
        SearchError::Guard(GuardError::Query(QueryError::Database { .. }))
    ));
    assert!(err.to_string().contains("lost connection"));
    assert!(search.results().is_empty());
}

#[test]
fn search_query_reports_latest_statement() {
    let driver = catalogue_driver();
    let mut search = FullTextSearch::new(&driver);
    assert!(matches!(
        search.search_query().unwrap_err(),
        SearchError::Guard(GuardError::NoQueryBuilt)
    ));

    search
        .search("tracks", ["Miles"])
        .columns(["track"])
        .select(["id"]);
    search.execute().unwrap();
    assert!(search
        .search_query()
        .unwrap()
        .starts_with("SELECT COUNT(*) AS count FROM tracks"));
}

#[test]
fn reconfiguring_recomputes_results() {
    let conn = tracks_db();
    let mut search = FullTextSearch::new(&conn);
    search
        .search("tracks", ["Coltrane"])
        .columns(["artist"])
        .select(["id"]);
    assert_eq!(search.execute().unwrap().results[0].result_total, 1);

    search.search("tracks", ["Blakey", "Silver"]);
    let envelope = search.execute().unwrap();
    assert_eq!(envelope.results[0].result_total, 2);
    assert_eq!(search.results().results[0].pagination.unwrap().total_entries, 2);
}

#[test]
fn end_to_end_on_sqlite_tracks() {
    let conn = tracks_db();
    let config = QuarryConfig::from_json_str(
        r#"{"allowed_tables": ["tracks"], "allowed_columns": ["id", "track", "artist"]}"#,
    )
    .unwrap();
    let mut search = FullTextSearch::with_config(&conn, &config);
    search
        .search("tracks", ["Miles", "Davis"])
        .columns(["track", "artist"])
        .select(["id", "track", "artist"])
        .limit(0, 10);

    let envelope = search.execute().unwrap();
    assert_eq!(envelope.columns, vec!["track", "artist"]);
    assert_eq!(envelope.results.len(), 2);

    let artist = &envelope.results[0];
    assert_eq!(artist.column, "artist");
    assert_eq!(artist.result_total, 5);
    assert_eq!(artist.pagination.unwrap().total_entries, 5);
    assert_eq!(artist.pagination.unwrap().total_pages, 1);
    assert!(artist.performance.cost.is_some());

    let track = &envelope.results[1];
    assert_eq!(track.column, "track");
    assert_eq!(track.result_total, 4);
    assert_eq!(track.items[0]["track"], json!("Miles Davis Blues"));
    assert_eq!(track.query.matches("quarry_match(").count(), 4);
    assert!(track.query.contains(
        "WHERE quarry_match(?, 'IN BOOLEAN MODE', track) \
         OR quarry_match(?, 'IN BOOLEAN MODE', track)"
    ));
}

#[test]
fn sqlite_pages_results_but_counts_everything() {
    let conn = tracks_db();
    let mut search = FullTextSearch::new(&conn);
    search
        .search("tracks", ["Miles", "Davis"])
        .columns(["artist"])
        .select(["id"])
        .limit(2, 2);

    let envelope = search.execute().unwrap();
    let artist = &envelope.results[0];
    assert_eq!(artist.items.len(), 2);
    let pagination = artist.pagination.unwrap();
    assert_eq!(pagination.total_entries, 5);
    assert_eq!(pagination.total_pages, 3);
    assert_eq!(pagination.current_page, 2);
}

#[test]
fn config_rejects_columns_outside_allow_list() {
    let conn = tracks_db();
    let config = QuarryConfig::from_json_str(r#"{"allowed_columns": ["id", "track"]}"#).unwrap();
    let mut search = FullTextSearch::with_config(&conn, &config);
    search
        .search("tracks", ["Miles"])
        .columns(["track", "artist"])
        .select(["id"]);

    let err = search.execute().unwrap_err();
    assert!(matches!(
        err,
        SearchError::Guard(GuardError::AccessDenied { kind: IdentifierKind::Column, ref name })
            if name == "artist"
    ));
}

#[test]
fn string_counts_keep_pagination() {
    let driver = RecordingDriver::new(|sql, _| {
        if sql.starts_with("SELECT COUNT(*)") {
            Ok(vec![row(json!({ "count": "95" }))])
        } else {
            Ok(vec![row(json!({ "id": 1 }))])
        }
    });
    let mut search = FullTextSearch::new(&driver);
    search
        .search("tracks", ["Miles"])
        .columns(["artist"])
        .select(["id"])
        .limit(20, 10);

    let envelope = search.execute().unwrap();
    let artist = &envelope.results[0];
    assert_eq!(artist.total_entries(), 95);
    let pagination = artist.pagination.unwrap();
    assert_eq!(pagination.total_entries, 95);
    assert_eq!(pagination.current_page, 3);
}

#[test]
fn undecodable_counts_fail_the_search() {
    let responses = [
        Vec::new(),
        vec![row(json!({ "total": 95 }))],
        vec![row(json!({ "count": "many" }))],
    ];

    for response in responses {
        let driver = RecordingDriver::new(move |sql, _| {
            if sql.starts_with("SELECT COUNT(*)") {
                Ok(response.clone())
            } else {
                Ok(vec![row(json!({ "id": 1 }))])
            }
        });
        let mut search = FullTextSearch::new(&driver);
        search
            .search("tracks", ["Miles"])
            .columns(["artist"])
            .select(["id"]);

        let err = search.execute().unwrap_err();
        assert!(matches!(err, SearchError::InvalidCount(_)));
        assert!(err.to_string().starts_with("search failed: invalid count row"));
        assert!(search.results().is_empty());
    }
}
