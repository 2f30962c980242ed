//! Row Operation Tests
//!
//! Tests for insert / read / delete against registered tables:
//! - Validation failures never write
//! - Values round-trip through the store with their declared types
//! - Projection, sort and limit rules for reads
//! - Delete by identifier and batch insert semantics

use chrono::{TimeZone, Utc};
use schemadb::value::row_from_json;
use schemadb::{ColumnModel, Database, DbError, Row, SortSpec, TableModel, TableQuery, Value};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn row(pairs: &[(&str, Value)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn setup() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.create_table(TableModel::new(
        "items",
        vec![
            ColumnModel::string("name").required(),
            ColumnModel::boolean("active"),
            ColumnModel::int("qty"),
            ColumnModel::real("price"),
            ColumnModel::date("created"),
            ColumnModel::object("meta"),
            ColumnModel::array("tags"),
        ],
    ))
    .unwrap();
    db
}

fn seed(db: &Database) {
    for (name, qty) in [("pear", 3), ("apple", 10), ("fig", 7)] {
        db.insert_row("items", &row(&[("name", name.into()), ("qty", qty.into())]))
            .unwrap();
    }
}

// =============================================================================
// Insert Validation Tests
// =============================================================================

#[test]
fn test_insert_into_missing_table() {
    let db = setup();
    let err = db
        .insert_row("nothing", &row(&[("name", "x".into())]))
        .unwrap_err();
    assert!(matches!(err, DbError::TableNotFound(_)));
}

#[test]
fn test_missing_required_column_names_column() {
    let db = setup();
    let err = db.insert_row("items", &row(&[("qty", 1.into())])).unwrap_err();
    match err {
        DbError::MissingRequiredColumn { column, .. } => assert_eq!(column, "name"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(db.count_rows("items").unwrap(), 0);
}

#[test]
fn test_fractional_int_reports_real() {
    let db = setup();
    let err = db
        .insert_row("items", &row(&[("name", "x".into()), ("qty", 2.5.into())]))
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_COLUMN_TYPE");
    assert!(err.to_string().contains("expected int, got real"));
    assert_eq!(db.count_rows("items").unwrap(), 0);
}

#[test]
fn test_type_mismatches_rejected() {
    let db = setup();
    let cases = [
        ("active", Value::from("yes")),
        ("price", Value::from("9.99")),
        ("created", Value::from("2024-01-01T00:00:00Z")),
        ("meta", Value::from(json!([1]))),
        ("tags", Value::from(json!({"a": 1}))),
        ("name", Value::from(5)),
    ];

    for (column, value) in cases {
        let mut r = row(&[("name", "x".into())]);
        r.insert(column.to_string(), value);
        let err = db.insert_row("items", &r).unwrap_err();
        assert!(
            matches!(err, DbError::InvalidColumnType { column: ref c, .. } if c == column),
            "column {column}: {err}"
        );
    }
    assert_eq!(db.count_rows("items").unwrap(), 0);
}

#[test]
fn test_out_of_range_real_rejected_for_int() {
    let db = setup();
    for qty in [1e20, -1e20, 9_223_372_036_854_775_808.0] {
        let err = db
            .insert_row("items", &row(&[("name", "x".into()), ("qty", qty.into())]))
            .unwrap_err();
        assert!(err.to_string().contains("expected int, got real"), "{qty}: {err}");
    }
    assert_eq!(db.count_rows("items").unwrap(), 0);
}

#[test]
fn test_non_finite_real_rejected() {
    let db = setup();
    for price in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = db
            .insert_row("items", &row(&[("name", "x".into()), ("price", price.into())]))
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidColumnType { ref column, .. } if column == "price"));
    }
    assert_eq!(db.count_rows("items").unwrap(), 0);
}

#[test]
fn test_integral_real_stored_as_int() {
    let db = setup();
    db.insert_row("items", &row(&[("name", "x".into()), ("qty", 4.0.into())]))
        .unwrap();
    let rows = db.get_all("items").unwrap();
    assert_eq!(rows[0]["qty"], Value::Integer(4));
}

#[test]
fn test_undeclared_keys_and_identifier_ignored() {
    let db = setup();
    let id = db
        .insert_row(
            "items",
            &row(&[("id", 99.into()), ("name", "x".into()), ("colour", "red".into())]),
        )
        .unwrap();
    assert_eq!(id, 1);

    let rows = db.get_all("items").unwrap();
    assert_eq!(rows[0]["id"], Value::Integer(1));
    assert!(!rows[0].contains_key("colour"));
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

#[test]
fn test_object_round_trip() {
    let db = setup();
    let mut r = row(&[("name", "x".into())]);
    r.insert("meta".into(), Value::from(json!({"hello": "world"})));
    db.insert_row("items", &r).unwrap();

    let rows = db.get_all("items").unwrap();
    assert_eq!(rows[0]["meta"].to_json(), json!({"hello": "world"}));
    assert!(rows[0]["meta"].as_object().is_some());
}

#[test]
fn test_array_round_trip() {
    let db = setup();
    let mut r = row(&[("name", "x".into())]);
    r.insert("tags".into(), Value::from(json!([1, 2, 3])));
    db.insert_row("items", &r).unwrap();

    let rows = db.get_all("items").unwrap();
    assert_eq!(rows[0]["tags"], Value::Array(vec![json!(1), json!(2), json!(3)]));
}

#[test]
fn test_scalar_round_trip() {
    let db = setup();
    let created = Utc.with_ymd_and_hms(2024, 3, 15, 9, 45, 30).unwrap();
    db.insert_row(
        "items",
        &row(&[
            ("name", "widget".into()),
            ("active", true.into()),
            ("qty", 12.into()),
            ("price", 19.5.into()),
            ("created", created.into()),
        ]),
    )
    .unwrap();

    let r = &db.get_all("items").unwrap()[0];
    assert_eq!(r["name"], Value::from("widget"));
    assert_eq!(r["active"], Value::Bool(true));
    assert_eq!(r["qty"], Value::Integer(12));
    assert_eq!(r["price"], Value::Real(19.5));
    assert_eq!(r["created"], Value::Timestamp(created));
}

#[test]
fn test_date_keeps_nanoseconds() {
    let db = setup();
    let created = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
    db.insert_row("items", &row(&[("name", "x".into()), ("created", created.into())]))
        .unwrap();

    let r = &db.get_all("items").unwrap()[0];
    assert_eq!(r["created"], Value::Timestamp(created));
}

#[test]
fn test_dates_sort_chronologically() {
    let db = setup();
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    for (name, offset_ms) in [("late", 1_500), ("early", 0), ("mid", 500)] {
        let created = base + chrono::Duration::milliseconds(offset_ms);
        db.insert_row("items", &row(&[("name", name.into()), ("created", created.into())]))
            .unwrap();
    }

    let rows = db
        .get_table("items", &TableQuery::new().with_sort(SortSpec::asc("created")))
        .unwrap();
    let names: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["early", "mid", "late"]);
}

#[test]
fn test_absent_values_read_as_null() {
    let db = setup();
    db.insert_row("items", &row(&[("name", "bare".into())])).unwrap();

    let r = &db.get_all("items").unwrap()[0];
    for column in ["active", "qty", "price", "created", "meta", "tags"] {
        assert!(r[column].is_null(), "{column} should be null");
    }
}

#[test]
fn test_json_row_input() {
    let db = setup();
    db.insert_row(
        "items",
        &row_from_json(json!({"name": "from-json", "qty": 3, "price": 1, "tags": ["a"]})),
    )
    .unwrap();

    let r = &db.get_all("items").unwrap()[0];
    assert_eq!(r["price"], Value::Real(1.0));
    assert_eq!(r["tags"], Value::Array(vec![json!("a")]));
}

// =============================================================================
// Read Tests
// =============================================================================

#[test]
fn test_default_read_orders_by_identifier() {
    let db = setup();
    seed(&db);

    let rows = db.get_all("items").unwrap();
    let ids: Vec<_> = rows.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(rows[0].keys().next().map(String::as_str), Some("id"));
    assert_eq!(rows[0].len(), 8);
}

#[test]
fn test_projection_keeps_identifier_first() {
    let db = setup();
    seed(&db);

    let rows = db
        .get_table("items", &TableQuery::new().with_columns(["qty", "name"]))
        .unwrap();
    let keys: Vec<_> = rows[0].keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["id", "qty", "name"]);
}

#[test]
fn test_projection_of_identifier() {
    let db = setup();
    seed(&db);

    let rows = db
        .get_table("items", &TableQuery::new().with_columns(["id", "name"]))
        .unwrap();
    let keys: Vec<_> = rows[0].keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["id", "name"]);

    let rows = db
        .get_table("items", &TableQuery::new().with_columns(["id"]))
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].len(), 1);
}

#[test]
fn test_sort_and_limit() {
    let db = setup();
    seed(&db);

    let rows = db
        .get_table(
            "items",
            &TableQuery::new().with_sort(SortSpec::desc("qty")).with_limit(2),
        )
        .unwrap();
    let names: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["apple", "fig"]);

    let rows = db
        .get_table("items", &TableQuery::new().with_sort(SortSpec::asc("name")))
        .unwrap();
    let names: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["apple", "fig", "pear"]);
}

#[test]
fn test_sort_by_identifier_descending() {
    let db = setup();
    seed(&db);

    let rows = db
        .get_table("items", &TableQuery::new().with_sort(SortSpec::desc("id")))
        .unwrap();
    assert_eq!(rows[0]["id"], Value::Integer(3));
}

#[test]
fn test_invalid_limit() {
    let db = setup();
    for limit in [0, -1] {
        let err = db
            .get_table("items", &TableQuery::new().with_limit(limit))
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidLimit(l) if l == limit));
    }
}

#[test]
fn test_unknown_column_lists_available() {
    let db = setup();
    let err = db
        .get_table("items", &TableQuery::new().with_columns(["name", "colour"]))
        .unwrap_err();
    assert_eq!(err.code(), "UNKNOWN_COLUMN");

    let message = err.to_string();
    assert!(message.contains("'colour'"));
    for listed in [
        "id (int)",
        "name (string)",
        "active (boolean)",
        "qty (int)",
        "price (real)",
        "created (date)",
        "meta (object)",
        "tags (array)",
    ] {
        assert!(message.contains(listed), "missing {listed} in {message}");
    }
}

#[test]
fn test_unknown_sort_column() {
    let db = setup();
    let err = db
        .get_table("items", &TableQuery::new().with_sort(SortSpec::asc("weight")))
        .unwrap_err();
    assert!(matches!(err, DbError::UnknownColumn { ref columns, .. } if columns == &["weight"]));
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_existing_row() {
    let db = setup();
    seed(&db);
    let before = db.count_rows("items").unwrap();

    db.delete_row_by_id("items", 2).unwrap();

    assert_eq!(db.count_rows("items").unwrap(), before - 1);
    let ids: Vec<_> = db
        .get_all("items")
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn test_delete_missing_row() {
    let db = setup();
    seed(&db);

    let err = db.delete_row_by_id("items", 42).unwrap_err();
    assert!(matches!(err, DbError::RowNotFound { id: 42, .. }));
    assert_eq!(db.count_rows("items").unwrap(), 3);

    db.delete_row_by_id("items", 1).unwrap();
    assert!(matches!(
        db.delete_row_by_id("items", 1),
        Err(DbError::RowNotFound { .. })
    ));
}

#[test]
fn test_identifiers_not_reused_after_delete() {
    let db = setup();
    seed(&db);
    db.delete_row_by_id("items", 3).unwrap();

    let id = db.insert_row("items", &row(&[("name", "kiwi".into())])).unwrap();
    assert_eq!(id, 4);
}

// =============================================================================
// Batch Insert Tests
// =============================================================================

#[test]
fn test_insert_rows_partial_completion() {
    let db = setup();
    let rows = vec![
        row(&[("name", "a".into())]),
        row(&[("name", "b".into())]),
        row(&[("qty", 1.into())]),
        row(&[("name", "d".into())]),
    ];

    let err = db.insert_rows("items", &rows).unwrap_err();
    assert!(matches!(err, DbError::MissingRequiredColumn { .. }));
    assert_eq!(db.count_rows("items").unwrap(), 2);
}

#[test]
fn test_batch_insert_into_missing_table() {
    let db = setup();
    assert!(matches!(
        db.insert_rows("missing", &[]),
        Err(DbError::TableNotFound(ref t)) if t == "missing"
    ));

    let entries: Vec<(&str, Row)> = vec![("missing", row(&[]))];
    assert!(matches!(
        db.insert_rows_each(&entries[..0]),
        Ok(ref ids) if ids.is_empty()
    ));
    assert!(matches!(
        db.insert_rows_each(&entries),
        Err(DbError::TableNotFound(_))
    ));
}

#[test]
fn test_insert_rows_returns_identifiers() {
    let db = setup();
    let ids = db
        .insert_rows(
            "items",
            &[row(&[("name", "a".into())]), row(&[("name", "b".into())])],
        )
        .unwrap();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn test_insert_rows_atomic_all_or_nothing() {
    let db = setup();
    let rows = vec![
        row(&[("name", "a".into())]),
        row(&[("name", "b".into()), ("qty", 1.5.into())]),
    ];

    assert!(db.insert_rows_atomic("items", &rows).is_err());
    assert_eq!(db.count_rows("items").unwrap(), 0);

    let ids = db.insert_rows_atomic("items", &rows[..1]).unwrap();
    assert_eq!(ids, vec![1]);
}

#[test]
fn test_insert_rows_each_targets_tables() {
    let db = setup();
    db.create_table(TableModel::new("notes", vec![ColumnModel::string("body").required()]))
        .unwrap();

    let entries = vec![
        ("items", row(&[("name", "a".into())])),
        ("notes", row(&[("body", "hello".into())])),
        ("missing", row(&[])),
        ("notes", row(&[("body", "never".into())])),
    ];

    // Table lookups happen before any insert
    let err = db.insert_rows_each(&entries).unwrap_err();
    assert!(matches!(err, DbError::TableNotFound(ref t) if t == "missing"));
    assert_eq!(db.count_rows("items").unwrap(), 0);
    assert_eq!(db.count_rows("notes").unwrap(), 0);

    // A validation failure mid-batch keeps the rows before it
    let entries = vec![
        ("items", row(&[("name", "a".into())])),
        ("notes", row(&[("body", "hello".into())])),
        ("notes", row(&[])),
        ("items", row(&[("name", "never".into())])),
    ];
    let err = db.insert_rows_each(&entries).unwrap_err();
    assert!(matches!(err, DbError::MissingRequiredColumn { .. }));
    assert_eq!(db.count_rows("items").unwrap(), 1);
    assert_eq!(db.count_rows("notes").unwrap(), 1);
}
