//! Store shim integration tests against an in-memory SQLite database.

use std::time::Duration;

use store::{
    Database, DatabaseOptions, Param, Params, QueryAnalyzer, QueryOutcome, Returning, StoreError,
    params,
};

struct Facilities;

impl Returning for Facilities {
    const TABLE: &'static str = "facilities";
    const PRIMARY_KEY: &'static str = "facility_id";
}

struct Modes;

impl Returning for Modes {
    const TABLE: &'static str = "transportation_modes";
    const PRIMARY_KEY: &'static str = "mode_id";
}

async fn facility_count(db: &Database) -> i64 {
    db.fetch_optional("SELECT COUNT(*) AS n FROM facilities", &Params::new())
        .await
        .unwrap()
        .and_then(|row| row.get_i64("n"))
        .unwrap()
}

#[tokio::test]
async fn test_select_returns_rows_keyed_by_column() {
    let db = Database::connect_in_memory().await.unwrap();
    db.execute(
        "INSERT INTO facilities (name, description) VALUES ($name, $description)",
        &params! { "name" => "AC", "description" => None::<String> },
    )
    .await
    .unwrap();

    let outcome = db
        .query("SELECT * FROM facilities WHERE name = $name", &params! { "name" => "AC" })
        .await
        .unwrap();

    let QueryOutcome::Rows(rows) = outcome else {
        panic!("expected rows");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name").and_then(|v| v.as_str()), Some("AC"));
    assert!(rows[0].get("description").unwrap().is_null());
    assert!(rows[0].get("created_at").unwrap().is_string());
}

#[tokio::test]
async fn test_write_reports_changes() {
    let db = Database::connect_in_memory().await.unwrap();
    let outcome = db
        .query(
            "INSERT INTO facilities (name) VALUES ($name)",
            &params! { "name" => "Tracking" },
        )
        .await
        .unwrap();

    assert_eq!(
        outcome,
        QueryOutcome::Changes {
            rows_affected: 1,
            last_insert_id: 1
        }
    );
}

#[tokio::test]
async fn test_missing_parameter_fails_before_execution() {
    let db = Database::connect_in_memory().await.unwrap();
    let err = db
        .query(
            "INSERT INTO facilities (name, description) VALUES ($name, $description)",
            &params! { "name" => "AC" },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::MissingParameter(name) if name == "description"));
    assert_eq!(facility_count(&db).await, 0);
}

#[tokio::test]
async fn test_plain_query_rejects_returning() {
    let db = Database::connect_in_memory().await.unwrap();
    let err = db
        .query(
            "INSERT INTO facilities (name) VALUES ($name) RETURNING *",
            &params! { "name" => "AC" },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::ReturningNotAllowed));
    assert_eq!(facility_count(&db).await, 0);
}

#[tokio::test]
async fn test_returning_insert_yields_created_row() {
    let db = Database::connect_in_memory().await.unwrap();
    let row = db
        .query_returning::<Facilities>(
            "INSERT INTO facilities (name, description) VALUES ($name, $description) RETURNING *",
            &params! { "name" => "Asuransi", "description" => "Perlindungan" },
        )
        .await
        .unwrap()
        .expect("row");

    assert_eq!(row.get_i64("facility_id"), Some(1));
    assert_eq!(row.get("name").and_then(|v| v.as_str()), Some("Asuransi"));
}

#[tokio::test]
async fn test_returning_update_uses_id_parameter() {
    let db = Database::connect_in_memory().await.unwrap();
    db.execute("INSERT INTO facilities (name) VALUES ('AC')", &Params::new())
        .await
        .unwrap();

    let row = db
        .query_returning::<Facilities>(
            "UPDATE facilities SET name = $name WHERE facility_id = $id RETURNING *",
            &params! { "name" => "AC Dingin", "id" => 1_i64 },
        )
        .await
        .unwrap()
        .expect("row");

    assert_eq!(row.get("name").and_then(|v| v.as_str()), Some("AC Dingin"));
}

#[tokio::test]
async fn test_returning_zero_changes_yields_none() {
    let db = Database::connect_in_memory().await.unwrap();
    let row = db
        .query_returning::<Facilities>(
            "UPDATE facilities SET name = $name WHERE facility_id = $id",
            &params! { "name" => "Ghost", "id" => 42_i64 },
        )
        .await
        .unwrap();

    assert!(row.is_none());
}

#[tokio::test]
async fn test_returning_table_mismatch_fails_before_write() {
    let db = Database::connect_in_memory().await.unwrap();
    let err = db
        .query_returning::<Modes>(
            "INSERT INTO facilities (name) VALUES ($name)",
            &params! { "name" => "AC" },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::TableMismatch { expected: "transportation_modes", ref found } if found == "facilities"
    ));
    assert_eq!(facility_count(&db).await, 0);
}

#[tokio::test]
async fn test_returning_update_without_id_rolls_back() {
    let db = Database::connect_in_memory().await.unwrap();
    db.execute("INSERT INTO facilities (name) VALUES ('AC')", &Params::new())
        .await
        .unwrap();

    let err = db
        .query_returning::<Facilities>(
            "UPDATE facilities SET name = $name WHERE facility_id = $key",
            &params! { "name" => "Changed", "key" => 1_i64 },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::MissingKey { table: "facilities" }));
    let row = db
        .fetch_optional("SELECT name FROM facilities WHERE facility_id = 1", &Params::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.get("name").and_then(|v| v.as_str()), Some("AC"));
}

#[tokio::test]
async fn test_returning_constraint_failure_propagates() {
    let db = Database::connect_in_memory().await.unwrap();
    db.execute("INSERT INTO facilities (name) VALUES ('AC')", &Params::new())
        .await
        .unwrap();

    let err = db
        .query_returning::<Facilities>(
            "INSERT INTO facilities (name) VALUES ($name)",
            &params! { "name" => "AC" },
        )
        .await
        .unwrap_err();

    assert!(err.is_unique_violation());
    assert_eq!(facility_count(&db).await, 1);
}

#[tokio::test]
async fn test_foreign_keys_are_enforced() {
    let db = Database::connect_in_memory().await.unwrap();
    let err = db
        .execute(
            "INSERT INTO mode_facilities (mode_id, facility_id) VALUES ($mode, $facility)",
            &params! { "mode" => 99_i64, "facility" => 99_i64 },
        )
        .await
        .unwrap_err();

    assert!(err.is_foreign_key_violation());
}

#[tokio::test]
async fn test_transaction_commit_and_drop() {
    let db = Database::connect_in_memory().await.unwrap();

    let mut tx = db.begin().await.unwrap();
    tx.execute("INSERT INTO facilities (name) VALUES ('AC')", &Params::new())
        .await
        .unwrap();
    tx.commit().await.unwrap();

    {
        let mut tx = db.begin().await.unwrap();
        tx.execute("INSERT INTO facilities (name) VALUES ('Tracking')", &Params::new())
            .await
            .unwrap();
        // dropped without commit
    }

    assert_eq!(facility_count(&db).await, 1);
}

#[tokio::test]
async fn test_ping() {
    let db = Database::connect_in_memory().await.unwrap();
    db.ping().await.unwrap();
}

#[tokio::test]
async fn test_debug_mode_records_query_stats() {
    let options = DatabaseOptions {
        debug: true,
        slow_query_threshold: Duration::from_millis(100),
        ..DatabaseOptions::in_memory()
    };
    let db = Database::connect(&options).await.unwrap();

    db.query("SELECT 1", &Params::new()).await.unwrap();
    db.query("SELECT 1", &Params::new()).await.unwrap();

    let stats = db.analyzer().query_stats();
    assert_eq!(stats["SELECT 1"].count, 2);
}

#[tokio::test]
async fn test_release_mode_records_nothing() {
    let db = Database::connect_in_memory().await.unwrap();
    db.query("SELECT 1", &Params::new()).await.unwrap();
    assert!(db.analyzer().query_stats().is_empty());
    assert!(!db.analyzer().is_enabled());
}

#[tokio::test]
async fn test_null_and_bool_params_bind() {
    let db = Database::connect_in_memory().await.unwrap();
    let rows = db
        .fetch_all(
            "SELECT $flag AS flag, $nothing AS nothing, $ratio AS ratio",
            &Params::new()
                .with("flag", true)
                .with("nothing", Param::Null)
                .with("ratio", 1.5),
        )
        .await
        .unwrap();

    assert_eq!(rows[0].get_i64("flag"), Some(1));
    assert!(rows[0].get("nothing").unwrap().is_null());
    assert_eq!(rows[0].get("ratio").and_then(|v| v.as_f64()), Some(1.5));
}

#[test]
fn test_analyzer_disabled_by_default() {
    assert!(!QueryAnalyzer::disabled().is_enabled());
}
