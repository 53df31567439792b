use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};

use crate::analyzer::QueryAnalyzer;
use crate::error::{Result, StoreError};
use crate::params::{Param, Params};
use crate::returning::Returning;
use crate::row::Row;
use crate::statement::{self, Mutation, StatementKind};

/// Connection settings for [`Database::connect`].
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    /// SQLite file path, or `:memory:`.
    pub path: String,
    /// Enables the query analyzer.
    pub debug: bool,
    pub slow_query_threshold: Duration,
}

impl DatabaseOptions {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn in_memory() -> Self {
        Self::new(":memory:")
    }
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            path: "data.db".to_string(),
            debug: false,
            slow_query_threshold: Duration::from_millis(100),
        }
    }
}

/// Result of a single statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Rows returned by a `SELECT`, `WITH` or `PRAGMA`.
    Rows(Vec<Row>),
    /// Effect of any other statement.
    Changes {
        rows_affected: u64,
        last_insert_id: i64,
    },
}

impl QueryOutcome {
    pub fn into_rows(self) -> Result<Vec<Row>> {
        match self {
            QueryOutcome::Rows(rows) => Ok(rows),
            QueryOutcome::Changes { .. } => Err(StoreError::UnexpectedOutcome("rows")),
        }
    }

    /// Returns `(rows_affected, last_insert_id)`.
    pub fn into_changes(self) -> Result<(u64, i64)> {
        match self {
            QueryOutcome::Changes {
                rows_affected,
                last_insert_id,
            } => Ok((rows_affected, last_insert_id)),
            QueryOutcome::Rows(_) => Err(StoreError::UnexpectedOutcome("changes")),
        }
    }
}

/// Handle to the embedded SQLite store.
///
/// Cloning is cheap; all clones share one pooled connection and one
/// [`QueryAnalyzer`].
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    analyzer: Arc<QueryAnalyzer>,
}

impl Database {
    /// Opens the store described by `options`. Migrations are not applied.
    pub async fn connect(options: &DatabaseOptions) -> Result<Self> {
        let connect = if options.path == ":memory:" {
            SqliteConnectOptions::from_str("sqlite::memory:")?
        } else {
            SqliteConnectOptions::new()
                .filename(&options.path)
                .create_if_missing(true)
        };
        let connect = connect.foreign_keys(true);

        // A single long-lived connection keeps in-memory databases alive and
        // serialises writers.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(connect)
            .await?;

        tracing::info!(path = %options.path, debug = options.debug, "Connected to store");

        Ok(Self::from_pool(
            pool,
            QueryAnalyzer::new(options.debug, options.slow_query_threshold),
        ))
    }

    /// Opens a fresh in-memory store with migrations applied.
    pub async fn connect_in_memory() -> Result<Self> {
        let db = Self::connect(&DatabaseOptions::in_memory()).await?;
        db.run_migrations().await?;
        Ok(db)
    }

    pub fn from_pool(pool: SqlitePool, analyzer: QueryAnalyzer) -> Self {
        Self {
            pool,
            analyzer: Arc::new(analyzer),
        }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn analyzer(&self) -> &QueryAnalyzer {
        &self.analyzer
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Runs one statement with `$name` parameters.
    ///
    /// Statements carrying `RETURNING` are rejected; use
    /// [`query_returning`](Self::query_returning).
    pub async fn query(&self, sql: &str, params: &Params) -> Result<QueryOutcome> {
        if statement::has_returning(sql) {
            return Err(StoreError::ReturningNotAllowed);
        }
        let mut conn = self.pool.acquire().await?;
        execute_on(&self.analyzer, &mut conn, sql, params).await
    }

    pub async fn fetch_all(&self, sql: &str, params: &Params) -> Result<Vec<Row>> {
        self.query(sql, params).await?.into_rows()
    }

    pub async fn fetch_optional(&self, sql: &str, params: &Params) -> Result<Option<Row>> {
        Ok(self.fetch_all(sql, params).await?.into_iter().next())
    }

    /// Runs a mutation and returns the number of rows it changed.
    pub async fn execute(&self, sql: &str, params: &Params) -> Result<u64> {
        let (rows_affected, _) = self.query(sql, params).await?.into_changes()?;
        Ok(rows_affected)
    }

    /// Runs an `INSERT` or `UPDATE` against `R::TABLE` and returns the
    /// resulting row.
    ///
    /// Returns `Ok(None)` when no row changed. The statement runs in its own
    /// transaction, which is rolled back on zero changes or any failure.
    pub async fn query_returning<R: Returning>(
        &self,
        sql: &str,
        params: &Params,
    ) -> Result<Option<Row>> {
        let sql = statement::strip_returning(sql);
        let (mutation, table) = statement::mutation_target(sql).ok_or(StoreError::NotAMutation)?;
        if table != R::TABLE {
            return Err(StoreError::TableMismatch {
                expected: R::TABLE,
                found: table,
            });
        }

        let mut tx = self.pool.begin().await?;
        let outcome = returning_on::<R>(&self.analyzer, &mut tx, mutation, sql, params).await;

        match outcome {
            Ok(Some(row)) => {
                tx.commit().await?;
                Ok(Some(row))
            }
            Ok(None) => {
                tx.rollback().await?;
                Ok(None)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Opens an explicit transaction.
    pub async fn begin(&self) -> Result<DbTransaction> {
        let tx = self.pool.begin().await?;
        Ok(DbTransaction {
            tx,
            analyzer: Arc::clone(&self.analyzer),
        })
    }

    /// Checks the store answers a trivial query.
    pub async fn ping(&self) -> Result<()> {
        self.query("SELECT 1", &Params::new()).await?;
        Ok(())
    }
}

/// An open transaction. Dropping it without [`commit`](Self::commit) rolls
/// it back.
pub struct DbTransaction {
    tx: Transaction<'static, Sqlite>,
    analyzer: Arc<QueryAnalyzer>,
}

impl DbTransaction {
    pub async fn query(&mut self, sql: &str, params: &Params) -> Result<QueryOutcome> {
        if statement::has_returning(sql) {
            return Err(StoreError::ReturningNotAllowed);
        }
        execute_on(&self.analyzer, &mut self.tx, sql, params).await
    }

    pub async fn fetch_all(&mut self, sql: &str, params: &Params) -> Result<Vec<Row>> {
        self.query(sql, params).await?.into_rows()
    }

    pub async fn fetch_optional(&mut self, sql: &str, params: &Params) -> Result<Option<Row>> {
        Ok(self.fetch_all(sql, params).await?.into_iter().next())
    }

    /// Runs a mutation, returning `(rows_affected, last_insert_id)`.
    pub async fn execute(&mut self, sql: &str, params: &Params) -> Result<(u64, i64)> {
        self.query(sql, params).await?.into_changes()
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

async fn returning_on<R: Returning>(
    analyzer: &QueryAnalyzer,
    conn: &mut SqliteConnection,
    mutation: Mutation,
    sql: &str,
    params: &Params,
) -> Result<Option<Row>> {
    let (rows_affected, last_insert_id) = execute_on(analyzer, conn, sql, params)
        .await?
        .into_changes()?;
    if rows_affected == 0 {
        return Ok(None);
    }

    let key = match mutation {
        Mutation::Insert => Param::Int(last_insert_id),
        Mutation::Update => params
            .get("id")
            .cloned()
            .ok_or(StoreError::MissingKey { table: R::TABLE })?,
    };

    let select = format!("SELECT * FROM {} WHERE {} = $key", R::TABLE, R::PRIMARY_KEY);
    let rows = execute_on(analyzer, conn, &select, &Params::new().with("key", key))
        .await?
        .into_rows()?;

    Ok(rows.into_iter().next())
}

async fn execute_on(
    analyzer: &QueryAnalyzer,
    conn: &mut SqliteConnection,
    sql: &str,
    params: &Params,
) -> Result<QueryOutcome> {
    let (positional, values) = statement::bind_named(sql, params)?;
    let mut query = sqlx::query(&positional);
    for value in &values {
        query = value.bind_to(query);
    }

    let started = Instant::now();
    let result = match StatementKind::of(sql) {
        StatementKind::Read => query.fetch_all(&mut *conn).await.and_then(|rows| {
            rows.iter()
                .map(Row::from_sqlite)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(QueryOutcome::Rows)
        }),
        StatementKind::Write => {
            query
                .execute(&mut *conn)
                .await
                .map(|done| QueryOutcome::Changes {
                    rows_affected: done.rows_affected(),
                    last_insert_id: done.last_insert_rowid(),
                })
        }
    };
    let elapsed = started.elapsed();

    metrics::counter!("store_queries_total").increment(1);
    metrics::histogram!("store_query_duration_seconds").record(elapsed.as_secs_f64());

    match result {
        Ok(outcome) => {
            let row_count = match &outcome {
                QueryOutcome::Rows(rows) => rows.len() as u64,
                QueryOutcome::Changes { rows_affected, .. } => *rows_affected,
            };
            tracing::debug!(
                sql,
                duration_ms = elapsed.as_secs_f64() * 1000.0,
                row_count,
                "Query completed"
            );
            analyzer.record(sql, elapsed);
            Ok(outcome)
        }
        Err(err) => {
            tracing::error!(sql, error = %err, "Query failed");
            Err(err.into())
        }
    }
}
