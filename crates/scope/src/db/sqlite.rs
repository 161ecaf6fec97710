use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
    Row,
};
use std::{future::Future, path::Path, str::FromStr, time::Duration};
use time::{Date, OffsetDateTime, Time};
use tokio::{
    fs::create_dir_all,
    sync::{mpsc, oneshot},
};

use super::{from_unix_millis, to_unix_millis, DailySummary, ObservationRecord, StoreStats};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to query sqlite: {0}")]
    Query(#[from] sqlx::Error),
    #[error("failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("stored timestamp out of range: {0}")]
    Time(#[from] time::error::ComponentRange),
    #[error("failed to create database directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("database writer channel closed")]
    WriterClosed,
}

type WriteOperation = std::pin::Pin<Box<dyn Future<Output = ()> + Send>>;

/// Serializes all writes through one background task so SQLite never sees
/// two concurrent write transactions.
pub struct DatabaseWriter {
    write_tx: mpsc::UnboundedSender<WriteOperation>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Default for DatabaseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseWriter {
    pub fn new() -> Self {
        let (write_tx, mut write_rx) = mpsc::unbounded_channel::<WriteOperation>();

        let handle = tokio::spawn(async move {
            while let Some(future) = write_rx.recv().await {
                future.await;
            }
        });

        Self {
            write_tx,
            _handle: handle,
        }
    }

    pub async fn execute<T, F, Fut>(&self, pool: SqlitePool, operation: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(SqlitePool) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel::<Result<T, Error>>();

        let write_op = Box::pin(async move {
            let result = operation(pool).await;
            let _ = result_tx.send(result);
        });

        self.write_tx
            .send(write_op)
            .map_err(|_| Error::WriterClosed)?;

        result_rx.await.map_err(|_| Error::WriterClosed)?
    }
}

pub struct Database {
    pool: SqlitePool,
    writer: DatabaseWriter,
}

impl Database {
    pub async fn new(data_dir: &str) -> Result<Self, Error> {
        let db_path = format!("{}/swellscope.db", data_dir);

        if let Some(parent) = Path::new(&db_path).parent() {
            create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path))?
            .create_if_missing(true)
            .pragma("journal_mode", "WAL")
            .pragma("synchronous", "NORMAL")
            .pragma("busy_timeout", "5000")
            .pragma("foreign_keys", "ON")
            .pragma("temp_store", "MEMORY");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        let db = Self {
            pool,
            writer: DatabaseWriter::new(),
        };

        db.run_migrations().await?;
        info!("SQLite database initialized at: {}", db_path);

        Ok(db)
    }

    /// In-memory database, used by the test suites. A single pooled
    /// connection keeps the database alive for the pool's lifetime.
    pub async fn in_memory() -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self {
            pool,
            writer: DatabaseWriter::new(),
        };

        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Check database connectivity and page integrity.
    pub async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;

        let result: String = sqlx::query_scalar("PRAGMA quick_check;")
            .fetch_one(&self.pool)
            .await?;
        if result != "ok" {
            return Err(Error::Query(sqlx::Error::Protocol(format!(
                "integrity check failed: {}",
                result
            ))));
        }

        Ok(())
    }

    /// Checkpoint WAL to the main database file before shutdown.
    pub async fn checkpoint(&self) {
        match sqlx::query("PRAGMA wal_checkpoint(TRUNCATE);")
            .execute(&self.pool)
            .await
        {
            Ok(_) => info!("WAL checkpoint completed successfully"),
            Err(e) => log::error!("WAL checkpoint failed: {}", e),
        }
    }

    /// Insert a batch of observations in one transaction.
    ///
    /// Rows whose (ts, source, location) already exists are silently skipped
    /// by the unique index, which is what makes re-running a cycle over an
    /// overlapping fetch window idempotent. Returns the count of rows that
    /// were actually inserted.
    pub async fn insert_observations(&self, records: Vec<ObservationRecord>) -> Result<u64, Error> {
        let pool = self.pool.clone();

        self.writer
            .execute(pool, move |pool| async move {
                let mut tx = pool.begin().await?;
                let mut inserted = 0u64;

                for rec in records {
                    let result = sqlx::query(
                        "INSERT INTO observations
                         (ts, hs, tp, dp, sst, air_temp, wind_speed, wind_dir, source, location)
                         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                         ON CONFLICT(ts, source, location) DO NOTHING",
                    )
                    .bind(to_unix_millis(rec.ts))
                    .bind(rec.hs)
                    .bind(rec.tp)
                    .bind(rec.dp)
                    .bind(rec.sst)
                    .bind(rec.air_temp)
                    .bind(rec.wind_speed)
                    .bind(rec.wind_dir)
                    .bind(&rec.source)
                    .bind(&rec.location)
                    .execute(&mut *tx)
                    .await?;

                    inserted += result.rows_affected();
                }

                tx.commit().await?;
                Ok(inserted)
            })
            .await
    }

    /// Insert the fixed synthetic wave samples used for manual testing.
    /// Re-seeding an already-seeded store inserts nothing.
    pub async fn insert_seed_samples(&self, source: &str, location: &str) -> Result<u64, Error> {
        use time::macros::datetime;

        let samples: Vec<ObservationRecord> = [
            (datetime!(2025-08-24 00:00:00 UTC), 1.6, 12.0, 180.0),
            (datetime!(2025-08-24 01:00:00 UTC), 1.7, 13.0, 185.0),
            (datetime!(2025-08-24 02:00:00 UTC), 1.5, 11.0, 190.0),
        ]
        .into_iter()
        .map(|(ts, hs, tp, dp)| ObservationRecord {
            hs: Some(hs),
            tp: Some(tp),
            dp: Some(dp),
            ..ObservationRecord::empty(ts, source, location)
        })
        .collect();

        self.insert_observations(samples).await
    }

    /// Remove redundant rows sharing a natural key, keeping the lowest id.
    ///
    /// The unique index prevents new duplicates; the sweep heals rows that
    /// predate it (for example a hand-seeded database). Committed separately
    /// from the insert phase.
    pub async fn dedup_sweep(&self) -> Result<u64, Error> {
        let pool = self.pool.clone();

        self.writer
            .execute(pool, move |pool| async move {
                let result = sqlx::query(
                    "DELETE FROM observations
                     WHERE id NOT IN (
                         SELECT MIN(id) FROM observations
                         GROUP BY ts, source, location
                     )",
                )
                .execute(&pool)
                .await?;

                Ok(result.rows_affected())
            })
            .await
    }

    /// Observations with ts in [start, end] (end optional), ascending.
    pub async fn observations_in_range(
        &self,
        start: OffsetDateTime,
        end: Option<OffsetDateTime>,
    ) -> Result<Vec<ObservationRecord>, Error> {
        let rows = match end {
            Some(end) => {
                sqlx::query(
                    "SELECT ts, hs, tp, dp, sst, air_temp, wind_speed, wind_dir, source, location
                     FROM observations
                     WHERE ts >= ? AND ts <= ?
                     ORDER BY ts ASC",
                )
                .bind(to_unix_millis(start))
                .bind(to_unix_millis(end))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT ts, hs, tp, dp, sst, air_temp, wind_speed, wind_dir, source, location
                     FROM observations
                     WHERE ts >= ?
                     ORDER BY ts ASC",
                )
                .bind(to_unix_millis(start))
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(row_to_record).collect()
    }

    /// Per-field means over one UTC day for one source. `None` when no rows
    /// match; within a summary, a field whose values are all null stays null
    /// (SQLite AVG already excludes nulls).
    pub async fn daily_summary(
        &self,
        day: Date,
        source: &str,
    ) -> Result<Option<DailySummary>, Error> {
        let day_start = day.with_time(Time::MIDNIGHT).assume_utc();
        let day_end = day_start + time::Duration::days(1);

        let row = sqlx::query(
            "SELECT COUNT(*) AS n,
                    ROUND(AVG(hs), 2) AS hs_avg,
                    ROUND(AVG(tp), 2) AS tp_avg,
                    ROUND(AVG(dp), 2) AS dp_avg,
                    ROUND(AVG(sst), 2) AS sst_avg,
                    ROUND(AVG(air_temp), 2) AS air_temp_avg,
                    ROUND(AVG(wind_speed), 2) AS wind_speed_avg,
                    ROUND(AVG(wind_dir), 2) AS wind_dir_avg
             FROM observations
             WHERE ts >= ? AND ts < ? AND source = ?",
        )
        .bind(to_unix_millis(day_start))
        .bind(to_unix_millis(day_end))
        .bind(source)
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.get("n");
        if count == 0 {
            return Ok(None);
        }

        Ok(Some(DailySummary {
            date: day.to_string(),
            hs_avg: row.get("hs_avg"),
            tp_avg: row.get("tp_avg"),
            dp_avg: row.get("dp_avg"),
            sst_avg: row.get("sst_avg"),
            air_temp_avg: row.get("air_temp_avg"),
            wind_speed_avg: row.get("wind_speed_avg"),
            wind_dir_avg: row.get("wind_dir_avg"),
        }))
    }

    /// Total row count plus the most recent record.
    pub async fn stats(&self) -> Result<StoreStats, Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM observations")
            .fetch_one(&self.pool)
            .await?;

        let last = sqlx::query(
            "SELECT ts, hs, tp, dp, sst, air_temp, wind_speed, wind_dir, source, location
             FROM observations
             ORDER BY ts DESC
             LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        let last = match last {
            Some(ref row) => Some(row_to_record(row)?),
            None => None,
        };

        Ok(StoreStats { count, last })
    }
}

fn row_to_record(row: &SqliteRow) -> Result<ObservationRecord, Error> {
    let ts_ms: i64 = row.get("ts");

    Ok(ObservationRecord {
        ts: from_unix_millis(ts_ms)?,
        hs: row.get("hs"),
        tp: row.get("tp"),
        dp: row.get("dp"),
        sst: row.get("sst"),
        air_temp: row.get("air_temp"),
        wind_speed: row.get("wind_speed"),
        wind_dir: row.get("wind_dir"),
        source: row.get("source"),
        location: row.get("location"),
    })
}
