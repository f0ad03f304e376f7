use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};
use tracing::warn;

use crate::config::{Config, POOL_ACQUIRE_BACKOFF_MS};
use crate::error::{AppError, Result};

/// Opens the bounded pool shared by every request.
pub async fn connect(cfg: &Config) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&cfg.database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(cfg.db_max_connections)
        .min_connections(cfg.db_min_connections)
        .acquire_timeout(cfg.db_acquire_timeout)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Acquires one pooled connection, retrying pool timeouts on a fixed backoff.
///
/// The connection returns to the pool when dropped, so every exit path of the
/// caller releases it. Errors other than `PoolTimedOut` are not retried.
pub async fn acquire(pool: &SqlitePool) -> Result<PoolConnection<Sqlite>> {
    let mut attempt = 0usize;
    loop {
        match pool.acquire().await {
            Ok(conn) => return Ok(conn),
            Err(sqlx::Error::PoolTimedOut) => match POOL_ACQUIRE_BACKOFF_MS.get(attempt) {
                Some(&backoff_ms) => {
                    attempt += 1;
                    warn!(
                        attempt,
                        backoff_ms,
                        pool_size = pool.size(),
                        "Pool acquire timed out, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
                None => return Err(AppError::PoolExhausted { attempts: attempt + 1 }),
            },
            Err(e) => return Err(e.into()),
        }
    }
}

/// Bounds a store operation. On elapse the inner future is dropped, which
/// aborts the in-flight query and releases its connection.
pub async fn with_deadline<T>(
    limit: Duration,
    op: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(limit, op)
        .await
        .map_err(|_| AppError::QueryTimeout(limit))?
}
