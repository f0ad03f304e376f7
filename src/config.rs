use std::time::Duration;

use crate::error::{AppError, Result};

/// Rows per ranked page. `limit` is validated but never changes this window.
pub const PAGE_SIZE: i64 = 30;

/// Highest page whose offset still fits in an `i64`.
pub const MAX_PAGE: i64 = i64::MAX / PAGE_SIZE;

/// Accepted fiscal years, inclusive.
pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2025;

/// Bounds and default for the advisory `limit` query parameter.
pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 1000;
pub const DEFAULT_LIMIT: i64 = 50;

/// Quarter forced on accumulated (annual) reports.
pub const ANNUAL_QUARTER: u8 = 4;

/// Minimum stock symbol length accepted by the snapshot lookup.
pub const MIN_STOCK_SYMBOL_LEN: usize = 3;

/// Backoff between pool acquisition retries, in milliseconds.
/// One retry per entry; exhausting the list surfaces `PoolExhausted`.
pub const POOL_ACQUIRE_BACKOFF_MS: &[u64] = &[50, 100, 200];

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub log_level: String,
    pub api_port: u16,
    /// Upper bound on pooled connections (DB_MAX_CONNECTIONS)
    pub db_max_connections: u32,
    /// Connections kept open while idle (DB_MIN_CONNECTIONS)
    pub db_min_connections: u32,
    /// How long a single acquire waits before timing out (DB_ACQUIRE_TIMEOUT_SECS)
    pub db_acquire_timeout: Duration,
    /// Upper bound on one planner operation (QUERY_TIMEOUT_SECS)
    pub query_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:financials.db".to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "50".to_string())
                .parse::<u32>()
                .unwrap_or(50),
            db_min_connections: std::env::var("DB_MIN_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse::<u32>()
                .unwrap_or(5),
            db_acquire_timeout: Duration::from_secs(
                std::env::var("DB_ACQUIRE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse::<u64>()
                    .unwrap_or(10),
            ),
            query_timeout: Duration::from_secs(
                std::env::var("QUERY_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse::<u64>()
                    .unwrap_or(60),
            ),
        })
    }
}
