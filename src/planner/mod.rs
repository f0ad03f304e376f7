//! Read-only cohort queries. Every operation takes an already-validated
//! request, acquires one pooled connection, and releases it on return.

pub mod ranking;
pub mod snapshot;

use std::time::Duration;

use sqlx::SqlitePool;

pub use ranking::RankingResultRow;
pub use snapshot::{CompanySnapshot, MetricOutcome, SnapshotSummary};

#[derive(Clone)]
pub struct CohortPlanner {
    pool: SqlitePool,
    query_timeout: Duration,
}

impl CohortPlanner {
    pub fn new(pool: SqlitePool, query_timeout: Duration) -> Self {
        Self { pool, query_timeout }
    }
}
