//! Request validation and period normalization.
//!
//! Everything here is pure: no store access happens until a request has
//! passed through `validate_request` or `validate_snapshot_request`.

pub mod period;
pub mod validate;

use thiserror::Error;

use crate::types::{StatementType, StoragePeriod};

pub use period::{
    allowed_periods, compatibility_rules, default_quarter_for, normalize_period, resolve_period,
    CompatibilityRule, ResolvedPeriod,
};
pub use validate::{
    validate_cohort, validate_request, validate_snapshot_request, NormalizedRequest,
    NormalizedSnapshotRequest, RankingRequest, SnapshotRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Unsupported ranking type: {key}. Supported types: {}", .valid.join(", "))]
    UnknownRankingKey { key: String, valid: Vec<&'static str> },

    #[error("Year {0} out of range, expected a year between 1900 and 2025")]
    YearOutOfRange(i32),

    #[error("Quarter {0} out of range, expected a number between 1 and 4")]
    QuarterOutOfRange(i64),

    #[error("quarterly report period requires a quarter (1-4)")]
    MissingQuarter,

    #[error("annual report period only supports quarter 4, got {0}")]
    InvalidAnnualQuarter(i64),

    #[error("Invalid report period: {0}, expected quarterly or annual")]
    InvalidPeriod(String),

    #[error(
        "{statement} does not support {requested} reports. Allowed: {}",
        describe_periods(.allowed)
    )]
    IncompatiblePeriod {
        statement: StatementType,
        requested: StoragePeriod,
        allowed: &'static [StoragePeriod],
    },

    #[error("Invalid sector name: only CJK characters, letters, digits and spaces are allowed")]
    InvalidSectorName,

    #[error("Page {0} out of range, expected a page number between 1 and {max_page}", max_page = crate::config::MAX_PAGE)]
    PageOutOfRange(i64),

    #[error("Limit {0} out of range, expected a number between 1 and 1000")]
    LimitOutOfRange(i64),

    #[error("Invalid stock symbol: expected at least 3 letters or digits")]
    InvalidStockSymbol,

    #[error("statement_type must be one of cash_flow, income_statement, balance_sheet; got {0}")]
    InvalidStatementType(String),
}

fn describe_periods(periods: &[StoragePeriod]) -> String {
    periods
        .iter()
        .map(|p| format!("{p} ({})", p.user_period()))
        .collect::<Vec<_>>()
        .join(", ")
}
