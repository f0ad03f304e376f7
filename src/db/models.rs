//! Row types decoded from the cohort queries.
//!
//! Metric columns are `NUMERIC` and are read through `CAST(... AS TEXT)` so
//! they can be parsed into `BigDecimal` without a lossy float round-trip.

use std::str::FromStr;

use bigdecimal::BigDecimal;

#[derive(Debug, sqlx::FromRow)]
pub struct RankedRow {
    pub stock_symbol: String,
    pub company_name: String,
    pub sector_name: String,
    pub country_name: String,
    pub metric_value: Option<String>,
    pub year: i64,
    pub quarter: i64,
    pub report_type: String,
    pub rank: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompanyCohortRow {
    pub company_id: i64,
    pub stock_symbol: String,
    pub company_name: String,
    pub sector_name: String,
    pub country_name: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct MetricRankRow {
    pub value: Option<String>,
    pub rank: i64,
    pub total_count: i64,
}

/// Parses a textual NUMERIC into a decimal. `None` stays `None`.
pub fn parse_decimal(raw: Option<&str>) -> Result<Option<BigDecimal>, sqlx::Error> {
    raw.map(|s| BigDecimal::from_str(s.trim()).map_err(|e| sqlx::Error::Decode(Box::new(e))))
        .transpose()
}
