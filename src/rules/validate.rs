use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::catalog::{self, CatalogEntry};
use crate::config::{
    DEFAULT_LIMIT, MAX_LIMIT, MAX_PAGE, MAX_YEAR, MIN_LIMIT, MIN_STOCK_SYMBOL_LEN, MIN_YEAR,
    PAGE_SIZE,
};
use crate::rules::{resolve_period, ValidationError};
use crate::types::{StatementType, StoragePeriod, UserPeriod};

static SECTOR_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\x{4e00}-\x{9fa5}a-zA-Z0-9\s]+$").expect("sector name pattern is valid")
});

static STOCK_SYMBOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("stock symbol pattern is valid"));

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// Raw ranking query as received. Also used, minus `page`/`limit`, for the count.
#[derive(Debug, Clone, Deserialize)]
pub struct RankingRequest {
    #[serde(rename = "ranking_type")]
    pub ranking_key: String,
    pub year: i32,
    #[serde(rename = "report_type")]
    pub report_period: String,
    pub quarter: Option<i64>,
    pub sector_name: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Clone)]
pub struct NormalizedRequest {
    pub entry: &'static CatalogEntry,
    pub year: i32,
    pub user_period: UserPeriod,
    pub storage_period: StoragePeriod,
    pub quarter: u8,
    pub sector_name: Option<String>,
    pub page: i64,
    /// Advisory only; echoed back but never changes the page window.
    pub limit: i64,
}

impl NormalizedRequest {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(PAGE_SIZE)
    }
}

fn check_year(year: i32) -> Result<(), ValidationError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(ValidationError::YearOutOfRange(year))
    }
}

/// Checks 1 through 6: everything that shapes the cohort predicate.
pub fn validate_cohort(req: &RankingRequest) -> Result<NormalizedRequest, ValidationError> {
    let entry = catalog::lookup(&req.ranking_key).ok_or_else(|| {
        ValidationError::UnknownRankingKey {
            key: req.ranking_key.clone(),
            valid: catalog::ranking_keys(),
        }
    })?;

    check_year(req.year)?;

    let period = resolve_period(entry.statement_type, &req.report_period, req.quarter)?;

    // An empty sector name means "no filter".
    let sector_name = req.sector_name.as_deref().filter(|s| !s.is_empty());
    if let Some(name) = sector_name {
        if !SECTOR_NAME_RE.is_match(name) {
            return Err(ValidationError::InvalidSectorName);
        }
    }

    Ok(NormalizedRequest {
        entry,
        year: req.year,
        user_period: period.user_period,
        storage_period: period.storage_period,
        quarter: period.quarter,
        sector_name: sector_name.map(str::to_string),
        page: req.page,
        limit: req.limit,
    })
}

/// Full ranked-page validation: the cohort checks, then page and limit bounds.
pub fn validate_request(req: &RankingRequest) -> Result<NormalizedRequest, ValidationError> {
    let normalized = validate_cohort(req)?;
    if !(1..=MAX_PAGE).contains(&req.page) {
        return Err(ValidationError::PageOutOfRange(req.page));
    }
    if !(MIN_LIMIT..=MAX_LIMIT).contains(&req.limit) {
        return Err(ValidationError::LimitOutOfRange(req.limit));
    }
    Ok(normalized)
}

/// Raw company snapshot query.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotRequest {
    pub stock_symbol: String,
    pub year: i32,
    #[serde(rename = "report_type")]
    pub report_period: String,
    pub quarter: Option<i64>,
    pub statement_type: String,
}

#[derive(Debug, Clone)]
pub struct NormalizedSnapshotRequest {
    pub stock_symbol: String,
    pub year: i32,
    pub statement_type: StatementType,
    pub user_period: UserPeriod,
    pub storage_period: StoragePeriod,
    pub quarter: u8,
}

pub fn validate_snapshot_request(
    req: &SnapshotRequest,
) -> Result<NormalizedSnapshotRequest, ValidationError> {
    if req.stock_symbol.len() < MIN_STOCK_SYMBOL_LEN || !STOCK_SYMBOL_RE.is_match(&req.stock_symbol)
    {
        return Err(ValidationError::InvalidStockSymbol);
    }

    check_year(req.year)?;

    let statement_type = StatementType::parse(&req.statement_type)
        .ok_or_else(|| ValidationError::InvalidStatementType(req.statement_type.clone()))?;

    let period = resolve_period(statement_type, &req.report_period, req.quarter)?;

    Ok(NormalizedSnapshotRequest {
        stock_symbol: req.stock_symbol.clone(),
        year: req.year,
        statement_type,
        user_period: period.user_period,
        storage_period: period.storage_period,
        quarter: period.quarter,
    })
}
