//! Typed predicate accumulator for cohort queries.
//!
//! Each filter writes its SQL fragment and its bind in the same call, so the
//! fragment list and the parameter list cannot drift apart.

use sqlx::{QueryBuilder, Sqlite};

use crate::rules::NormalizedRequest;
use crate::types::StoragePeriod;

/// Fact table joined to its company, sector and country dimensions.
/// Aliases: `fr` fact row, `c` company, `s` sector, `ct` country.
const COHORT_JOINS: &str = " AS fr \
    INNER JOIN Companies AS c ON fr.company_id = c.company_id \
    INNER JOIN Sectors AS s ON c.sector_id = s.sector_id \
    INNER JOIN Countrys AS ct ON c.country_id = ct.country_id";

#[derive(Debug, Clone, PartialEq)]
pub enum CohortFilter {
    Year(i32),
    ReportType(StoragePeriod),
    Quarter(u8),
    /// Matches every sector row carrying the name, not one sector id.
    SectorName(String),
    CountryName(String),
    /// Column name from the metric catalog.
    MetricNotNull(&'static str),
}

impl CohortFilter {
    fn push_onto(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            CohortFilter::Year(year) => {
                qb.push("fr.year = ").push_bind(*year);
            }
            CohortFilter::ReportType(period) => {
                qb.push("fr.report_type = ").push_bind(period.as_str());
            }
            CohortFilter::Quarter(quarter) => {
                qb.push("fr.quarter = ").push_bind(i64::from(*quarter));
            }
            CohortFilter::SectorName(name) => {
                qb.push("s.sector_name = ").push_bind(name.clone());
            }
            CohortFilter::CountryName(name) => {
                qb.push("ct.country_name = ").push_bind(name.clone());
            }
            CohortFilter::MetricNotNull(column) => {
                qb.push(format_args!("fr.{column} IS NOT NULL"));
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CohortFilters {
    filters: Vec<CohortFilter>,
}

impl CohortFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, filter: CohortFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn and_maybe(self, filter: Option<CohortFilter>) -> Self {
        match filter {
            Some(f) => self.and(f),
            None => self,
        }
    }

    /// Predicate shared by the ranked page and the cohort count.
    pub fn for_ranking(req: &NormalizedRequest) -> Self {
        Self::new()
            .and(CohortFilter::Year(req.year))
            .and(CohortFilter::ReportType(req.storage_period))
            .and(CohortFilter::Quarter(req.quarter))
            .and_maybe(req.sector_name.clone().map(CohortFilter::SectorName))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Appends `FROM <table> <joins> WHERE <filters>`.
    pub fn push_from_where(&self, qb: &mut QueryBuilder<'_, Sqlite>, table: &'static str) {
        qb.push(" FROM ").push(table).push(COHORT_JOINS);
        for (i, filter) in self.filters.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            filter.push_onto(qb);
        }
    }
}
