use bigdecimal::BigDecimal;
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

use crate::config::PAGE_SIZE;
use crate::db::models::{parse_decimal, RankedRow};
use crate::db::pool::{acquire, with_deadline};
use crate::db::predicates::CohortFilters;
use crate::error::{AppError, Result};
use crate::planner::CohortPlanner;
use crate::rules::NormalizedRequest;
use crate::shaper::Value;

/// One row of a ranked page.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingResultRow {
    pub stock_symbol: String,
    pub company_name: String,
    pub sector_name: String,
    pub country_name: String,
    pub metric_value: Option<BigDecimal>,
    pub year: i64,
    pub quarter: i64,
    pub report_type: String,
    pub rank: i64,
}

impl RankingResultRow {
    fn from_row(row: RankedRow) -> Result<Self> {
        Ok(Self {
            metric_value: parse_decimal(row.metric_value.as_deref())?,
            stock_symbol: row.stock_symbol,
            company_name: row.company_name,
            sector_name: row.sector_name,
            country_name: row.country_name,
            year: row.year,
            quarter: row.quarter,
            report_type: row.report_type,
            rank: row.rank,
        })
    }

    /// Shaped as a map keyed by column name; the metric is keyed by its catalog column.
    pub fn into_value(self, metric_column: &str) -> Value {
        Value::map([
            ("stock_symbol", Value::from(self.stock_symbol)),
            ("company_name", Value::from(self.company_name)),
            ("sector_name", Value::from(self.sector_name)),
            ("country_name", Value::from(self.country_name)),
            (metric_column, Value::from(self.metric_value)),
            ("year", Value::from(self.year)),
            ("quarter", Value::from(self.quarter)),
            ("report_type", Value::from(self.report_type)),
            ("rank", Value::from(self.rank)),
        ])
    }
}

/// Metric descending, nulls last, ties by company id.
fn push_order(qb: &mut QueryBuilder<'_, Sqlite>, column: &str) {
    qb.push(format_args!("fr.{column} DESC NULLS LAST, c.company_id ASC"));
}

impl CohortPlanner {
    /// One page of the cohort ordered by the requested metric.
    pub async fn ranked_page(&self, req: &NormalizedRequest) -> Result<Vec<RankingResultRow>> {
        let column = req.entry.column;
        let filters = CohortFilters::for_ranking(req);

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT c.stock_symbol, c.company_name, s.sector_name, ct.country_name, ",
        );
        qb.push(format_args!("CAST(fr.{column} AS TEXT) AS metric_value, "));
        qb.push("fr.year, fr.quarter, fr.report_type, ROW_NUMBER() OVER (ORDER BY ");
        push_order(&mut qb, column);
        qb.push(") AS \"rank\"");
        filters.push_from_where(&mut qb, req.entry.table());
        qb.push(" ORDER BY ");
        push_order(&mut qb, column);
        qb.push(" LIMIT ").push_bind(PAGE_SIZE);
        qb.push(" OFFSET ").push_bind(req.offset());

        let rows = with_deadline(self.query_timeout, async {
            let mut conn = acquire(&self.pool).await?;
            let rows = qb
                .build_query_as::<RankedRow>()
                .fetch_all(&mut *conn)
                .await?;
            Ok::<_, AppError>(rows)
        })
        .await?;

        debug!(
            ranking_key = req.entry.ranking_key,
            year = req.year,
            quarter = req.quarter,
            page = req.page,
            rows = rows.len(),
            "Ranked page fetched"
        );

        rows.into_iter().map(RankingResultRow::from_row).collect()
    }

    /// Number of fact rows matching the same predicate as `ranked_page`.
    pub async fn cohort_count(&self, req: &NormalizedRequest) -> Result<i64> {
        let filters = CohortFilters::for_ranking(req);

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*)");
        filters.push_from_where(&mut qb, req.entry.table());

        let total = with_deadline(self.query_timeout, async {
            let mut conn = acquire(&self.pool).await?;
            let total = qb.build_query_scalar::<i64>().fetch_one(&mut *conn).await?;
            Ok::<_, AppError>(total)
        })
        .await?;

        debug!(ranking_key = req.entry.ranking_key, year = req.year, total, "Cohort counted");
        Ok(total)
    }
}
