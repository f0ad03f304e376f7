use bigdecimal::BigDecimal;
use sqlx::pool::PoolConnection;
use sqlx::{QueryBuilder, Sqlite};
use tracing::{debug, info};

use crate::catalog::{self, CatalogEntry};
use crate::db::models::{parse_decimal, CompanyCohortRow, MetricRankRow};
use crate::db::pool::{acquire, with_deadline};
use crate::db::predicates::{CohortFilter, CohortFilters};
use crate::error::{AppError, Result};
use crate::planner::CohortPlanner;
use crate::rules::NormalizedSnapshotRequest;
use crate::shaper::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum MetricOutcome {
    Ranked {
        value: Option<BigDecimal>,
        rank: i64,
        total_count: i64,
    },
    /// The company has no non-null value for this metric in the period.
    NoData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricRanking {
    pub entry: &'static CatalogEntry,
    pub outcome: MetricOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub total_metrics: usize,
    pub metrics_with_rank: usize,
    pub metrics_without_data: usize,
}

impl SnapshotSummary {
    fn tally(rankings: &[MetricRanking]) -> Self {
        let metrics_with_rank = rankings
            .iter()
            .filter(|r| matches!(r.outcome, MetricOutcome::Ranked { .. }))
            .count();
        Self {
            total_metrics: rankings.len(),
            metrics_with_rank,
            metrics_without_data: rankings.len() - metrics_with_rank,
        }
    }
}

/// Where one company stands in its own country + sector cohort on every
/// metric of one statement type.
#[derive(Debug, Clone)]
pub struct CompanySnapshot {
    pub company: CompanyCohortRow,
    pub request: NormalizedSnapshotRequest,
    pub rankings: Vec<MetricRanking>,
    pub summary: SnapshotSummary,
}

impl CompanySnapshot {
    pub fn into_value(self) -> Value {
        let rankings = self.rankings.into_iter().map(|r| {
            let entry = r.entry;
            let mut fields = vec![
                ("description", Value::from(entry.description)),
                ("table", Value::from(entry.table())),
                ("field", Value::from(entry.column)),
            ];
            match r.outcome {
                MetricOutcome::Ranked { value, rank, total_count } => {
                    fields.push(("value", Value::from(value)));
                    fields.push(("rank", Value::from(rank)));
                    fields.push(("total_count", Value::from(total_count)));
                }
                MetricOutcome::NoData => {
                    fields.push(("value", Value::Null));
                    fields.push(("rank", Value::Null));
                    fields.push(("total_count", Value::from(0i64)));
                    fields.push(("note", Value::from("No data for this metric in the requested period")));
                }
            }
            (entry.ranking_key, Value::map(fields))
        });

        Value::map([
            (
                "stock_info",
                Value::map([
                    ("stock_symbol", Value::from(self.company.stock_symbol)),
                    ("company_name", Value::from(self.company.company_name)),
                    ("country", Value::from(self.company.country_name)),
                    ("sector", Value::from(self.company.sector_name)),
                ]),
            ),
            (
                "query_params",
                Value::map([
                    ("year", Value::from(self.request.year)),
                    ("report_type", Value::from(self.request.user_period.as_str())),
                    ("quarter", Value::from(self.request.quarter)),
                    ("statement_type", Value::from(self.request.statement_type.as_str())),
                ]),
            ),
            ("rankings", Value::map(rankings)),
            (
                "summary",
                Value::map([
                    ("total_metrics", Value::from(self.summary.total_metrics)),
                    ("metrics_with_rank", Value::from(self.summary.metrics_with_rank)),
                    ("metrics_without_data", Value::from(self.summary.metrics_without_data)),
                ]),
            ),
        ])
    }
}

async fn find_company(
    conn: &mut PoolConnection<Sqlite>,
    stock_symbol: &str,
) -> Result<Option<CompanyCohortRow>> {
    let row = sqlx::query_as::<_, CompanyCohortRow>(
        r#"
        SELECT c.company_id, c.stock_symbol, c.company_name,
               s.sector_name, ct.country_name
        FROM Companies AS c
        INNER JOIN Countrys AS ct ON c.country_id = ct.country_id
        INNER JOIN Sectors AS s ON c.sector_id = s.sector_id
        WHERE c.stock_symbol = ?
        "#,
    )
    .bind(stock_symbol)
    .fetch_optional(&mut **conn)
    .await?;
    Ok(row)
}

/// Ranks the non-null cohort on one metric and picks out the company's row.
async fn rank_in_cohort(
    conn: &mut PoolConnection<Sqlite>,
    company: &CompanyCohortRow,
    req: &NormalizedSnapshotRequest,
    entry: &'static CatalogEntry,
) -> Result<MetricOutcome> {
    let column = entry.column;
    let filters = CohortFilters::new()
        .and(CohortFilter::CountryName(company.country_name.clone()))
        .and(CohortFilter::SectorName(company.sector_name.clone()))
        .and(CohortFilter::Year(req.year))
        .and(CohortFilter::ReportType(req.storage_period))
        .and(CohortFilter::Quarter(req.quarter))
        .and(CohortFilter::MetricNotNull(column));

    let mut qb = QueryBuilder::<Sqlite>::new("WITH ranked AS (SELECT c.company_id, ");
    qb.push(format_args!(
        "CAST(fr.{column} AS TEXT) AS value, \
         ROW_NUMBER() OVER (ORDER BY fr.{column} DESC, c.company_id ASC) AS \"rank\", \
         COUNT(*) OVER () AS total_count"
    ));
    filters.push_from_where(&mut qb, entry.table());
    qb.push(") SELECT value, \"rank\", total_count FROM ranked WHERE company_id = ")
        .push_bind(company.company_id);

    let row = qb
        .build_query_as::<MetricRankRow>()
        .fetch_optional(&mut **conn)
        .await?;

    Ok(match row {
        Some(r) => MetricOutcome::Ranked {
            value: parse_decimal(r.value.as_deref())?,
            rank: r.rank,
            total_count: r.total_count,
        },
        None => MetricOutcome::NoData,
    })
}

impl CohortPlanner {
    /// Every metric of the requested statement type, ranked within the
    /// company's own cohort. Runs on a single pooled connection; any store
    /// error fails the whole snapshot.
    pub async fn company_snapshot(&self, req: &NormalizedSnapshotRequest) -> Result<CompanySnapshot> {
        with_deadline(self.query_timeout, async {
            let mut conn = acquire(&self.pool).await?;

            let company = find_company(&mut conn, &req.stock_symbol)
                .await?
                .ok_or_else(|| AppError::CompanyNotFound(req.stock_symbol.clone()))?;

            let mut rankings = Vec::new();
            for entry in catalog::for_statement(req.statement_type) {
                let outcome = rank_in_cohort(&mut conn, &company, req, entry).await?;
                debug!(
                    stock_symbol = %company.stock_symbol,
                    ranking_key = entry.ranking_key,
                    ?outcome,
                    "Metric ranked"
                );
                rankings.push(MetricRanking { entry, outcome });
            }

            let summary = SnapshotSummary::tally(&rankings);
            info!(
                stock_symbol = %company.stock_symbol,
                statement_type = %req.statement_type,
                year = req.year,
                quarter = req.quarter,
                ranked = summary.metrics_with_rank,
                total = summary.total_metrics,
                "Company snapshot computed"
            );

            Ok::<_, AppError>(CompanySnapshot {
                company,
                request: req.clone(),
                rankings,
                summary,
            })
        })
        .await
    }
}
