use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::api::latency::LatencyRegistry;
use crate::catalog;
use crate::config::PAGE_SIZE;
use crate::error::Result;
use crate::planner::CohortPlanner;
use crate::rules::{
    compatibility_rules, validate_cohort, validate_request, validate_snapshot_request,
    NormalizedRequest, RankingRequest, SnapshotRequest,
};
use crate::shaper::{self, Envelope, Value};

#[derive(Clone)]
pub struct ApiState {
    pub planner: CohortPlanner,
    pub latency: Arc<LatencyRegistry>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/advanced_search/ranking", get(get_ranking))
        .route("/api/advanced_search/count", get(get_count))
        .route("/api/advanced_search/stock_ranking", get(get_stock_ranking))
        .route("/api/advanced_search/supported_rankings", get(get_supported_rankings))
        .route("/api/advanced_search/report_type_rules", get(get_report_type_rules))
        .route("/api/stats/latency", get(get_stats_latency))
        .with_state(state)
}

/// Runs one planner call and records its wall time, errors included.
async fn timed<T>(
    latency: &LatencyRegistry,
    op: &'static str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    let started = Instant::now();
    let out = call.await;
    latency.record(op, started.elapsed());
    out
}

// ---------------------------------------------------------------------------
// Response shaping
// ---------------------------------------------------------------------------

/// The parameters echoed back by the count and the not-found page.
fn echoed_query(req: &NormalizedRequest) -> Vec<(&'static str, Value)> {
    vec![
        ("ranking_type", Value::from(req.entry.ranking_key)),
        ("year", Value::from(req.year)),
        ("report_type", Value::from(req.user_period.as_str())),
        ("sector_name", Value::from(req.sector_name.clone())),
        ("quarter", Value::from(req.quarter)),
    ]
}

fn page_metadata(req: &NormalizedRequest, current_page_count: usize) -> Value {
    Value::map([
        ("ranking_type", Value::from(req.entry.ranking_key)),
        ("description", Value::from(req.entry.description)),
        ("year", Value::from(req.year)),
        ("report_type", Value::from(req.user_period.as_str())),
        ("db_report_type", Value::from(req.storage_period.as_str())),
        ("sector_name", Value::from(req.sector_name.clone())),
        ("quarter", Value::from(req.quarter)),
        ("limit", Value::from(req.limit)),
        ("page", Value::from(req.page)),
        ("page_size", Value::from(PAGE_SIZE)),
        ("current_page_count", Value::from(current_page_count)),
        ("has_next_page", Value::from(has_next_page(req, current_page_count))),
    ])
}

/// A next page is advertised only while the page is full and the rows shown
/// so far stay under `limit`. `page * PAGE_SIZE` fits because `page <= MAX_PAGE`.
fn has_next_page(req: &NormalizedRequest, current_page_count: usize) -> bool {
    current_page_count as i64 == PAGE_SIZE && req.page * PAGE_SIZE < req.limit
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_ranking(
    State(state): State<ApiState>,
    Query(params): Query<RankingRequest>,
) -> Result<Envelope> {
    let req = validate_request(&params)?;
    let rows = timed(&state.latency, "ranked_page", state.planner.ranked_page(&req)).await?;

    let metadata = page_metadata(&req, rows.len());
    let column = req.entry.column;
    let rows = rows.into_iter().map(|r| r.into_value(column)).collect();
    Ok(shaper::envelope(rows, metadata, Value::map(echoed_query(&req))))
}

/// Page and limit are accepted but play no part in the count.
async fn get_count(
    State(state): State<ApiState>,
    Query(params): Query<RankingRequest>,
) -> Result<Envelope> {
    let req = validate_cohort(&params)?;
    let total = timed(&state.latency, "cohort_count", state.planner.cohort_count(&req)).await?;

    let mut fields = vec![("total_count", Value::from(total))];
    fields.extend(echoed_query(&req));
    Ok(shaper::data(Value::map(fields)))
}

async fn get_stock_ranking(
    State(state): State<ApiState>,
    Query(params): Query<SnapshotRequest>,
) -> Result<Envelope> {
    let req = validate_snapshot_request(&params)?;
    let snapshot = timed(
        &state.latency,
        "company_snapshot",
        state.planner.company_snapshot(&req),
    )
    .await?;
    Ok(shaper::data(snapshot.into_value()))
}

async fn get_supported_rankings() -> Envelope {
    let listing = catalog::list_all().iter().map(|entry| {
        (
            entry.ranking_key,
            Value::map([
                ("table", Value::from(entry.table())),
                ("field", Value::from(entry.column)),
                ("description", Value::from(entry.description)),
            ]),
        )
    });
    shaper::data(Value::map(listing))
}

async fn get_report_type_rules() -> Envelope {
    let rules = compatibility_rules().into_iter().map(|rule| {
        let periods: Vec<Value> = rule
            .supported_periods
            .iter()
            .map(|p| Value::from(p.as_str()))
            .collect();
        (
            rule.table,
            Value::map([
                ("statement_type", Value::from(rule.statement_type.as_str())),
                ("supported_periods", Value::List(periods)),
                ("quarter_rule", Value::from(rule.quarter_rule)),
                ("description", Value::from(rule.description)),
            ]),
        )
    });
    shaper::data(Value::map(rules))
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(json!({ "data": state.latency.report(), "unit": "us", "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::db::fixtures::seeded_pool;

    async fn app() -> (Router, Arc<LatencyRegistry>) {
        let latency = Arc::new(LatencyRegistry::new());
        let state = ApiState {
            planner: CohortPlanner::new(seeded_pool().await, Duration::from_secs(5)),
            latency: Arc::clone(&latency),
        };
        (router(state), latency)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn ranking_page_with_metadata() {
        let (app, latency) = app().await;
        let (status, body) = get(
            app,
            "/api/advanced_search/ranking?ranking_type=revenue&year=2023&report_type=annual",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["data"].as_array().unwrap().len(), 8);
        assert_eq!(body["data"][0]["stock_symbol"], "2330");
        assert_eq!(body["data"][0]["revenue"], 2161736.25);
        assert_eq!(body["data"][0]["rank"], 1);
        assert!(body["data"][7]["revenue"].is_null());

        let meta = &body["metadata"];
        assert_eq!(meta["report_type"], "annual");
        assert_eq!(meta["db_report_type"], "accumulated");
        assert_eq!(meta["quarter"], 4);
        assert_eq!(meta["limit"], 50);
        assert_eq!(meta["page_size"], 30);
        assert_eq!(meta["current_page_count"], 8);
        assert_eq!(meta["has_next_page"], false);
        assert!(meta["sector_name"].is_null());

        assert_eq!(latency.report()["ranked_page"].samples, 1);
    }

    #[tokio::test]
    async fn empty_page_is_not_found_with_echo() {
        let (app, _) = app().await;
        let (status, body) = get(
            app,
            "/api/advanced_search/ranking?ranking_type=revenue&year=2023&report_type=annual&page=2&sector_name=Shipping",
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "not_found");
        assert_eq!(body["message"], "No ranking data found");
        assert_eq!(body["ranking_type"], "revenue");
        assert_eq!(body["sector_name"], "Shipping");
        assert_eq!(body["quarter"], 4);
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn validation_failure_is_400_with_detail() {
        let (app, latency) = app().await;
        let (status, body) = get(
            app,
            "/api/advanced_search/ranking?ranking_type=ebitda&year=2023&report_type=annual",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert!(body["detail"].as_str().unwrap().contains("ebitda"));
        assert!(latency.report().is_empty());
    }

    #[tokio::test]
    async fn incompatible_period_is_rejected() {
        let (app, _) = app().await;
        let (status, body) = get(
            app,
            "/api/advanced_search/ranking?ranking_type=inventory&year=2023&report_type=annual",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("quarterly"));
    }

    #[tokio::test]
    async fn huge_page_is_rejected_not_panicking() {
        let (app, latency) = app().await;
        let (status, body) = get(
            app,
            "/api/advanced_search/ranking?ranking_type=revenue&year=2023&report_type=annual&page=9223372036854775807",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert!(body["detail"].as_str().unwrap().contains("9223372036854775807"));
        assert!(latency.report().is_empty());
    }

    #[tokio::test]
    async fn last_addressable_page_is_empty_not_found() {
        let (app, _) = app().await;
        let uri = format!(
            "/api/advanced_search/ranking?ranking_type=revenue&year=2023&report_type=annual&page={}",
            crate::config::MAX_PAGE
        );
        let (status, body) = get(app, &uri).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "not_found");
    }

    #[test]
    fn next_page_follows_page_size_and_limit() {
        let base = validate_request(&RankingRequest {
            ranking_key: "revenue".to_string(),
            year: 2022,
            report_period: "annual".to_string(),
            quarter: None,
            sector_name: None,
            page: 1,
            limit: 50,
        })
        .unwrap();
        let full = PAGE_SIZE as usize;

        assert!(has_next_page(&base, full));
        assert!(!has_next_page(&base, full - 1));

        // 60 rows shown would reach past limit 50.
        let second = NormalizedRequest { page: 2, ..base.clone() };
        assert!(!has_next_page(&second, full));

        let wide = NormalizedRequest { page: 2, limit: 1000, ..base };
        assert!(has_next_page(&wide, full));
    }

    #[tokio::test]
    async fn count_ignores_paging() {
        let (app, _) = app().await;
        let (status, body) = get(
            app,
            "/api/advanced_search/count?ranking_type=revenue&year=2023&report_type=annual&page=0&limit=0",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_count"], 8);
        assert_eq!(body["data"]["ranking_type"], "revenue");
        assert_eq!(body["data"]["report_type"], "annual");
        assert!(body.get("metadata").is_none());
    }

    #[tokio::test]
    async fn stock_ranking_snapshot() {
        let (app, _) = app().await;
        let (status, body) = get(
            app,
            "/api/advanced_search/stock_ranking?stock_symbol=2330&year=2023&report_type=annual&statement_type=income_statement",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["stock_info"]["company_name"], "TSMC");
        assert_eq!(data["rankings"]["revenue"]["rank"], 1);
        assert_eq!(data["rankings"]["revenue"]["total_count"], 4);
        assert_eq!(data["summary"]["total_metrics"], 13);
    }

    #[tokio::test]
    async fn unknown_stock_is_404() {
        let (app, _) = app().await;
        let (status, body) = get(
            app,
            "/api/advanced_search/stock_ranking?stock_symbol=9999&year=2023&report_type=annual&statement_type=cash_flow",
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["stock_symbol"], "9999");
        assert_eq!(body["status"], "not_found");
    }

    #[tokio::test]
    async fn supported_rankings_lists_catalog() {
        let (app, _) = app().await;
        let (status, body) = get(app, "/api/advanced_search/supported_rankings").await;

        assert_eq!(status, StatusCode::OK);
        let listing = body["data"].as_object().unwrap();
        assert_eq!(listing.len(), catalog::list_all().len());
        assert_eq!(listing["inventory"]["table"], "Balance_Sheets");
        assert_eq!(listing["inventory"]["field"], "inventory");
    }

    #[tokio::test]
    async fn report_type_rules_keyed_by_table() {
        let (app, _) = app().await;
        let (status, body) = get(app, "/api/advanced_search/report_type_rules").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"]["Balance_Sheets"]["supported_periods"],
            serde_json::json!(["quarterly"])
        );
        assert_eq!(
            body["data"]["Income_Statements"]["supported_periods"],
            serde_json::json!(["quarterly", "annual"])
        );
    }

    #[tokio::test]
    async fn latency_reports_after_requests() {
        let (app, _) = app().await;
        let (_, _) = get(
            app.clone(),
            "/api/advanced_search/count?ranking_type=revenue&year=2023&report_type=annual",
        )
        .await;
        let (status, body) = get(app, "/api/stats/latency").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["cohort_count"]["samples"], 1);
        assert!(body["data"]["cohort_count"]["p50_us"].as_u64().is_some());
    }
}
