use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::rules::ValidationError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Stock symbol {0} not found")]
    CompanyNotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Connection pool exhausted after {attempts} attempts")]
    PoolExhausted { attempts: usize },

    #[error("Store query exceeded {0:?}")]
    QueryTimeout(std::time::Duration),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": e.to_string(), "status": "error" })),
            )
                .into_response(),
            AppError::CompanyNotFound(symbol) => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "detail": format!("No data found for stock symbol {symbol}"),
                    "stock_symbol": symbol,
                    "status": "not_found",
                })),
            )
                .into_response(),
            AppError::PoolExhausted { attempts } => {
                error!(attempts, "Connection pool exhausted");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "detail": "service temporarily unavailable", "status": "error" })),
                )
                    .into_response()
            }
            other => {
                error!("Store error: {other}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "internal server error", "status": "error" })),
                )
                    .into_response()
            }
        }
    }
}
