use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::shaper::value::{to_transport_value, Value};

/// Response wrapper shared by every read endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `{data, metadata, status: "ok"}`
    Page { data: Value, metadata: Value },
    /// `{data, status: "ok"}`
    Data(Value),
    /// Valid query with zero matches. Carries the echoed query.
    NotFound { message: String, query: Value },
}

/// Wraps a ranked page. An empty page becomes `NotFound` with the echoed query.
pub fn envelope(rows: Vec<Value>, metadata: Value, query: Value) -> Envelope {
    if rows.is_empty() {
        return Envelope::NotFound {
            message: "No ranking data found".to_string(),
            query: to_transport_value(query),
        };
    }
    Envelope::Page {
        data: to_transport_value(Value::List(rows)),
        metadata: to_transport_value(metadata),
    }
}

pub fn data(value: Value) -> Envelope {
    Envelope::Data(to_transport_value(value))
}

impl Envelope {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Envelope::Page { .. } | Envelope::Data(_) => StatusCode::OK,
            Envelope::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn into_body(self) -> Value {
        match self {
            Envelope::Page { data, metadata } => Value::map([
                ("data", data),
                ("metadata", metadata),
                ("status", Value::from("ok")),
            ]),
            Envelope::Data(data) => Value::map([("data", data), ("status", Value::from("ok"))]),
            Envelope::NotFound { message, query } => {
                let mut body = match query {
                    Value::Map(m) => m,
                    Value::Null => Default::default(),
                    other => [("query".to_string(), other)].into_iter().collect(),
                };
                body.insert("message".to_string(), Value::Text(message));
                body.insert("status".to_string(), Value::from("not_found"));
                Value::Map(body)
            }
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        (status, Json(self.into_body())).into_response()
    }
}
