use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum PluvioError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Google token error: {0}")]
    Token(String),

    #[error("Error querying BigQuery: {0}")]
    Query(String),

    #[error("Error querying BigQuery: job {0} is still pending")]
    QueryPending(String),

    #[error("No precipitation data found for the year {year}.")]
    NoData { year: u16 },

    #[error("Error connecting or inserting into database: {0}")]
    Database(#[from] SqlxError),

    #[error("Error uploading to Cloud Storage: {0}")]
    Archive(String),
}

impl IntoResponse for PluvioError {
    fn into_response(self) -> Response {
        // Plain-text bodies; the message carries the collaborator's own detail.
        let status = match &self {
            PluvioError::NoData { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
