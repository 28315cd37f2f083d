//! Thin callers for the external Google services.

pub mod bigquery;
pub mod gcs;

pub use bigquery::{AggregateSource, BigQuerySource};
pub use gcs::{GcsArchive, ResultArchive};

use std::time::Duration;

use crate::config::Config;
use crate::error::PluvioError;

/// Shared HTTP client for every outbound call. The request timeout must
/// outlive the BigQuery completion window.
pub fn http_client(cfg: &Config) -> Result<reqwest::Client, PluvioError> {
    let mut builder = reqwest::Client::builder()
        .user_agent("pluvio/0.1")
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(60));
    if let Some(proxy_url) = cfg.proxy.as_ref() {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }
    Ok(builder.build()?)
}

/// Google API failures carry `{"error": {"message": ...}}` payloads; surface
/// the message when present, the raw body otherwise.
pub(crate) async fn read_api_error(resp: reqwest::Response) -> String {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(|m| format!("{status}: {m}"))
        })
        .unwrap_or_else(|| format!("{status}: {body}"))
}
