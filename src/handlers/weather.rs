use axum::extract::{Path, State};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::PluvioError;
use crate::router::AppState;

/// JSON payload archived to the bucket alongside the relational row.
#[derive(Debug, Serialize)]
pub struct PrecipitationRecord {
    pub year: u16,
    pub total_precipitation_inches: f64,
}

fn round_inches(total: f64) -> f64 {
    (total * 100.0).round() / 100.0
}

fn archive_key(year: u16) -> String {
    format!("results/{year}-precipitation.json")
}

/// GET /past/{year}: aggregate, persist, archive, report.
pub async fn process_year(
    State(state): State<AppState>,
    Path(year): Path<u16>,
) -> Result<String, PluvioError> {
    info!(year, "processing precipitation data");

    // Schema problems are logged and retried on a later request; a real
    // database outage still surfaces at insert time below.
    if let Err(e) = state.results.ensure_schema().await {
        warn!(error = %e, "schema initialization failed; continuing");
    }

    let total = state
        .aggregates
        .yearly_precipitation(year)
        .await?
        .ok_or(PluvioError::NoData { year })?;

    let record = PrecipitationRecord {
        year,
        total_precipitation_inches: round_inches(total),
    };
    info!(
        year,
        total_precipitation_inches = record.total_precipitation_inches,
        "aggregate materialized"
    );

    let row = state
        .results
        .record(year, record.total_precipitation_inches)
        .await?;
    info!(row_id = row.id, year, "result row inserted");

    let payload = serde_json::to_vec_pretty(&record)?;
    state.archive.put_json(&archive_key(year), payload).await?;

    Ok(format!(
        "Successfully processed and stored data for year {}. Precipitation: {} inches.",
        year, record.total_precipitation_inches
    ))
}
