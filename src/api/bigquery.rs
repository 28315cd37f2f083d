use crate::config::BIGQUERY_BASE_URL;
use crate::error::PluvioError;
use crate::google_auth::AccessTokenProvider;
use crate::types::bigquery::{QueryParameter, QueryRequest, QueryResponse};

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Warehouse-side yearly precipitation aggregate, in inches. `None` when the
/// year has no usable rows.
#[async_trait]
pub trait AggregateSource: Send + Sync {
    async fn yearly_precipitation(&self, year: u16) -> Result<Option<f64>, PluvioError>;
}

/// Readings of 99.99 are the dataset's missing-value sentinel.
const GSOD_SUM_QUERY: &str = "SELECT SUM(prcp) AS total_precipitation \
     FROM `bigquery-public-data.samples.gsod` \
     WHERE year = @year AND prcp < 99.99";

const QUERY_TIMEOUT_MS: u32 = 30_000;

fn pending_poll_policy() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(5))
        .with_max_times(10)
}

pub struct BigQuerySource {
    http: reqwest::Client,
    tokens: AccessTokenProvider,
    project_id: String,
}

impl BigQuerySource {
    pub fn new(
        http: reqwest::Client,
        tokens: AccessTokenProvider,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            tokens,
            project_id: project_id.into(),
        }
    }

    fn queries_url(&self) -> Result<Url, PluvioError> {
        Ok(BIGQUERY_BASE_URL.join(&format!("projects/{}/queries", self.project_id))?)
    }

    async fn submit(&self, year: u16) -> Result<QueryResponse, PluvioError> {
        let body = QueryRequest {
            query: GSOD_SUM_QUERY.to_string(),
            use_legacy_sql: false,
            parameter_mode: "NAMED".to_string(),
            query_parameters: vec![QueryParameter::int64("year", i64::from(year))],
            timeout_ms: QUERY_TIMEOUT_MS,
        };
        let token = self.tokens.token().await?;
        let resp = self
            .http
            .post(self.queries_url()?)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| PluvioError::Query(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(PluvioError::Query(super::read_api_error(resp).await));
        }
        resp.json()
            .await
            .map_err(|e| PluvioError::Query(e.to_string()))
    }

    /// Poll getQueryResults until the job reports completion. This waits for
    /// results to materialize; failed calls are not retried.
    async fn wait_for_completion(&self, first: QueryResponse) -> Result<QueryResponse, PluvioError> {
        if first.job_complete {
            return Ok(first);
        }
        let job = first.job_reference.ok_or_else(|| {
            PluvioError::Query("incomplete job without a job reference".to_string())
        })?;

        let mut url =
            BIGQUERY_BASE_URL.join(&format!("projects/{}/queries/{}", job.project_id, job.job_id))?;
        if let Some(location) = &job.location {
            url.query_pairs_mut().append_pair("location", location);
        }
        url.query_pairs_mut()
            .append_pair("timeoutMs", &QUERY_TIMEOUT_MS.to_string());

        (|| async {
            let token = self.tokens.token().await?;
            let resp = self
                .http
                .get(url.clone())
                .bearer_auth(&token)
                .send()
                .await
                .map_err(|e| PluvioError::Query(e.to_string()))?;
            if !resp.status().is_success() {
                return Err(PluvioError::Query(super::read_api_error(resp).await));
            }
            let payload: QueryResponse = resp
                .json()
                .await
                .map_err(|e| PluvioError::Query(e.to_string()))?;
            if !payload.job_complete {
                debug!(job_id = %job.job_id, "query job still running");
                return Err(PluvioError::QueryPending(job.job_id.clone()));
            }
            Ok(payload)
        })
        .retry(pending_poll_policy())
        .when(|e: &PluvioError| matches!(e, PluvioError::QueryPending(_)))
        .await
    }
}

#[async_trait]
impl AggregateSource for BigQuerySource {
    async fn yearly_precipitation(&self, year: u16) -> Result<Option<f64>, PluvioError> {
        info!(year, "submitting aggregate query");
        let first = self.submit(year).await?;
        let completed = self.wait_for_completion(first).await?;
        Ok(completed.scalar_f64())
    }
}
