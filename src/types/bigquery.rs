//! Wire types for the BigQuery `jobs.query` / `jobs.getQueryResults` REST
//! surface. Only the fields this service touches are modeled.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: String,
    pub use_legacy_sql: bool,
    pub parameter_mode: String,
    pub query_parameters: Vec<QueryParameter>,
    pub timeout_ms: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameter {
    pub name: String,
    pub parameter_type: QueryParameterType,
    pub parameter_value: QueryParameterValue,
}

#[derive(Debug, Serialize)]
pub struct QueryParameterType {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct QueryParameterValue {
    pub value: String,
}

impl QueryParameter {
    pub fn int64(name: &str, value: i64) -> Self {
        Self {
            name: name.to_string(),
            parameter_type: QueryParameterType {
                kind: "INT64".to_string(),
            },
            parameter_value: QueryParameterValue {
                value: value.to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub job_complete: bool,
    #[serde(default)]
    pub job_reference: Option<JobReference>,
    #[serde(default)]
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    pub project_id: String,
    pub job_id: String,
    #[serde(default)]
    pub location: Option<String>,
}

/// Result cells arrive as `{"f": [{"v": ...}]}`; numeric values are encoded
/// as JSON strings, NULL aggregates as JSON null.
#[derive(Debug, Deserialize)]
pub struct TableRow {
    pub f: Vec<TableCell>,
}

#[derive(Debug, Deserialize)]
pub struct TableCell {
    pub v: Value,
}

impl QueryResponse {
    /// First cell of the first row, parsed as a float. A NULL aggregate and
    /// an empty result set both come back as `None`.
    pub fn scalar_f64(&self) -> Option<f64> {
        let cell = self.rows.first()?.f.first()?;
        match &cell.v {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }
}
