use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// One persisted yearly aggregate. Rows are insert-only and immutable.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WeatherResult {
    pub id: i32,
    pub year: i32,
    pub total_precipitation: f64,
    pub recorded_at: DateTime<Utc>,
}
