//! SQL DDL for the results table.

/// Postgres schema with:
/// - `id` SERIAL surrogate key
/// - `recorded_at` assigned server-side on insert
/// - no updates or deletes anywhere in the application
pub const PG_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS weather_results (
    id SERIAL PRIMARY KEY,
    year INT NOT NULL,
    total_precipitation FLOAT NOT NULL,
    recorded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#;
