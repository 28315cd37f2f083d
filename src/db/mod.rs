//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database
//! - `postgres.rs`: the repository over a lazily-built sqlx pool

pub mod models;
pub mod postgres;
pub mod schema;

pub use models::WeatherResult;
pub use postgres::PostgresResults;
pub use schema::PG_INIT;

use crate::error::PluvioError;
use async_trait::async_trait;

/// Relational persistence for processed yearly aggregates.
#[async_trait]
pub trait ResultsRepository: Send + Sync {
    /// Create the results table if missing. Idempotent.
    async fn ensure_schema(&self) -> Result<(), PluvioError>;

    /// Insert one result row; `recorded_at` is assigned by the server.
    async fn record(
        &self,
        year: u16,
        total_precipitation: f64,
    ) -> Result<WeatherResult, PluvioError>;
}
