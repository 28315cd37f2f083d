use crate::config::Config;
use crate::db::ResultsRepository;
use crate::db::models::WeatherResult;
use crate::db::schema::PG_INIT;
use crate::error::PluvioError;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tokio::sync::OnceCell;
use tracing::info;

/// Postgres-backed repository. The pool and the schema are both set up on
/// first use and reused for the life of the process; a failed schema attempt
/// leaves its cell unset so the next request tries again.
pub struct PostgresResults {
    connect: PgConnectOptions,
    pool: OnceCell<PgPool>,
    schema_ready: OnceCell<()>,
}

impl PostgresResults {
    pub fn new(cfg: &Config) -> Self {
        Self {
            connect: connect_options(cfg),
            pool: OnceCell::new(),
            schema_ready: OnceCell::new(),
        }
    }

    /// Shared pool, built once. `connect_lazy_with` defers real connections
    /// until the first query.
    async fn pool(&self) -> &PgPool {
        self.pool
            .get_or_init(|| async {
                info!("creating the database connection pool");
                PgPoolOptions::new()
                    .max_connections(5)
                    .connect_lazy_with(self.connect.clone())
            })
            .await
    }
}

fn connect_options(cfg: &Config) -> PgConnectOptions {
    let opts = PgConnectOptions::new()
        .username(&cfg.db_user)
        .password(&cfg.db_pass)
        .database(&cfg.db_name);
    match &cfg.instance_connection_name {
        // The Cloud SQL auth proxy exposes the instance as a unix socket.
        Some(instance) => opts.socket(format!("/cloudsql/{instance}")),
        None => opts.host(&cfg.db_host).port(cfg.db_port),
    }
}

#[async_trait]
impl ResultsRepository for PostgresResults {
    async fn ensure_schema(&self) -> Result<(), PluvioError> {
        let pool = self.pool().await;
        self.schema_ready
            .get_or_try_init(|| async {
                // sqlx::query runs one statement at a time
                for stmt in PG_INIT.split(';') {
                    let s = stmt.trim();
                    if s.is_empty() {
                        continue;
                    }
                    sqlx::query(s).execute(pool).await?;
                }
                info!("weather_results table is ready");
                Ok::<_, PluvioError>(())
            })
            .await?;
        Ok(())
    }

    async fn record(
        &self,
        year: u16,
        total_precipitation: f64,
    ) -> Result<WeatherResult, PluvioError> {
        let pool = self.pool().await;
        let row: WeatherResult = sqlx::query_as(
            r#"INSERT INTO weather_results (year, total_precipitation)
               VALUES ($1, $2)
               RETURNING id, year, total_precipitation, recorded_at"#,
        )
        .bind(i32::from(year))
        .bind(total_precipitation)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }
}
