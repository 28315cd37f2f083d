use std::sync::Arc;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pluvio::api::{BigQuerySource, GcsArchive};
use pluvio::config::Config;
use pluvio::db::PostgresResults;
use pluvio::google_auth::AccessTokenProvider;
use pluvio::router::{AppState, app_router};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::from_env()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .try_init()?;

    info!(
        project_id = %cfg.project_id,
        bucket = %cfg.bucket_name,
        loglevel = %cfg.loglevel,
        "configuration loaded"
    );

    let http = pluvio::api::http_client(&cfg)?;
    let tokens = AccessTokenProvider::new(http.clone(), &cfg);

    let state = AppState::new(
        Arc::new(BigQuerySource::new(
            http.clone(),
            tokens.clone(),
            cfg.project_id.clone(),
        )),
        Arc::new(PostgresResults::new(&cfg)),
        Arc::new(GcsArchive::new(http, tokens, cfg.bucket_name.clone())),
    );
    let app = app_router(state);

    let addr = format!("0.0.0.0:{}", cfg.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
