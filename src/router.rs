use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::get;

use crate::api::{AggregateSource, ResultArchive};
use crate::db::ResultsRepository;
use crate::handlers;
use crate::middleware::logging::log_request;

/// Shared handler state: the three external collaborators behind their ports.
#[derive(Clone)]
pub struct AppState {
    pub aggregates: Arc<dyn AggregateSource>,
    pub results: Arc<dyn ResultsRepository>,
    pub archive: Arc<dyn ResultArchive>,
}

impl AppState {
    pub fn new(
        aggregates: Arc<dyn AggregateSource>,
        results: Arc<dyn ResultsRepository>,
        archive: Arc<dyn ResultArchive>,
    ) -> Self {
        Self {
            aggregates,
            results,
            archive,
        }
    }
}

/// Build the application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::index))
        .route("/past/{year}", get(handlers::weather::process_year))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
