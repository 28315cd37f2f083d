use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use tower::ServiceExt;

use pluvio::PluvioError;
use pluvio::api::{AggregateSource, ResultArchive};
use pluvio::db::{ResultsRepository, WeatherResult};
use pluvio::router::{AppState, app_router};

struct FakeAggregates {
    response: Result<Option<f64>, String>,
}

impl FakeAggregates {
    fn returning(total: f64) -> Self {
        Self {
            response: Ok(Some(total)),
        }
    }

    fn empty() -> Self {
        Self { response: Ok(None) }
    }

    fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl AggregateSource for FakeAggregates {
    async fn yearly_precipitation(&self, _year: u16) -> Result<Option<f64>, PluvioError> {
        self.response.clone().map_err(PluvioError::Query)
    }
}

#[derive(Default)]
struct FakeRepository {
    rows: Mutex<Vec<(u16, f64)>>,
    fail_schema: bool,
    fail_insert: bool,
}

impl FakeRepository {
    fn failing_schema() -> Self {
        Self {
            fail_schema: true,
            ..Self::default()
        }
    }

    fn failing_insert() -> Self {
        Self {
            fail_insert: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ResultsRepository for FakeRepository {
    async fn ensure_schema(&self) -> Result<(), PluvioError> {
        if self.fail_schema {
            return Err(PluvioError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }

    async fn record(
        &self,
        year: u16,
        total_precipitation: f64,
    ) -> Result<WeatherResult, PluvioError> {
        if self.fail_insert {
            return Err(PluvioError::Database(sqlx::Error::PoolClosed));
        }
        let mut rows = self.rows.lock().expect("rows lock");
        rows.push((year, total_precipitation));
        Ok(WeatherResult {
            id: rows.len() as i32,
            year: i32::from(year),
            total_precipitation,
            recorded_at: Utc::now(),
        })
    }
}

#[derive(Default)]
struct FakeArchive {
    objects: Mutex<Vec<(String, Vec<u8>)>>,
    fail: bool,
}

impl FakeArchive {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ResultArchive for FakeArchive {
    async fn put_json(&self, key: &str, body: Vec<u8>) -> Result<(), PluvioError> {
        if self.fail {
            return Err(PluvioError::Archive("bucket unavailable".to_string()));
        }
        self.objects
            .lock()
            .expect("objects lock")
            .push((key.to_string(), body));
        Ok(())
    }
}

fn router_with(
    aggregates: FakeAggregates,
    repository: Arc<FakeRepository>,
    archive: Arc<FakeArchive>,
) -> Router {
    app_router(AppState::new(Arc::new(aggregates), repository, archive))
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let resp = app
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    (
        status,
        String::from_utf8(body.to_vec()).expect("response body was not utf-8"),
    )
}

#[tokio::test]
async fn known_aggregate_reports_rounded_total() {
    let repository = Arc::new(FakeRepository::default());
    let archive = Arc::new(FakeArchive::default());
    let app = router_with(
        FakeAggregates::returning(13.4721),
        repository.clone(),
        archive.clone(),
    );

    let (status, body) = get(app, "/past/2009").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("2009"));
    assert!(body.contains("13.47"));
    assert_eq!(
        repository.rows.lock().unwrap().as_slice(),
        &[(2009, 13.47)]
    );

    let objects = archive.objects.lock().unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].0, "results/2009-precipitation.json");
    let payload: serde_json::Value =
        serde_json::from_slice(&objects[0].1).expect("archived payload was not JSON");
    assert_eq!(payload["year"], 2009);
    assert_eq!(payload["total_precipitation_inches"], 13.47);
}

#[tokio::test]
async fn missing_year_returns_404() {
    let app = router_with(
        FakeAggregates::empty(),
        Arc::new(FakeRepository::default()),
        Arc::new(FakeArchive::default()),
    );

    let (status, body) = get(app, "/past/1800").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("No precipitation data found for the year 1800."));
}

#[tokio::test]
async fn query_failure_skips_persistence_and_archive() {
    let repository = Arc::new(FakeRepository::default());
    let archive = Arc::new(FakeArchive::default());
    let app = router_with(
        FakeAggregates::failing("warehouse offline"),
        repository.clone(),
        archive.clone(),
    );

    let (status, body) = get(app, "/past/2009").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("Error querying BigQuery"));
    assert!(body.contains("warehouse offline"));
    assert!(repository.rows.lock().unwrap().is_empty());
    assert!(archive.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn insert_failure_returns_500_without_archiving() {
    let archive = Arc::new(FakeArchive::default());
    let app = router_with(
        FakeAggregates::returning(5.5),
        Arc::new(FakeRepository::failing_insert()),
        archive.clone(),
    );

    let (status, body) = get(app, "/past/1987").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("Error connecting or inserting into database"));
    assert!(archive.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn upload_failure_keeps_persisted_row() {
    let repository = Arc::new(FakeRepository::default());
    let app = router_with(
        FakeAggregates::returning(42.101),
        repository.clone(),
        Arc::new(FakeArchive::failing()),
    );

    let (status, body) = get(app, "/past/1999").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("Error uploading to Cloud Storage"));
    // The insert is not rolled back when archival fails.
    assert_eq!(
        repository.rows.lock().unwrap().as_slice(),
        &[(1999, 42.1)]
    );
}

#[tokio::test]
async fn schema_failure_is_swallowed() {
    let app = router_with(
        FakeAggregates::returning(1.25),
        Arc::new(FakeRepository::failing_schema()),
        Arc::new(FakeArchive::default()),
    );

    let (status, body) = get(app, "/past/2005").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("1.25"));
}

#[tokio::test]
async fn index_returns_200_regardless_of_backend_health() {
    let app = router_with(
        FakeAggregates::failing("everything is down"),
        Arc::new(FakeRepository::failing_schema()),
        Arc::new(FakeArchive::failing()),
    );

    let (status, _body) = get(app, "/").await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn non_numeric_year_is_rejected() {
    let app = router_with(
        FakeAggregates::returning(1.0),
        Arc::new(FakeRepository::default()),
        Arc::new(FakeArchive::default()),
    );

    let (status, _body) = get(app, "/past/ninety").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
