use std::sync::LazyLock;

use figment::{Figment, providers::Env};
use serde::Deserialize;
use url::Url;

pub static GOOGLE_AUTH_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://accounts.google.com/o/oauth2/v2/auth").expect("static Google auth URL")
});

pub static GOOGLE_TOKEN_URI: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://oauth2.googleapis.com/token").expect("static Google token URL")
});

/// GCE/Cloud Run metadata endpoint serving default service-account tokens.
pub static METADATA_TOKEN_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token")
        .expect("static metadata token URL")
});

/// Trailing slashes matter: these are join bases.
pub static BIGQUERY_BASE_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://bigquery.googleapis.com/bigquery/v2/").expect("static BigQuery base URL")
});

pub static STORAGE_UPLOAD_BASE_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://storage.googleapis.com/upload/storage/v1/")
        .expect("static storage upload base URL")
});

fn default_port() -> u16 {
    8080
}

fn default_loglevel() -> String {
    "info".to_string()
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

/// Runtime configuration, read from the environment.
///
/// `INSTANCE_CONNECTION_NAME` selects the Cloud SQL auth-proxy unix socket;
/// without it the database is reached over TCP at `DB_HOST:DB_PORT`. The
/// `GOOGLE_*` trio enables refresh-token auth for local runs; on GCP the
/// metadata server is used instead.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub project_id: String,
    #[serde(default)]
    pub instance_connection_name: Option<String>,
    #[serde(default = "default_db_host")]
    pub db_host: String,
    #[serde(default = "default_db_port")]
    pub db_port: u16,
    pub db_user: String,
    pub db_pass: String,
    pub db_name: String,
    pub bucket_name: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_loglevel")]
    pub loglevel: String,
    #[serde(default)]
    pub proxy: Option<Url>,
    #[serde(default)]
    pub google_client_id: Option<String>,
    #[serde(default)]
    pub google_client_secret: Option<String>,
    #[serde(default)]
    pub google_refresh_token: Option<String>,
}

impl Config {
    /// Extract configuration from process environment variables.
    pub fn from_env() -> Result<Self, figment::Error> {
        Self::extract_from(Figment::new().merge(Env::raw()))
    }

    pub fn extract_from(figment: Figment) -> Result<Self, figment::Error> {
        figment.extract()
    }
}
