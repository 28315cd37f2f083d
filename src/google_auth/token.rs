use crate::config::Config;
use crate::error::PluvioError;
use crate::google_auth::endpoints::GoogleAuthEndpoints;

use chrono::{DateTime, Duration, Utc};
use oauth2::TokenResponse;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Refresh-token credentials for local/dev runs.
#[derive(Debug, Clone)]
pub struct RefreshCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expiry: DateTime<Utc>,
}

impl CachedToken {
    /// Treat tokens within a minute of expiry as stale.
    fn is_fresh(&self) -> bool {
        self.expiry - Utc::now() > Duration::seconds(60)
    }
}

enum TokenSource {
    Metadata,
    Refresh(RefreshCredentials),
}

/// Process-wide bearer-token provider shared by the BigQuery and Cloud
/// Storage callers. Tokens are cached until shortly before expiry.
#[derive(Clone)]
pub struct AccessTokenProvider {
    http: reqwest::Client,
    source: Arc<TokenSource>,
    cached: Arc<RwLock<Option<CachedToken>>>,
}

impl AccessTokenProvider {
    pub fn new(http: reqwest::Client, cfg: &Config) -> Self {
        let source = match (
            &cfg.google_client_id,
            &cfg.google_client_secret,
            &cfg.google_refresh_token,
        ) {
            (Some(id), Some(secret), Some(refresh)) => {
                info!("using refresh-token credentials from the environment");
                TokenSource::Refresh(RefreshCredentials {
                    client_id: id.clone(),
                    client_secret: secret.clone(),
                    refresh_token: refresh.clone(),
                })
            }
            _ => {
                info!("using the instance metadata server for access tokens");
                TokenSource::Metadata
            }
        };
        Self {
            http,
            source: Arc::new(source),
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Current bearer token, fetching a new one when the cache is stale.
    pub async fn token(&self) -> Result<String, PluvioError> {
        {
            let guard = self.cached.read().await;
            if let Some(cached) = guard.as_ref()
                && cached.is_fresh()
            {
                return Ok(cached.value.clone());
            }
        }

        let mut guard = self.cached.write().await;
        // another task may have refreshed while we waited for the write lock
        if let Some(cached) = guard.as_ref()
            && cached.is_fresh()
        {
            return Ok(cached.value.clone());
        }

        let fresh = self.fetch().await?;
        let value = fresh.value.clone();
        *guard = Some(fresh);
        debug!("access token refreshed");
        Ok(value)
    }

    async fn fetch(&self) -> Result<CachedToken, PluvioError> {
        match self.source.as_ref() {
            TokenSource::Metadata => {
                let resp = GoogleAuthEndpoints::fetch_metadata_token(&self.http).await?;
                Ok(CachedToken {
                    value: resp.access_token,
                    expiry: Utc::now() + Duration::seconds(resp.expires_in as i64),
                })
            }
            TokenSource::Refresh(creds) => {
                let resp = GoogleAuthEndpoints::exchange_refresh_token(creds, &self.http).await?;
                let expires_in = resp.expires_in().map(|d| d.as_secs()).unwrap_or(3600);
                Ok(CachedToken {
                    value: resp.access_token().secret().clone(),
                    expiry: Utc::now() + Duration::seconds(expires_in as i64),
                })
            }
        }
    }
}
