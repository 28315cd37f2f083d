use crate::config::STORAGE_UPLOAD_BASE_URL;
use crate::error::PluvioError;
use crate::google_auth::AccessTokenProvider;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::info;
use url::Url;

/// Key/value blob put into the archive bucket. An existing object at the
/// same key is overwritten.
#[async_trait]
pub trait ResultArchive: Send + Sync {
    async fn put_json(&self, key: &str, body: Vec<u8>) -> Result<(), PluvioError>;
}

pub struct GcsArchive {
    http: reqwest::Client,
    tokens: AccessTokenProvider,
    bucket: String,
}

impl GcsArchive {
    pub fn new(
        http: reqwest::Client,
        tokens: AccessTokenProvider,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            http,
            tokens,
            bucket: bucket.into(),
        }
    }

    fn upload_url(&self, key: &str) -> Result<Url, PluvioError> {
        let mut url = STORAGE_UPLOAD_BASE_URL.join(&format!("b/{}/o", self.bucket))?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", key);
        Ok(url)
    }
}

#[async_trait]
impl ResultArchive for GcsArchive {
    async fn put_json(&self, key: &str, body: Vec<u8>) -> Result<(), PluvioError> {
        let token = self.tokens.token().await?;
        let resp = self
            .http
            .post(self.upload_url(key)?)
            .bearer_auth(&token)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| PluvioError::Archive(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(PluvioError::Archive(super::read_api_error(resp).await));
        }
        info!(key, bucket = %self.bucket, "result object archived");
        Ok(())
    }
}
