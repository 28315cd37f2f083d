use crate::config::{GOOGLE_AUTH_URL, GOOGLE_TOKEN_URI, METADATA_TOKEN_URL};
use crate::error::PluvioError;
use crate::google_auth::token::RefreshCredentials;

use oauth2::{
    AuthUrl, Client as OAuth2Client, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
    RefreshToken, StandardRevocableToken, TokenUrl,
    basic::{
        BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
        BasicTokenResponse,
    },
};
use serde::Deserialize;
use tracing::debug;

/// Stateless token endpoints.
pub(super) struct GoogleAuthEndpoints;

impl GoogleAuthEndpoints {
    /// Exchange a long-lived refresh token for a fresh access token.
    pub(super) async fn exchange_refresh_token(
        creds: &RefreshCredentials,
        http_client: &reqwest::Client,
    ) -> Result<BasicTokenResponse, PluvioError> {
        let client = build_oauth2_client(creds)?;
        let token_result = client
            .exchange_refresh_token(&RefreshToken::new(creds.refresh_token.clone()))
            .request_async(http_client)
            .await
            .map_err(|e| PluvioError::Token(e.to_string()))?;
        debug!("access token exchanged via refresh token");
        Ok(token_result)
    }

    /// Fetch the default service-account token from the metadata server.
    pub(super) async fn fetch_metadata_token(
        http_client: &reqwest::Client,
    ) -> Result<MetadataTokenResponse, PluvioError> {
        let resp = http_client
            .get(METADATA_TOKEN_URL.as_str())
            .header("Metadata-Flavor", "Google")
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct MetadataTokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

fn build_oauth2_client(creds: &RefreshCredentials) -> Result<GoogleOauth2Client, PluvioError> {
    let client = OAuth2Client::new(ClientId::new(creds.client_id.clone()))
        .set_client_secret(ClientSecret::new(creds.client_secret.clone()))
        .set_auth_uri(AuthUrl::new(GOOGLE_AUTH_URL.as_str().to_string())?)
        .set_token_uri(TokenUrl::new(GOOGLE_TOKEN_URI.as_str().to_string())?);
    Ok(client)
}

pub(super) type GoogleOauth2Client = OAuth2Client<
    BasicErrorResponse,
    BasicTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;
