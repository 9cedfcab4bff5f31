//! GitHub contents API implementation of the remote gateway.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{GatewayError, RemoteGateway};
use crate::catalog::{decode_document, encode_document, CatalogDocument};
use crate::credentials::Credentials;

/// GET /repos/{owner}/{repo}/contents/{path} response, reduced to the
/// fields the editor cares about.
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

/// PUT /repos/{owner}/{repo}/contents/{path} request body.
#[derive(Debug, Serialize)]
struct UpdateFileRequest<'a> {
    message: &'a str,
    content: String,
    sha: &'a str,
}

/// PUT response; the new content sha lives under `content.sha`.
#[derive(Debug, Deserialize)]
struct UpdateFileResponse {
    content: UpdatedContent,
}

#[derive(Debug, Deserialize)]
struct UpdatedContent {
    sha: String,
}

/// Remote gateway backed by the GitHub contents API.
#[derive(Clone)]
pub struct GitHubGateway {
    client: Client,
    base_url: String,
    commit_message: String,
}

impl GitHubGateway {
    /// Create a new gateway.
    ///
    /// # Arguments
    /// * `base_url` - API root (e.g., "https://api.github.com")
    /// * `timeout_sec` - Request timeout in seconds
    /// * `commit_message` - Fixed commit message used for every save
    pub fn new(
        base_url: String,
        timeout_sec: u64,
        commit_message: String,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            // GitHub rejects requests without a User-Agent.
            .user_agent(concat!("catalog-editor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            commit_message,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn contents_url(&self, credentials: &Credentials) -> String {
        // The catalog path may contain slashes that must survive as segment
        // separators, so each segment is encoded on its own.
        let path = credentials
            .catalog_path
            .trim_start_matches('/')
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url,
            urlencoding::encode(&credentials.owner),
            urlencoding::encode(&credentials.repository),
            path
        )
    }

    fn auth_header(credentials: &Credentials) -> String {
        format!("Basic {}", BASE64.encode(credentials.access_token.as_bytes()))
    }

    /// Maps a non-success status to the gateway error taxonomy.
    ///
    /// The contents API answers a stale sha with 409, historically 422.
    /// Anything else unexpected collapses into `Network` via
    /// `error_for_status`.
    fn check_status(response: Response) -> Result<Response, GatewayError> {
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(GatewayError::Authentication),
            StatusCode::NOT_FOUND => Err(GatewayError::NotFound),
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => Err(GatewayError::Conflict),
            _ => Ok(response.error_for_status()?),
        }
    }
}

#[async_trait]
impl RemoteGateway for GitHubGateway {
    async fn fetch_document(
        &self,
        credentials: &Credentials,
    ) -> Result<(CatalogDocument, String), GatewayError> {
        let url = self.contents_url(credentials);
        debug!("Fetching catalog document from {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, Self::auth_header(credentials))
            .send()
            .await?;

        let response = Self::check_status(response)?;
        let body: ContentsResponse = response.json().await?;
        let document = decode_document(&body.content)?;

        Ok((document, body.sha))
    }

    async fn save_document(
        &self,
        credentials: &Credentials,
        document: &CatalogDocument,
        expected_sha: &str,
    ) -> Result<String, GatewayError> {
        let url = self.contents_url(credentials);
        debug!("Saving catalog document to {}", url);

        let body = UpdateFileRequest {
            message: &self.commit_message,
            content: encode_document(document),
            sha: expected_sha,
        };

        let response = self
            .client
            .put(&url)
            .header(reqwest::header::AUTHORIZATION, Self::auth_header(credentials))
            .json(&body)
            .send()
            .await?;

        let response = Self::check_status(response)?;
        let body: UpdateFileResponse = response.json().await?;

        Ok(body.content.sha)
    }
}
