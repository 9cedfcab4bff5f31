//! Remote document gateway.
//!
//! Authenticated read and write of the single catalog JSON blob, with the
//! content sha as the optimistic-concurrency token. No retries happen here:
//! every failure is surfaced to the caller for manual re-attempt.

mod github;

pub use github::GitHubGateway;

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::{CatalogDocument, DecodeError};
use crate::credentials::Credentials;

/// Errors surfaced by gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("the remote rejected the credentials")]
    Authentication,

    #[error("the catalog path does not exist on the remote")]
    NotFound,

    #[error("the remote content has advanced past the known sha")]
    Conflict,

    #[error("failed to decode remote content: {0}")]
    Decode(#[from] DecodeError),

    #[error("transport failure: {0}")]
    Network(#[from] reqwest::Error),
}

/// Gateway to the remote catalog document.
///
/// Implementations must not retry on their own; the session flow decides
/// what to do with a failure.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Fetches and decodes the catalog document.
    ///
    /// Returns the document together with the content sha observed on the
    /// remote; every subsequent write must carry that sha.
    async fn fetch_document(
        &self,
        credentials: &Credentials,
    ) -> Result<(CatalogDocument, String), GatewayError>;

    /// Encodes and writes the whole document back as a single commit.
    ///
    /// `expected_sha` is the last sha observed by the caller. A stale value
    /// fails with `Conflict` and leaves the remote content untouched.
    /// Returns the new content sha on success.
    async fn save_document(
        &self,
        credentials: &Credentials,
        document: &CatalogDocument,
        expected_sha: &str,
    ) -> Result<String, GatewayError>;
}
