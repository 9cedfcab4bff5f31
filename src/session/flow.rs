//! Session flow state machine.
//!
//! Unauthenticated -> Loading -> Ready <-> Saving, with logout returning to
//! Unauthenticated. The two rules that matter: local edits are never lost on
//! a failed save, and the content sha is the sole conflict-detection
//! mechanism. There is exactly one writer (this flow); readers only see
//! atomic replacements of the state.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use super::state::{apply, Action, CatalogState};
use crate::catalog::{Collection, Record};
use crate::credentials::{CredentialStore, Credentials};
use crate::gateway::{GatewayError, RemoteGateway};

/// Phase of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unauthenticated,
    Loading,
    Ready,
    Saving,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Unauthenticated => "unauthenticated",
            SessionPhase::Loading => "loading",
            SessionPhase::Ready => "ready",
            SessionPhase::Saving => "saving",
        }
    }

    /// True while a remote request is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionPhase::Loading | SessionPhase::Saving)
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("credential store failure: {0}")]
    CredentialStore(#[source] anyhow::Error),

    #[error("credentials are incomplete, every field must be filled in")]
    InvalidCredentials,

    #[error("no credentials available")]
    NoCredentials,

    #[error("operation not allowed while {0}")]
    NotReady(SessionPhase),
}

/// The session controller: single writer of the catalog state.
///
/// Owns the state, the remote gateway and the credential persistence port.
/// All operations are serialized through `&mut self`; a save triggered
/// while another request is in flight is rejected, never raced.
pub struct Session {
    state: CatalogState,
    phase: SessionPhase,
    gateway: Arc<dyn RemoteGateway>,
    credential_store: Box<dyn CredentialStore>,
}

impl Session {
    pub fn new(gateway: Arc<dyn RemoteGateway>, credential_store: Box<dyn CredentialStore>) -> Self {
        Self {
            state: CatalogState::default(),
            phase: SessionPhase::Unauthenticated,
            gateway,
            credential_store,
        }
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    fn dispatch(&mut self, action: Action) {
        self.state = apply(std::mem::take(&mut self.state), action);
    }

    /// Restores a persisted session, if any.
    ///
    /// Returns true when credentials were found and the catalog loaded.
    /// Absence of persisted credentials is not an error, it is the
    /// unauthenticated initial state.
    pub async fn startup(&mut self) -> Result<bool, SessionError> {
        let credentials = self
            .credential_store
            .load()
            .map_err(SessionError::CredentialStore)?;

        match credentials {
            Some(credentials) => {
                self.run_load(credentials).await?;
                Ok(true)
            }
            None => {
                info!("No persisted credentials, starting unauthenticated");
                Ok(false)
            }
        }
    }

    /// Validates and persists new credentials, then loads the catalog.
    ///
    /// On load failure the credentials stay persisted (so a restart can
    /// retry) but the session returns to unauthenticated.
    pub async fn connect(&mut self, credentials: Credentials) -> Result<(), SessionError> {
        if self.phase.is_busy() {
            return Err(SessionError::NotReady(self.phase));
        }
        if !credentials.validate() {
            return Err(SessionError::InvalidCredentials);
        }

        self.credential_store
            .store(&credentials)
            .map_err(SessionError::CredentialStore)?;

        self.run_load(credentials).await
    }

    /// Re-fetches the catalog with the current credentials, discarding any
    /// local edits. The way out of a stale-sha conflict.
    pub async fn reload(&mut self) -> Result<(), SessionError> {
        if self.phase.is_busy() {
            return Err(SessionError::NotReady(self.phase));
        }

        let credentials = match self.state.credentials.clone() {
            Some(credentials) => credentials,
            None => self
                .credential_store
                .load()
                .map_err(SessionError::CredentialStore)?
                .ok_or(SessionError::NoCredentials)?,
        };

        self.run_load(credentials).await
    }

    async fn run_load(&mut self, credentials: Credentials) -> Result<(), SessionError> {
        self.phase = SessionPhase::Loading;
        self.dispatch(Action::SetCredentials(Some(credentials.clone())));

        match self.gateway.fetch_document(&credentials).await {
            Ok((document, sha)) => {
                info!(
                    "Loaded catalog with {} records, sha {}",
                    document.records_count(),
                    sha
                );
                self.dispatch(Action::LoadCatalog { document, sha });
                self.phase = SessionPhase::Ready;
                Ok(())
            }
            Err(err) => {
                error!("Failed to load catalog: {}", err);
                self.phase = SessionPhase::Unauthenticated;
                Err(err.into())
            }
        }
    }

    /// Replaces one collection with an edited copy. Only valid with a
    /// loaded catalog.
    pub fn update_collection(
        &mut self,
        collection: Collection,
        records: Vec<Record>,
    ) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Ready {
            return Err(SessionError::NotReady(self.phase));
        }
        self.dispatch(Action::UpdateCollection {
            collection,
            records,
        });
        Ok(())
    }

    /// Writes the whole document back with the tracked sha.
    ///
    /// On success the tracked sha becomes exactly the token returned by the
    /// remote. On failure the document and sha are left byte-for-byte
    /// untouched so the user can retry or reload.
    pub async fn save(&mut self) -> Result<String, SessionError> {
        if self.phase != SessionPhase::Ready {
            return Err(SessionError::NotReady(self.phase));
        }

        // Ready implies all three are present; a miss here is a phase bug.
        let (credentials, document, sha) = match (
            self.state.credentials.clone(),
            self.state.document.clone(),
            self.state.sha.clone(),
        ) {
            (Some(credentials), Some(document), Some(sha)) => (credentials, document, sha),
            _ => return Err(SessionError::NotReady(self.phase)),
        };

        self.phase = SessionPhase::Saving;
        let result = self
            .gateway
            .save_document(&credentials, &document, &sha)
            .await;
        self.phase = SessionPhase::Ready;

        match result {
            Ok(new_sha) => {
                info!("Saved catalog, sha {} -> {}", sha, new_sha);
                self.dispatch(Action::SetSha(new_sha.clone()));
                Ok(new_sha)
            }
            Err(err) => {
                warn!("Failed to save catalog, local edits retained: {}", err);
                Err(err.into())
            }
        }
    }

    /// Clears the persisted credentials and discards the session state.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        if self.phase.is_busy() {
            return Err(SessionError::NotReady(self.phase));
        }

        self.credential_store
            .clear()
            .map_err(SessionError::CredentialStore)?;
        self.dispatch(Action::SetCredentials(None));
        self.phase = SessionPhase::Unauthenticated;
        info!("Logged out, session state discarded");
        Ok(())
    }
}
