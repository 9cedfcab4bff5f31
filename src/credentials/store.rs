//! Persistence port for credentials.
//!
//! The session flow only talks to the `CredentialStore` trait so tests can
//! inject an in-memory fake. The durable implementation is a single JSON
//! file: its absence is the signal for the unauthenticated initial state.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};

use super::Credentials;

/// Local durable storage for the credential snapshot.
pub trait CredentialStore: Send + Sync {
    /// Returns the persisted credentials, or Ok(None) if none were saved.
    fn load(&self) -> Result<Option<Credentials>>;

    /// Persists the credentials, replacing any previous snapshot.
    fn store(&self, credentials: &Credentials) -> Result<()>;

    /// Removes the persisted credentials. A no-op if none were saved.
    fn clear(&self) -> Result<()>;
}

/// Credential store backed by a single JSON file on disk.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credentials>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read credentials file: {:?}", self.path))
            }
        };
        let credentials = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse credentials file: {:?}", self.path))?;
        Ok(Some(credentials))
    }

    fn store(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create credentials directory: {:?}", parent)
                })?;
            }
        }
        let content = serde_json::to_string_pretty(credentials)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write credentials file: {:?}", self.path))
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to remove credentials file: {:?}", self.path)),
        }
    }
}

/// In-memory credential store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryCredentialStore {
    credentials: Mutex<Option<Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials: Mutex::new(Some(credentials)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credentials>> {
        Ok(self.credentials.lock().unwrap().clone())
    }

    fn store(&self, credentials: &Credentials) -> Result<()> {
        *self.credentials.lock().unwrap() = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.credentials.lock().unwrap() = None;
        Ok(())
    }
}
