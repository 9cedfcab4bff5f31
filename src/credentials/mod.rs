//! Repository credentials and their local persistence.

mod store;

pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};

use serde::{Deserialize, Serialize};

/// Coordinates and access token for the remote catalog file.
///
/// Replaced wholesale, never mutated in place.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub owner: String,
    pub repository: String,
    pub catalog_path: String,
    pub access_token: String,
}

impl Credentials {
    /// Checks that every field is filled in.
    ///
    /// All four fields are required, a single empty one is a rejection.
    pub fn validate(&self) -> bool {
        !self.owner.is_empty()
            && !self.repository.is_empty()
            && !self.catalog_path.is_empty()
            && !self.access_token.is_empty()
    }
}

// Manual impl so the token never ends up in logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("owner", &self.owner)
            .field("repository", &self.repository)
            .field("catalog_path", &self.catalog_path)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
