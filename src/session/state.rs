//! In-memory catalog state and its reducer.
//!
//! A single authoritative structure holding the credential snapshot, the
//! loaded document and the tracked content sha. All mutation goes through
//! `apply`, a pure function from (state, action) to a new state; consumers
//! only ever see atomic replacements.

use crate::catalog::{CatalogDocument, Collection, Record};
use crate::credentials::Credentials;

/// The catalog state store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    pub credentials: Option<Credentials>,
    pub document: Option<CatalogDocument>,
    pub sha: Option<String>,
}

impl CatalogState {
    /// Borrow one collection's records, if a document is loaded.
    pub fn records(&self, collection: Collection) -> Option<&[Record]> {
        self.document
            .as_ref()
            .map(|document| document.collection(collection))
    }
}

/// The closed set of state mutations.
#[derive(Debug, Clone)]
pub enum Action {
    /// Replaces the credential snapshot and clears any loaded document,
    /// forcing a reload.
    SetCredentials(Option<Credentials>),

    /// Replaces all four collections and the tracked sha atomically.
    LoadCatalog {
        document: CatalogDocument,
        sha: String,
    },

    /// Replaces one named collection wholesale. A no-op when no document
    /// is loaded.
    UpdateCollection {
        collection: Collection,
        records: Vec<Record>,
    },

    /// Updates the tracked sha after a successful save. A no-op when no
    /// document is loaded.
    SetSha(String),
}

/// Applies an action, producing the next state.
pub fn apply(state: CatalogState, action: Action) -> CatalogState {
    match action {
        Action::SetCredentials(credentials) => CatalogState {
            credentials,
            document: None,
            sha: None,
        },
        Action::LoadCatalog { document, sha } => CatalogState {
            document: Some(document),
            sha: Some(sha),
            ..state
        },
        Action::UpdateCollection {
            collection,
            records,
        } => {
            let mut state = state;
            if let Some(document) = state.document.as_mut() {
                document.set_collection(collection, records);
            }
            state
        }
        Action::SetSha(sha) => {
            if state.document.is_some() {
                CatalogState {
                    sha: Some(sha),
                    ..state
                }
            } else {
                state
            }
        }
    }
}
