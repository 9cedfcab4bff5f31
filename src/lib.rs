//! Catalog Editor Library
//!
//! Core of a GitHub-backed catalog editor: credential persistence, the
//! remote document gateway and the session state machine. Exposed for
//! integration tests and potential reuse; the interactive shell in the
//! binary is just one consumer of this library.

pub mod catalog;
pub mod cli_style;
pub mod config;
pub mod credentials;
pub mod gateway;
pub mod session;
pub mod shell;

// Re-export commonly used types for convenience
pub use catalog::{CatalogDocument, Collection, Record};
pub use credentials::{CredentialStore, Credentials, FileCredentialStore};
pub use gateway::{GatewayError, GitHubGateway, RemoteGateway};
pub use session::{Session, SessionError, SessionPhase};
