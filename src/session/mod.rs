//! Session state and flow.

mod flow;
mod state;

pub use flow::{Session, SessionError, SessionPhase};
pub use state::{apply, Action, CatalogState};
