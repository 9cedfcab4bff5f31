//! Common test infrastructure
//!
//! Provides a fake GitHub contents API server plus fixture helpers, so the
//! end-to-end tests can exercise the real gateway and session flow against
//! an in-process remote.

#![allow(dead_code)]

mod remote;

pub use remote::FakeRemote;

use catalog_editor::catalog::{CatalogDocument, Record};
use catalog_editor::credentials::Credentials;
use serde_json::json;

pub const ACCESS_TOKEN: &str = "test-access-token";
pub const OWNER: &str = "octocat";
pub const REPOSITORY: &str = "catalog-repo";
pub const CATALOG_PATH: &str = "src/main/resources/catalog.json";

pub fn record(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("expected a JSON object"),
    }
}

/// The catalog from the concrete load/edit/save scenario:
/// one product named "A", everything else empty.
pub fn initial_document() -> CatalogDocument {
    CatalogDocument {
        products: vec![record(json!({"id": 1, "name": "A"}))],
        ..Default::default()
    }
}

pub fn edited_document() -> CatalogDocument {
    CatalogDocument {
        products: vec![record(json!({"id": 1, "name": "B"}))],
        ..Default::default()
    }
}

/// Credentials matching what the fake remote expects.
pub fn valid_credentials() -> Credentials {
    Credentials {
        owner: OWNER.to_string(),
        repository: REPOSITORY.to_string(),
        catalog_path: CATALOG_PATH.to_string(),
        access_token: ACCESS_TOKEN.to_string(),
    }
}
