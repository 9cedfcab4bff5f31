//! Catalog document model and transport transcoding.
//!
//! The catalog is a single JSON document with four flat record collections.
//! Records are schema-less: the editor never interprets field semantics, it
//! only moves whole collections around.

mod transcode;

pub use transcode::{decode_document, encode_document, DecodeError};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single schema-less record within a collection.
///
/// String keys, arbitrary JSON-compatible values.
pub type Record = serde_json::Map<String, Value>;

/// The four-collection catalog document.
///
/// Missing collections decode as empty, unknown top-level keys are dropped
/// on the next save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub products: Vec<Record>,
    #[serde(default)]
    pub categories: Vec<Record>,
    #[serde(default)]
    pub events: Vec<Record>,
    #[serde(default)]
    pub attributes: Vec<Record>,
}

impl CatalogDocument {
    /// Borrow the records of one named collection.
    pub fn collection(&self, collection: Collection) -> &[Record] {
        match collection {
            Collection::Products => &self.products,
            Collection::Categories => &self.categories,
            Collection::Events => &self.events,
            Collection::Attributes => &self.attributes,
        }
    }

    /// Replace one named collection wholesale.
    ///
    /// Edits are full-collection replacements, never per-record merges.
    pub fn set_collection(&mut self, collection: Collection, records: Vec<Record>) {
        match collection {
            Collection::Products => self.products = records,
            Collection::Categories => self.categories = records,
            Collection::Events => self.events = records,
            Collection::Attributes => self.attributes = records,
        }
    }

    /// Total number of records across all four collections.
    pub fn records_count(&self) -> usize {
        self.products.len() + self.categories.len() + self.events.len() + self.attributes.len()
    }
}

/// One of the four named collections of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Products,
    Categories,
    Events,
    Attributes,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Products,
        Collection::Categories,
        Collection::Events,
        Collection::Attributes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Categories => "categories",
            Collection::Events => "events",
            Collection::Attributes => "attributes",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "products" => Some(Collection::Products),
            "categories" => Some(Collection::Categories),
            "events" => Some(Collection::Events),
            "attributes" => Some(Collection::Attributes),
            _ => None,
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
