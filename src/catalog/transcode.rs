//! Transport encoding of the catalog document.
//!
//! The remote stores the document as base64-wrapped JSON. Encoding is
//! deterministic (compact JSON, standard base64 alphabet); decoding accepts
//! the line-wrapped base64 the GitHub contents API actually returns.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

use super::CatalogDocument;

/// Errors that can occur while decoding remote content.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("content is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("content is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("content is not a valid catalog document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialize a document to its transport representation (JSON + base64).
pub fn encode_document(document: &CatalogDocument) -> String {
    // A CatalogDocument always serializes cleanly, there are no non-string
    // keys or non-finite numbers in it.
    let json = serde_json::to_string(document).expect("catalog document serialization failed");
    BASE64.encode(json.as_bytes())
}

/// Decode a transport payload back into a document.
///
/// The GitHub contents API wraps base64 at 60 columns, so ASCII whitespace
/// is stripped before decoding.
pub fn decode_document(content: &str) -> Result<CatalogDocument, DecodeError> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = BASE64.decode(compact.as_bytes())?;
    let text = String::from_utf8(bytes)?;
    let document = serde_json::from_str(&text)?;
    Ok(document)
}
