//! Document encoding: raw bytes → base64 text for the JSON request body.
//!
//! The rendering service expects bare base64 in `fileData`, never a
//! `data:<mime>;base64,` URI. The body is always encoded as-is, whatever it
//! contains, so decoding `fileData` gives back the exact source bytes. Any
//! media-type prefix on the encoder output is removed before it is sent.

use crate::error::DocumentFailure;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static DATA_URI_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:[^,;]*(?:;[^,;=]+=[^,;]*)*;base64,").unwrap());

/// Strip a leading `data:<mime>;base64,` prefix from encoded text, if present.
pub fn strip_data_uri_prefix(text: &str) -> &str {
    match DATA_URI_PREFIX.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

/// Encode a fetched body as base64 text suitable for `fileData`.
///
/// # Errors
/// [`DocumentFailure::Encoding`] when the body is empty or the encoded text
/// comes out empty.
pub fn encode_document(bytes: &[u8]) -> Result<String, DocumentFailure> {
    if bytes.is_empty() {
        return Err(DocumentFailure::Encoding {
            reason: "source returned an empty body".to_string(),
        });
    }

    let encoded = STANDARD.encode(bytes);
    let bare = strip_data_uri_prefix(&encoded);
    debug!("Encoded {} bytes → {} bytes base64", bytes.len(), bare.len());
    if bare.is_empty() {
        return Err(DocumentFailure::Encoding {
            reason: "base64 encoding produced no output".to_string(),
        });
    }
    Ok(bare.to_string())
}
