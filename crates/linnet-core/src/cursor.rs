//! Opaque pagination cursors.
//!
//! A cursor is `base64(JSON(last evaluated key))`. Callers pass it back
//! verbatim; the key map is ordered so encoding is deterministic.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Error, Result};
use crate::store::StartKey;

/// Encodes a continuation key as a cursor.
pub fn encode(key: &StartKey) -> Result<String> {
    let json = serde_json::to_vec(key)?;
    Ok(STANDARD.encode(json))
}

/// Decodes a cursor back into a continuation key.
pub fn decode(cursor: &str) -> Result<StartKey> {
    let bytes = STANDARD.decode(cursor)?;
    serde_json::from_slice(&bytes).map_err(|e| Error::InvalidCursor(e.to_string()))
}

/// Decodes an optional cursor, treating an empty string as absent.
pub fn decode_optional(cursor: Option<&str>) -> Result<Option<StartKey>> {
    match cursor {
        Some(c) if !c.is_empty() => decode(c).map(Some),
        _ => Ok(None),
    }
}
