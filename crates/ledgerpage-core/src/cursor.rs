//! Opaque pagination cursors
//!
//! A cursor is the standard base64 encoding of a row id written as a decimal
//! string. Callers must treat it as opaque; only this module knows the byte
//! format.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Opaque continuation token pointing at one row id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Encode a row id as a cursor
    pub fn encode(id: i64) -> Self {
        Cursor(STANDARD.encode(id.to_string()))
    }

    /// Decode a cursor token back into a row id.
    ///
    /// Only tokens produced by [`Cursor::encode`] for non-negative ids are
    /// accepted; anything else is `CoreError::InvalidCursor`.
    pub fn decode(token: &str) -> CoreResult<i64> {
        let invalid = |reason: &str| CoreError::InvalidCursor {
            cursor: token.to_string(),
            reason: reason.to_string(),
        };

        let bytes = STANDARD
            .decode(token)
            .map_err(|_| invalid("cursor is not valid base64"))?;
        let text = String::from_utf8(bytes).map_err(|_| invalid("cursor is not valid UTF-8"))?;

        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("cursor does not encode a numeric id"));
        }

        text.parse::<i64>()
            .map_err(|_| invalid("cursor id is out of range"))
    }

    /// Check whether a token decodes to an id
    pub fn is_valid(token: &str) -> bool {
        Self::decode(token).is_ok()
    }

    /// Row id this cursor points at
    pub fn id(&self) -> CoreResult<i64> {
        Self::decode(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Cursor> for String {
    fn from(cursor: Cursor) -> Self {
        cursor.0
    }
}
