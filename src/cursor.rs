//! # Cursor Utilities
//!
//! Opaque keyset cursors for `(created_at, id)` ordered listings.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const MAX_CURSOR_LEN: usize = 1000;
const MAX_DECODED_LEN: usize = 500;

/// Position of the last row of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("cursor cannot be empty")]
    Empty,
    #[error("cursor is too long")]
    TooLong,
    #[error("cursor is not valid base64")]
    InvalidEncoding,
    #[error("decoded cursor is too large")]
    TooLarge,
    #[error("cursor contains invalid JSON structure")]
    InvalidStructure,
    #[error("cursor contains invalid ID")]
    NilId,
}

impl PageCursor {
    pub fn new(created_at: DateTime<Utc>, id: Uuid) -> Self {
        Self { created_at, id }
    }

    /// Encode as an opaque base64 string
    pub fn encode(&self) -> String {
        // Two plain fields; serialization cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        base64::engine::general_purpose::STANDARD.encode(json)
    }

    pub fn decode(cursor: &str) -> Result<Self, CursorError> {
        if cursor.is_empty() {
            return Err(CursorError::Empty);
        }
        if cursor.len() > MAX_CURSOR_LEN {
            return Err(CursorError::TooLong);
        }

        let decoded = base64::engine::general_purpose::STANDARD
            .decode(cursor)
            .map_err(|_| CursorError::InvalidEncoding)?;

        if decoded.len() > MAX_DECODED_LEN {
            return Err(CursorError::TooLarge);
        }

        let data: PageCursor =
            serde_json::from_slice(&decoded).map_err(|_| CursorError::InvalidStructure)?;

        if data.id.is_nil() {
            return Err(CursorError::NilId);
        }

        Ok(data)
    }
}

/// One page of a keyset listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Build a page from `limit + 1` fetched rows; the extra row only signals
    /// that another page exists.
    pub fn from_rows<F>(mut rows: Vec<T>, limit: u64, key: F) -> Self
    where
        F: Fn(&T) -> PageCursor,
    {
        let has_more = rows.len() as u64 > limit;
        if has_more {
            rows.truncate(limit as usize);
        }
        let next_cursor = if has_more {
            rows.last().map(|row| key(row).encode())
        } else {
            None
        };
        Self {
            items: rows,
            next_cursor,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_encoding_decoding() {
        let cursor = PageCursor::new(Utc::now(), Uuid::new_v4());

        let decoded = PageCursor::decode(&cursor.encode()).unwrap();

        assert_eq!(decoded, cursor);
    }

    #[test]
    fn test_old_timestamps_are_accepted() {
        // Call logs are listed years back; no age window applies.
        let cursor = PageCursor::new(Utc::now() - chrono::Duration::days(4000), Uuid::new_v4());

        assert!(PageCursor::decode(&cursor.encode()).is_ok());
    }

    #[test]
    fn test_invalid_cursors() {
        assert_eq!(PageCursor::decode(""), Err(CursorError::Empty));
        assert_eq!(
            PageCursor::decode(&"a".repeat(1001)),
            Err(CursorError::TooLong)
        );
        assert_eq!(
            PageCursor::decode("cursor@#$%"),
            Err(CursorError::InvalidEncoding)
        );
        // "invalid json"
        assert_eq!(
            PageCursor::decode("aW52YWxpZCBqc29u"),
            Err(CursorError::InvalidStructure)
        );
    }

    #[test]
    fn test_cursor_decoded_too_large() {
        let padding = "x".repeat(600);
        let json = format!(
            r#"{{"created_at":"2024-01-01T00:00:00Z","id":"550e8400-e29b-41d4-a716-446655440000","pad":"{}"}}"#,
            padding
        );
        let cursor = base64::engine::general_purpose::STANDARD.encode(json.as_bytes());

        assert_eq!(PageCursor::decode(&cursor), Err(CursorError::TooLarge));
    }

    #[test]
    fn test_cursor_nil_uuid() {
        let cursor = PageCursor::new(Utc::now(), Uuid::nil());

        assert_eq!(PageCursor::decode(&cursor.encode()), Err(CursorError::NilId));
    }

    #[test]
    fn test_page_from_rows() {
        let now = Utc::now();
        let rows: Vec<PageCursor> = (0..3)
            .map(|i| PageCursor::new(now + chrono::Duration::seconds(i), Uuid::new_v4()))
            .collect();

        let page = Page::from_rows(rows.clone(), 2, |row| *row);
        assert_eq!(page.items.len(), 2);
        let next = PageCursor::decode(page.next_cursor.as_deref().unwrap()).unwrap();
        assert_eq!(next, rows[1]);

        let last = Page::from_rows(rows, 3, |row| *row);
        assert_eq!(last.items.len(), 3);
        assert!(last.next_cursor.is_none());
    }
}
