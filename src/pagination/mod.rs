// src/pagination/mod.rs

pub mod cursor;

use std::cmp::Ordering;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub use cursor::{CursorError, decode_cursor, encode_cursor};

/// Sort order for listings. Every variant maps to a strict total order:
/// the named column first, then the row id as tiebreak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Order {
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
    TitleAsc,
    TitleDesc,
}

impl Order {
    pub fn is_descending(self) -> bool {
        matches!(self, Order::CreatedAtDesc | Order::TitleDesc)
    }

    pub fn sorts_by_title(self) -> bool {
        matches!(self, Order::TitleAsc | Order::TitleDesc)
    }
}

/// Typed sort key value carried by a cursor and extracted from rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    CreatedAt(DateTime<Utc>),
    Title(String),
}

impl SortKey {
    /// String form stored inside a cursor. RFC 3339 with microseconds for
    /// timestamps, so the round trip is lossless for Postgres values.
    pub fn render(&self) -> String {
        match self {
            SortKey::CreatedAt(ts) => ts.to_rfc3339_opts(SecondsFormat::Micros, true),
            SortKey::Title(title) => title.clone(),
        }
    }

    /// Parses a rendered key back, using the ordering to pick the key kind.
    pub fn parse(order: Order, raw: &str) -> Result<Self, CursorError> {
        if order.sorts_by_title() {
            Ok(SortKey::Title(raw.to_string()))
        } else {
            let ts = DateTime::parse_from_rfc3339(raw).map_err(|_| CursorError::Malformed)?;
            Ok(SortKey::CreatedAt(ts.with_timezone(&Utc)))
        }
    }

    /// Total comparison between keys of the same kind. Cursor decoding
    /// guarantees the kinds match before this is ever called.
    pub fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::CreatedAt(a), SortKey::CreatedAt(b)) => a.cmp(b),
            (SortKey::Title(a), SortKey::Title(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Page shape for the offset-paginated dashboard listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetPage<T> {
    pub items: Vec<T>,
    pub current_page: i64,
    pub total_pages: i64,
}

/// Page shape for keyset-paginated listings. `next_cursor` is only present
/// when `has_more` is true.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeysetPage<T> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sort_key_render_parse_round_trip() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 5).unwrap();
        let key = SortKey::CreatedAt(ts);
        let parsed = SortKey::parse(Order::CreatedAtDesc, &key.render()).unwrap();
        assert_eq!(parsed, key);

        let key = SortKey::Title("Midterm evaluation".to_string());
        let parsed = SortKey::parse(Order::TitleAsc, &key.render()).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn garbled_timestamp_key_is_malformed() {
        let err = SortKey::parse(Order::CreatedAtAsc, "not-a-timestamp").unwrap_err();
        assert!(matches!(err, CursorError::Malformed));
    }

    #[test]
    fn compare_orders_timestamps() {
        let early = SortKey::CreatedAt(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let late = SortKey::CreatedAt(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(early.compare(&late), Ordering::Less);
        assert_eq!(late.compare(&early), Ordering::Greater);
    }
}
