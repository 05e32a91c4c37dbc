// src/pagination/cursor.rs

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Order, SortKey};

/// Wire form of a cursor: ordering tag + rendered sort key + tiebreak id,
/// serialized as compact JSON and base64url-encoded. The cursor only carries
/// values from a row the caller was already served, so handing it back does
/// not leak anything across authorization boundaries.
#[derive(Debug, Serialize, Deserialize)]
struct CursorPayload {
    o: Order,
    k: String,
    id: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CursorError {
    /// The cursor string is not one this codec produced.
    Malformed,
    /// The cursor was issued under a different ordering than the request's.
    OrderingMismatch { expected: Order, found: Order },
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorError::Malformed => write!(f, "malformed pagination cursor"),
            CursorError::OrderingMismatch { expected, found } => write!(
                f,
                "cursor was issued under ordering {found:?} but the request uses {expected:?}"
            ),
        }
    }
}

impl std::error::Error for CursorError {}

/// Encodes the position of the last row of a page.
pub fn encode_cursor(order: Order, key: &SortKey, id: &str) -> String {
    let payload = CursorPayload {
        o: order,
        k: key.render(),
        id: id.to_string(),
    };
    // Serializing a struct of plain strings cannot fail.
    let json = serde_json::to_vec(&payload).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Decodes a cursor, rejecting it when it was not issued under `expected`.
pub fn decode_cursor(raw: &str, expected: Order) -> Result<(SortKey, String), CursorError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(raw)
        .map_err(|_| CursorError::Malformed)?;
    let payload: CursorPayload =
        serde_json::from_slice(&bytes).map_err(|_| CursorError::Malformed)?;

    if payload.o != expected {
        return Err(CursorError::OrderingMismatch {
            expected,
            found: payload.o,
        });
    }

    let key = SortKey::parse(expected, &payload.k)?;
    Ok((key, payload.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const ALL_ORDERS: [Order; 4] = [
        Order::CreatedAtDesc,
        Order::CreatedAtAsc,
        Order::TitleAsc,
        Order::TitleDesc,
    ];

    fn key_for(order: Order) -> SortKey {
        if order.sorts_by_title() {
            SortKey::Title("Trivsel i 7.B".to_string())
        } else {
            SortKey::CreatedAt(Utc.with_ymd_and_hms(2024, 11, 2, 9, 15, 42).unwrap())
        }
    }

    #[test]
    fn round_trip_for_every_ordering() {
        for order in ALL_ORDERS {
            let key = key_for(order);
            let cursor = encode_cursor(order, &key, "aB3dE5fG7h");
            let (decoded_key, decoded_id) = decode_cursor(&cursor, order).unwrap();
            assert_eq!(decoded_key, key);
            assert_eq!(decoded_id, "aB3dE5fG7h");
        }
    }

    #[test]
    fn ordering_mismatch_is_rejected() {
        let key = key_for(Order::CreatedAtDesc);
        let cursor = encode_cursor(Order::CreatedAtDesc, &key, "aB3dE5fG7h");
        let err = decode_cursor(&cursor, Order::TitleAsc).unwrap_err();
        assert_eq!(
            err,
            CursorError::OrderingMismatch {
                expected: Order::TitleAsc,
                found: Order::CreatedAtDesc,
            }
        );
    }

    #[test]
    fn malformed_cursors_are_rejected() {
        for raw in ["", "!!!", "bm90IGpzb24", "eyJvIjoibm9wZSJ9"] {
            let err = decode_cursor(raw, Order::CreatedAtDesc).unwrap_err();
            assert_eq!(err, CursorError::Malformed, "input {raw:?}");
        }
    }

    #[test]
    fn timestamp_key_survives_microseconds() {
        let ts = Utc
            .timestamp_opt(1_730_540_142, 123_456_000)
            .single()
            .unwrap();
        let key = SortKey::CreatedAt(ts);
        let cursor = encode_cursor(Order::CreatedAtAsc, &key, "x");
        let (decoded, _) = decode_cursor(&cursor, Order::CreatedAtAsc).unwrap();
        assert_eq!(decoded, key);
    }

    #[test]
    fn cursor_is_url_safe() {
        let key = SortKey::Title("æøå / ?&=".to_string());
        let cursor = encode_cursor(Order::TitleDesc, &key, "id");
        assert!(
            cursor
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
