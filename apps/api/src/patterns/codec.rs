//! Wire codec for the two payload kinds held in the remote store:
//!
//! - record `pattern_{id}`: `{"data","timestamp","owner","interactionType","intensity"}`
//! - index `pattern_keys`: `["<id>", ...]`
//!
//! Both are UTF-8 JSON. The record payload never carries its own id.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::patterns::models::{InteractionType, Pattern, DEFAULT_INTENSITY, MAX_INTENSITY};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("empty payload")]
    Empty,

    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("intensity {0} is above 100")]
    IntensityOutOfRange(u8),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordOut<'a> {
    data: &'a str,
    timestamp: i64,
    owner: &'a str,
    interaction_type: InteractionType,
    intensity: u8,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordIn {
    data: String,
    timestamp: i64,
    owner: String,
    interaction_type: InteractionType,
    #[serde(default = "default_intensity")]
    intensity: u8,
}

fn default_intensity() -> u8 {
    DEFAULT_INTENSITY
}

pub fn encode_pattern(pattern: &Pattern) -> Bytes {
    let record = RecordOut {
        data: &pattern.data,
        timestamp: pattern.timestamp,
        owner: &pattern.owner,
        interaction_type: pattern.interaction_type,
        intensity: pattern.intensity,
    };
    // Serializing plain strings and integers cannot fail.
    Bytes::from(serde_json::to_vec(&record).unwrap_or_default())
}

/// Decodes the record stored under `pattern_{id}`.
pub fn decode_pattern(id: &str, bytes: &[u8]) -> Result<Pattern, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    let record: RecordIn = serde_json::from_slice(bytes)?;
    if record.intensity > MAX_INTENSITY {
        return Err(DecodeError::IntensityOutOfRange(record.intensity));
    }
    Ok(Pattern {
        id: id.to_string(),
        data: record.data,
        timestamp: record.timestamp,
        owner: record.owner,
        interaction_type: record.interaction_type,
        intensity: record.intensity,
    })
}

pub fn encode_index(ids: &[String]) -> Bytes {
    Bytes::from(serde_json::to_vec(ids).unwrap_or_default())
}

/// Zero-length or malformed input decodes to an empty list.
pub fn decode_index(bytes: &[u8]) -> Vec<String> {
    if bytes.is_empty() {
        return Vec::new();
    }
    serde_json::from_slice(bytes).unwrap_or_else(|e| {
        warn!("Index payload is unreadable, treating as empty: {e}");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Pattern {
        Pattern {
            id: "1700000000000-k3j9x2a".to_string(),
            data: "FHE-eyJhIjoxfQ==".to_string(),
            timestamp: 1_700_000_000,
            owner: "0x71c7656ec7ab88b098defb751b7401b5f6d8976f".to_string(),
            interaction_type: InteractionType::ConcentricCircles,
            intensity: 0,
        }
    }

    #[test]
    fn test_pattern_round_trip() {
        let p = sample();
        assert_eq!(decode_pattern(&p.id, &encode_pattern(&p)).unwrap(), p);
    }

    #[test]
    fn test_record_wire_shape() {
        let bytes = encode_pattern(&sample());
        let text = std::str::from_utf8(&bytes).unwrap();
        assert_eq!(
            text,
            r#"{"data":"FHE-eyJhIjoxfQ==","timestamp":1700000000,"owner":"0x71c7656ec7ab88b098defb751b7401b5f6d8976f","interactionType":"Concentric Circles","intensity":0}"#
        );
    }

    #[test]
    fn test_missing_intensity_defaults_to_fifty() {
        let raw = br#"{"data":"x","timestamp":5,"owner":"o","interactionType":"Wave Pattern"}"#;
        assert_eq!(decode_pattern("a", raw).unwrap().intensity, 50);
    }

    #[test]
    fn test_decode_rejects_bad_records() {
        assert!(matches!(decode_pattern("a", b""), Err(DecodeError::Empty)));
        assert!(matches!(
            decode_pattern("a", b"not json"),
            Err(DecodeError::Json(_))
        ));
        let unknown = br#"{"data":"x","timestamp":5,"owner":"o","interactionType":"Strobe"}"#;
        assert!(decode_pattern("a", unknown).is_err());
        let hot = br#"{"data":"x","timestamp":5,"owner":"o","interactionType":"Wave Pattern","intensity":180}"#;
        assert!(matches!(
            decode_pattern("a", hot),
            Err(DecodeError::IntensityOutOfRange(180))
        ));
    }

    #[test]
    fn test_index_round_trip_preserves_order_and_duplicates() {
        let ids = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(decode_index(&encode_index(&ids)), ids);
        assert_eq!(&encode_index(&ids)[..], br#"["b","a","b"]"#);
    }

    #[test]
    fn test_index_decode_fails_open() {
        assert!(decode_index(b"").is_empty());
        assert!(decode_index(b"{\"not\":\"a list\"}").is_empty());
        assert!(decode_index(b"[1, 2").is_empty());
        assert!(decode_index(&encode_index(&[])).is_empty());
    }
}
