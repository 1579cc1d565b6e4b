//! Textual wire representation of frames.
//!
//! A frame is a JSON object. Byte fields are standard base64 strings,
//! `index` is a non-negative integer, `timestamp` is any finite JSON number
//! and `type` selects the variant:
//!
//! | type                    | variant fields                        |
//! |-------------------------|---------------------------------------|
//! | `payload`               | `payload`                             |
//! | `trust-exchange`        | `targetIdentifier`                    |
//! | `trust-acceptance`      | `sourceHash`, `sourceIdentifier`      |
//! | `public-key-acceptance` | `payload`                             |
//! | `hash`                  | none                                  |
//!
//! Every frame carries `hash` and may carry `nonce` and `timestamp`. An
//! appended frame additionally carries `index` and `previousHash`. Absent
//! fields are omitted, never written as null, and a field that the variant
//! does not define is rejected on decode.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde_json::{Map, Value};

use crate::error::RepresentationError;
use crate::frame::{AppendedFrame, Frame, FrameBody, FrameKind};
use crate::types::{Address, Timestamp};

/// Field names of the wire representation.
pub mod fields {
    pub const HASH: &str = "hash";
    pub const NONCE: &str = "nonce";
    pub const TIMESTAMP: &str = "timestamp";
    pub const TYPE: &str = "type";
    pub const PAYLOAD: &str = "payload";
    pub const TARGET_IDENTIFIER: &str = "targetIdentifier";
    pub const SOURCE_HASH: &str = "sourceHash";
    pub const SOURCE_IDENTIFIER: &str = "sourceIdentifier";
    pub const INDEX: &str = "index";
    pub const PREVIOUS_HASH: &str = "previousHash";
}

/// Variant fields, checked against each kind's allowed set on decode.
const VARIANT_FIELDS: [&str; 4] = [
    fields::PAYLOAD,
    fields::TARGET_IDENTIFIER,
    fields::SOURCE_HASH,
    fields::SOURCE_IDENTIFIER,
];

type Result<T> = std::result::Result<T, RepresentationError>;

/// Encode a frame.
pub fn frame_to_representation(frame: &Frame) -> Value {
    Value::Object(frame_fields(frame))
}

/// Encode an appended frame, including its chain position and link.
pub fn appended_to_representation(frame: &AppendedFrame) -> Value {
    let mut object = frame_fields(&frame.frame);
    object.insert(fields::INDEX.to_string(), Value::from(frame.index));
    object.insert(
        fields::PREVIOUS_HASH.to_string(),
        encode_bytes(&frame.previous_hash),
    );
    Value::Object(object)
}

/// Decode a frame. Linkage fields, if present, are ignored.
pub fn frame_from_representation(value: &Value) -> Result<Frame> {
    let object = value.as_object().ok_or(RepresentationError::NotAnObject)?;
    decode_frame(object)
}

/// Decode an appended frame. `index` and `previousHash` are required.
pub fn appended_from_representation(value: &Value) -> Result<AppendedFrame> {
    let object = value.as_object().ok_or(RepresentationError::NotAnObject)?;
    let frame = decode_frame(object)?;
    let index = optional_index(object, fields::INDEX)?.ok_or(RepresentationError::MissingField {
        field: fields::INDEX,
    })?;
    let previous_hash = required_bytes(object, fields::PREVIOUS_HASH)?;
    Ok(AppendedFrame {
        frame,
        index,
        previous_hash,
    })
}

/// Encode an appended frame as one line of JSON text, without the newline.
pub fn encode_line(frame: &AppendedFrame) -> String {
    appended_to_representation(frame).to_string()
}

/// Decode one line of JSON text into an appended frame.
///
/// Accepts raw bytes as read from storage; invalid UTF-8 is a malformed
/// representation.
pub fn decode_line(line: impl AsRef<[u8]>) -> Result<AppendedFrame> {
    let value: Value = serde_json::from_slice(line.as_ref())?;
    appended_from_representation(&value)
}

fn frame_fields(frame: &Frame) -> Map<String, Value> {
    let mut object = Map::new();
    object.insert(fields::HASH.to_string(), encode_bytes(&frame.hash));
    if let Some(nonce) = &frame.nonce {
        object.insert(fields::NONCE.to_string(), encode_bytes(nonce));
    }
    if let Some(timestamp) = &frame.timestamp {
        object.insert(
            fields::TIMESTAMP.to_string(),
            Value::Number(timestamp.as_number().clone()),
        );
    }
    object.insert(
        fields::TYPE.to_string(),
        Value::String(frame.kind().as_str().to_string()),
    );

    match &frame.body {
        FrameBody::Payload { payload } | FrameBody::PublicKeyAcceptance { payload } => {
            object.insert(fields::PAYLOAD.to_string(), encode_bytes(payload));
        }
        FrameBody::TrustExchange { target_identifier } => {
            object.insert(
                fields::TARGET_IDENTIFIER.to_string(),
                Value::String(target_identifier.as_str().to_string()),
            );
        }
        FrameBody::TrustAcceptance {
            source_hash,
            source_identifier,
        } => {
            object.insert(fields::SOURCE_HASH.to_string(), encode_bytes(source_hash));
            object.insert(
                fields::SOURCE_IDENTIFIER.to_string(),
                Value::String(source_identifier.as_str().to_string()),
            );
        }
        FrameBody::Hash => {}
    }

    object
}

fn decode_frame(object: &Map<String, Value>) -> Result<Frame> {
    let hash = required_bytes(object, fields::HASH)?;
    let nonce = optional_bytes(object, fields::NONCE)?;
    let timestamp = optional_timestamp(object, fields::TIMESTAMP)?;

    let tag = optional_string(object, fields::TYPE)?.ok_or(RepresentationError::MissingField {
        field: fields::TYPE,
    })?;
    let kind =
        FrameKind::from_tag(tag).ok_or_else(|| RepresentationError::UnknownType(tag.to_string()))?;

    let body = match kind {
        FrameKind::Payload => {
            reject_undefined(object, kind, &[fields::PAYLOAD])?;
            FrameBody::Payload {
                payload: required_bytes(object, fields::PAYLOAD)?,
            }
        }
        FrameKind::TrustExchange => {
            reject_undefined(object, kind, &[fields::TARGET_IDENTIFIER])?;
            FrameBody::TrustExchange {
                target_identifier: required_address(object, fields::TARGET_IDENTIFIER)?,
            }
        }
        FrameKind::TrustAcceptance => {
            reject_undefined(object, kind, &[fields::SOURCE_HASH, fields::SOURCE_IDENTIFIER])?;
            FrameBody::TrustAcceptance {
                source_hash: required_bytes(object, fields::SOURCE_HASH)?,
                source_identifier: required_address(object, fields::SOURCE_IDENTIFIER)?,
            }
        }
        FrameKind::PublicKeyAcceptance => {
            reject_undefined(object, kind, &[fields::PAYLOAD])?;
            FrameBody::PublicKeyAcceptance {
                payload: required_bytes(object, fields::PAYLOAD)?,
            }
        }
        FrameKind::Hash => {
            reject_undefined(object, kind, &[])?;
            FrameBody::Hash
        }
    };

    Ok(Frame {
        hash,
        nonce,
        timestamp,
        body,
    })
}

fn reject_undefined(object: &Map<String, Value>, kind: FrameKind, allowed: &[&str]) -> Result<()> {
    match VARIANT_FIELDS
        .iter()
        .copied()
        .find(|field| !allowed.contains(field) && object.contains_key(*field))
    {
        Some(field) => Err(RepresentationError::FieldNotAllowed { field, kind }),
        None => Ok(()),
    }
}

fn encode_bytes(bytes: &[u8]) -> Value {
    Value::String(STANDARD.encode(bytes))
}

fn optional_string<'a>(object: &'a Map<String, Value>, field: &'static str) -> Result<Option<&'a str>> {
    match object.get(field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(RepresentationError::InvalidString { field }),
    }
}

fn required_address(object: &Map<String, Value>, field: &'static str) -> Result<Address> {
    optional_string(object, field)?
        .map(Address::from)
        .ok_or(RepresentationError::MissingField { field })
}

fn optional_bytes(object: &Map<String, Value>, field: &'static str) -> Result<Option<Bytes>> {
    optional_string(object, field)?
        .map(|encoded| {
            STANDARD
                .decode(encoded)
                .map(Bytes::from)
                .map_err(|source| RepresentationError::InvalidBytes { field, source })
        })
        .transpose()
}

fn required_bytes(object: &Map<String, Value>, field: &'static str) -> Result<Bytes> {
    optional_bytes(object, field)?.ok_or(RepresentationError::MissingField { field })
}

fn optional_timestamp(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<Timestamp>> {
    match object.get(field) {
        None => Ok(None),
        Some(Value::Number(number)) => Ok(Some(Timestamp::from(number.clone()))),
        Some(_) => Err(RepresentationError::InvalidNumber { field }),
    }
}

fn optional_index(object: &Map<String, Value>, field: &'static str) -> Result<Option<u64>> {
    match object.get(field) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or(RepresentationError::InvalidNumber { field }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn acceptance() -> Frame {
        Frame::new(
            Bytes::from_static(b"accept-hash"),
            FrameBody::TrustAcceptance {
                source_hash: Bytes::from_static(b"offer-hash"),
                source_identifier: Address::new("https://a.example"),
            },
        )
        .with_nonce(Bytes::from_static(b"nonce"))
        .with_timestamp(1736870400000)
    }

    #[test]
    fn test_encode_omits_absent_fields() {
        let frame = Frame::new(Bytes::from_static(b"h"), FrameBody::Hash);
        let value = frame_to_representation(&frame);
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["hash"], json!("aA=="));
        assert_eq!(object["type"], json!("hash"));
        assert!(!object.contains_key("nonce"));
        assert!(!object.contains_key("timestamp"));
    }

    #[test]
    fn test_encode_variant_fields() {
        let value = frame_to_representation(&acceptance());
        assert_eq!(value["type"], json!("trust-acceptance"));
        assert_eq!(value["sourceIdentifier"], json!("https://a.example"));
        assert_eq!(value["sourceHash"], json!(STANDARD.encode(b"offer-hash")));
        assert_eq!(value["timestamp"], json!(1736870400000i64));
        assert!(value.get("payload").is_none());
        assert!(value.get("index").is_none());
    }

    #[test]
    fn test_frame_roundtrip() {
        let frame = acceptance();
        let decoded = frame_from_representation(&frame_to_representation(&frame)).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn test_appended_line_roundtrip() {
        let first = AppendedFrame::link(acceptance(), None);
        let second = AppendedFrame::link(
            Frame::new(
                Bytes::from_static(b"p"),
                FrameBody::Payload {
                    payload: Bytes::from_static(&[0, 1, 2, 255]),
                },
            ),
            Some(&first),
        );

        for frame in [first, second] {
            let line = encode_line(&frame);
            assert!(!line.contains('\n'));
            assert_eq!(decode_line(&line).unwrap(), frame);
        }
    }

    #[test]
    fn test_genesis_previous_hash_is_empty_string() {
        let first = AppendedFrame::link(acceptance(), None);
        let value = appended_to_representation(&first);
        assert_eq!(value["index"], json!(0));
        assert_eq!(value["previousHash"], json!(""));
    }

    #[test]
    fn test_reject_missing_hash() {
        let value = json!({ "type": "hash" });
        assert!(matches!(
            frame_from_representation(&value),
            Err(RepresentationError::MissingField { field: "hash" })
        ));
    }

    #[test]
    fn test_reject_unknown_type() {
        let value = json!({ "hash": "aA==", "type": "unknown-kind" });
        match frame_from_representation(&value) {
            Err(RepresentationError::UnknownType(tag)) => assert_eq!(tag, "unknown-kind"),
            other => panic!("expected UnknownType, got {:?}", other),
        }
    }

    #[test]
    fn test_reject_missing_type() {
        let value = json!({ "hash": "aA==" });
        assert!(matches!(
            frame_from_representation(&value),
            Err(RepresentationError::MissingField { field: "type" })
        ));
    }

    #[test]
    fn test_reject_non_numeric_timestamp() {
        let value = json!({ "hash": "aA==", "type": "hash", "timestamp": "yesterday" });
        assert!(matches!(
            frame_from_representation(&value),
            Err(RepresentationError::InvalidNumber { field: "timestamp" })
        ));

        let missing = json!({ "hash": "aA==", "type": "hash", "timestamp": null });
        assert!(matches!(
            frame_from_representation(&missing),
            Err(RepresentationError::InvalidNumber { field: "timestamp" })
        ));
    }

    #[test]
    fn test_non_integer_timestamps_round_trip() {
        for text in ["1.5", "1736870400000.5", "1e19", "18446744073709551615", "-0.25"] {
            let line = format!(r#"{{"hash":"aA==","timestamp":{text},"type":"hash"}}"#);
            let value: Value = serde_json::from_str(&line).unwrap();
            let frame = frame_from_representation(&value).unwrap();

            let timestamp = frame.timestamp.clone().expect("timestamp");
            assert_eq!(Value::Number(timestamp.as_number().clone()), value["timestamp"]);
            assert_eq!(frame_to_representation(&frame), value, "{text}");
        }

        let fractional = frame_from_representation(
            &json!({ "hash": "aA==", "type": "hash", "timestamp": 1736870400000.5 }),
        )
        .unwrap();
        assert_eq!(
            fractional.timestamp,
            Timestamp::from_f64(1736870400000.5)
        );
    }

    #[test]
    fn test_reject_malformed_bytes() {
        let value = json!({ "hash": "not base64!", "type": "hash" });
        assert!(matches!(
            frame_from_representation(&value),
            Err(RepresentationError::InvalidBytes { field: "hash", .. })
        ));

        let nonce = json!({ "hash": "aA==", "type": "hash", "nonce": "%%%" });
        assert!(matches!(
            frame_from_representation(&nonce),
            Err(RepresentationError::InvalidBytes { field: "nonce", .. })
        ));
    }

    #[test]
    fn test_reject_wrong_field_type() {
        let value = json!({ "hash": 17, "type": "hash" });
        assert!(matches!(
            frame_from_representation(&value),
            Err(RepresentationError::InvalidString { field: "hash" })
        ));

        let null_nonce = json!({ "hash": "aA==", "type": "hash", "nonce": null });
        assert!(matches!(
            frame_from_representation(&null_nonce),
            Err(RepresentationError::InvalidString { field: "nonce" })
        ));
    }

    #[test]
    fn test_reject_field_of_other_variant() {
        let value = json!({
            "hash": "aA==",
            "type": "trust-exchange",
            "targetIdentifier": "b",
            "payload": "aA==",
        });
        assert!(matches!(
            frame_from_representation(&value),
            Err(RepresentationError::FieldNotAllowed {
                field: "payload",
                kind: FrameKind::TrustExchange
            })
        ));
    }

    #[test]
    fn test_reject_missing_variant_field() {
        let value = json!({ "hash": "aA==", "type": "trust-acceptance", "sourceHash": "aA==" });
        assert!(matches!(
            frame_from_representation(&value),
            Err(RepresentationError::MissingField {
                field: "sourceIdentifier"
            })
        ));
    }

    #[test]
    fn test_reject_bad_linkage() {
        let missing_index = json!({ "hash": "aA==", "type": "hash", "previousHash": "" });
        assert!(matches!(
            appended_from_representation(&missing_index),
            Err(RepresentationError::MissingField { field: "index" })
        ));

        let negative_index =
            json!({ "hash": "aA==", "type": "hash", "index": -1, "previousHash": "" });
        assert!(matches!(
            appended_from_representation(&negative_index),
            Err(RepresentationError::InvalidNumber { field: "index" })
        ));

        let missing_previous = json!({ "hash": "aA==", "type": "hash", "index": 0 });
        assert!(matches!(
            appended_from_representation(&missing_previous),
            Err(RepresentationError::MissingField {
                field: "previousHash"
            })
        ));
    }

    #[test]
    fn test_reject_non_object_and_bad_json() {
        assert!(matches!(
            frame_from_representation(&json!([1, 2])),
            Err(RepresentationError::NotAnObject)
        ));
        assert!(matches!(
            decode_line("{not json"),
            Err(RepresentationError::Json(_))
        ));
        assert!(matches!(
            decode_line(&b"{\"hash\":\"\xff\"}"[..]),
            Err(RepresentationError::Json(_))
        ));
    }
}
