//! Canonical CBOR encoding of frame content.
//!
//! The content hash of a frame covers its semantically relevant fields: the
//! type tag, the variant fields, `nonce` and `timestamp`. It never covers
//! `hash` itself or the chain linkage added at append time.
//!
//! Encoding rules (RFC 8949 deterministic):
//! - Map keys are text, sorted by their encoded bytes
//! - Integers use the smallest valid encoding
//! - Non-integer timestamps are floats in the shortest width that keeps
//!   their exact value (half, single, then double precision)
//! - Lengths are definite
//! - Absent optional fields are omitted, never encoded as null

use ciborium::value::{Integer, Value};

use crate::frame::{Frame, FrameBody};
use crate::representation::fields;
use crate::types::Timestamp;

/// Encode the hashable content of a frame to canonical CBOR bytes.
pub fn canonical_content(frame: &Frame) -> Vec<u8> {
    let mut entries = vec![(
        Value::Text(fields::TYPE.to_string()),
        Value::Text(frame.kind().as_str().to_string()),
    )];

    match &frame.body {
        FrameBody::Payload { payload } | FrameBody::PublicKeyAcceptance { payload } => {
            entries.push((
                Value::Text(fields::PAYLOAD.to_string()),
                Value::Bytes(payload.to_vec()),
            ));
        }
        FrameBody::TrustExchange { target_identifier } => {
            entries.push((
                Value::Text(fields::TARGET_IDENTIFIER.to_string()),
                Value::Text(target_identifier.as_str().to_string()),
            ));
        }
        FrameBody::TrustAcceptance {
            source_hash,
            source_identifier,
        } => {
            entries.push((
                Value::Text(fields::SOURCE_HASH.to_string()),
                Value::Bytes(source_hash.to_vec()),
            ));
            entries.push((
                Value::Text(fields::SOURCE_IDENTIFIER.to_string()),
                Value::Text(source_identifier.as_str().to_string()),
            ));
        }
        FrameBody::Hash => {}
    }

    if let Some(nonce) = &frame.nonce {
        entries.push((
            Value::Text(fields::NONCE.to_string()),
            Value::Bytes(nonce.to_vec()),
        ));
    }
    if let Some(timestamp) = &frame.timestamp {
        entries.push((
            Value::Text(fields::TIMESTAMP.to_string()),
            timestamp_value(timestamp),
        ));
    }

    let mut buf = Vec::new();
    encode_value(&mut buf, &Value::Map(entries));
    buf
}

fn timestamp_value(timestamp: &Timestamp) -> Value {
    let number = timestamp.as_number();
    if let Some(i) = number.as_i64() {
        Value::Integer(Integer::from(i))
    } else if let Some(u) = number.as_u64() {
        Value::Integer(Integer::from(u))
    } else {
        // Without arbitrary precision every JSON number has an f64 form.
        Value::Float(number.as_f64().unwrap_or(f64::NAN))
    }
}

/// Recursively encode a CBOR value.
///
/// Only the value shapes built by [`canonical_content`] are reachable.
fn encode_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Float(f) => encode_float(buf, *f),
        Value::Map(entries) => encode_map(buf, entries),
        _ => unreachable!("canonical frame content holds only numbers, bytes, text and maps"),
    }
}

fn encode_integer(buf: &mut Vec<u8>, i: Integer) {
    let n: i128 = i.into();
    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

fn encode_float(buf: &mut Vec<u8>, f: f64) {
    let single = f as f32;
    if f64::from(single) != f {
        buf.push(0xfb);
        buf.extend_from_slice(&f.to_bits().to_be_bytes());
    } else if let Some(half) = half_bits(single) {
        buf.push(0xf9);
        buf.extend_from_slice(&half.to_be_bytes());
    } else {
        buf.push(0xfa);
        buf.extend_from_slice(&single.to_bits().to_be_bytes());
    }
}

/// IEEE 754 binary16 bits for `f`, if the conversion is exact.
fn half_bits(f: f32) -> Option<u16> {
    let bits = f.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let biased = ((bits >> 23) & 0xff) as i32;
    let mantissa = bits & 0x7f_ffff;

    if biased == 0 {
        return (mantissa == 0).then_some(sign);
    }
    if biased == 0xff {
        return (mantissa == 0).then_some(sign | 0x7c00);
    }

    let exponent = biased - 127;
    match exponent {
        -14..=15 => (mantissa & 0x1fff == 0)
            .then(|| sign | (((exponent + 15) as u16) << 10) | (mantissa >> 13) as u16),
        -24..=-15 => {
            let shift = (-1 - exponent) as u32;
            let full = mantissa | 0x80_0000;
            (full & ((1 << shift) - 1) == 0).then(|| sign | (full >> shift) as u16)
        }
        _ => None,
    }
}

fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

fn encode_map(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    let mut sorted: Vec<_> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_bytes = Vec::new();
            encode_value(&mut key_bytes, k);
            (key_bytes, v)
        })
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, sorted.len() as u64);
    for (key_bytes, v) in sorted {
        buf.extend_from_slice(&key_bytes);
        encode_value(buf, v);
    }
}
