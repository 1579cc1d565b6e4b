//! Golden test vectors for the wire representation and canonical content.
//!
//! These pin the exact bytes other implementations must produce: the JSON
//! line a storage provider persists, the canonical CBOR a content hash
//! covers, and its SHA-256 digest.

use bytes::Bytes;
use tessera_core::{
    canonical_content, decode_line, encode_line, Address, AppendedFrame, Frame, FrameBody,
    Timestamp,
};
use tessera_crypto::HashAlgorithm;

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// The appended frame under test.
    pub frame: AppendedFrame,
    /// Expected persisted line, without the trailing newline.
    pub expected_line: &'static str,
    /// Expected canonical content (hex).
    pub expected_canonical: &'static str,
    /// Expected SHA-256 of the canonical content (hex).
    pub expected_sha256: &'static str,
}

fn appended(
    hash: &'static [u8],
    nonce: Option<&'static [u8]>,
    timestamp: Option<Timestamp>,
    body: FrameBody,
    index: u64,
    previous_hash: &'static [u8],
) -> AppendedFrame {
    AppendedFrame {
        frame: Frame {
            hash: Bytes::from_static(hash),
            nonce: nonce.map(Bytes::from_static),
            timestamp,
            body,
        },
        index,
        previous_hash: Bytes::from_static(previous_hash),
    }
}

const KEY_BYTES: [u8; 32] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25,
    26, 27, 28, 29, 30, 31,
];

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "genesis hash frame",
            frame: appended(b"\x01\x02\x03", None, None, FrameBody::Hash, 0, b""),
            expected_line: r#"{"hash":"AQID","index":0,"previousHash":"","type":"hash"}"#,
            expected_canonical: "a164747970656468617368",
            expected_sha256: "5004e292bae9d32a79aa78fe0f7e50705c01bc4914cc95bc53144b5e4a03f638",
        },
        GoldenVector {
            name: "payload with nonce and timestamp",
            frame: appended(
                b"h1",
                Some(b"n"),
                Some(Timestamp::millis(1736870400000)),
                FrameBody::Payload {
                    payload: Bytes::from_static(b"hello"),
                },
                1,
                b"\x01\x02\x03",
            ),
            expected_line: r#"{"hash":"aDE=","index":1,"nonce":"bg==","payload":"aGVsbG8=","previousHash":"AQID","timestamp":1736870400000,"type":"payload"}"#,
            expected_canonical: "a46474797065677061796c6f6164656e6f6e6365416e677061796c6f61644568656c6c6f6974696d657374616d701b00000194658b1000",
            expected_sha256: "81d59bc178000716c633d3ba22990dcdcae44367d2fa7ef876089f24232a06e3",
        },
        GoldenVector {
            name: "trust exchange",
            frame: appended(
                b"offer",
                None,
                Some(Timestamp::millis(1736870401000)),
                FrameBody::TrustExchange {
                    target_identifier: Address::new("https://bob.example"),
                },
                2,
                b"h1",
            ),
            expected_line: r#"{"hash":"b2ZmZXI=","index":2,"previousHash":"aDE=","targetIdentifier":"https://bob.example","timestamp":1736870401000,"type":"trust-exchange"}"#,
            expected_canonical: "a364747970656e74727573742d65786368616e67656974696d657374616d701b00000194658b13e8707461726765744964656e7469666965727368747470733a2f2f626f622e6578616d706c65",
            expected_sha256: "490eb843c41250c4351d81d99c772ae13f585595d3810eb1e17026326dd7279a",
        },
        GoldenVector {
            name: "trust acceptance",
            frame: appended(
                b"accept",
                None,
                None,
                FrameBody::TrustAcceptance {
                    source_hash: Bytes::from_static(b"offer"),
                    source_identifier: Address::new("https://alice.example"),
                },
                0,
                b"",
            ),
            expected_line: r#"{"hash":"YWNjZXB0","index":0,"previousHash":"","sourceHash":"b2ZmZXI=","sourceIdentifier":"https://alice.example","type":"trust-acceptance"}"#,
            expected_canonical: "a364747970657074727573742d616363657074616e63656a736f7572636548617368456f6666657270736f757263654964656e7469666965727568747470733a2f2f616c6963652e6578616d706c65",
            expected_sha256: "5e8f50c59f9bf73b2230fb34c6d2d61259303fb18e4cc5432600b3e628ac9fbc",
        },
        GoldenVector {
            name: "public key acceptance",
            frame: appended(
                b"key",
                Some(b"\x00\xff"),
                Some(Timestamp::millis(-1)),
                FrameBody::PublicKeyAcceptance {
                    payload: Bytes::from_static(&KEY_BYTES),
                },
                7,
                b"accept",
            ),
            expected_line: r#"{"hash":"a2V5","index":7,"nonce":"AP8=","payload":"AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=","previousHash":"YWNjZXB0","timestamp":-1,"type":"public-key-acceptance"}"#,
            expected_canonical: "a46474797065757075626c69632d6b65792d616363657074616e6365656e6f6e63654200ff677061796c6f61645820000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f6974696d657374616d7020",
            expected_sha256: "0051e6756f76f9e522c905a3d01a14bd988e9888c83901539adc47aa62e5f675",
        },
        GoldenVector {
            name: "fractional timestamp",
            frame: appended(
                b"frac",
                None,
                Timestamp::from_f64(1736870400000.5),
                FrameBody::Hash,
                8,
                b"key",
            ),
            expected_line: r#"{"hash":"ZnJhYw==","index":8,"previousHash":"a2V5","timestamp":1736870400000.5,"type":"hash"}"#,
            expected_canonical: "a2647479706564686173686974696d657374616d70fb42794658b1000800",
            expected_sha256: "56119e4d39daf5c8461a66c1c4588b280e71bf7417985bf278caf7674ae7ecd9",
        },
    ]
}

/// Verify every vector: encoding, decoding, canonical content and digest.
///
/// Returns the names of failing vectors with a reason.
pub fn verify_all_vectors() -> Result<(), Vec<String>> {
    let failures: Vec<String> = all_vectors()
        .iter()
        .filter_map(|vector| verify_vector(vector).err())
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}

fn verify_vector(vector: &GoldenVector) -> Result<(), String> {
    let line = encode_line(&vector.frame);
    if line != vector.expected_line {
        return Err(format!("{}: line {} != {}", vector.name, line, vector.expected_line));
    }

    let decoded = decode_line(vector.expected_line)
        .map_err(|e| format!("{}: decode failed: {}", vector.name, e))?;
    if decoded != vector.frame {
        return Err(format!("{}: decoded frame differs", vector.name));
    }

    let canonical = canonical_content(&vector.frame.frame);
    if hex::encode(&canonical) != vector.expected_canonical {
        return Err(format!("{}: canonical content differs", vector.name));
    }

    let digest = hex::encode(HashAlgorithm::Sha256.digest(&canonical));
    if digest != vector.expected_sha256 {
        return Err(format!("{}: sha256 {} != {}", vector.name, digest, vector.expected_sha256));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_golden_vectors() {
        if let Err(failures) = verify_all_vectors() {
            panic!("golden vectors failed:\n{}", failures.join("\n"));
        }
    }

    #[test]
    fn test_vector_names_unique() {
        let vectors = all_vectors();
        let mut names: Vec<_> = vectors.iter().map(|v| v.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), vectors.len());
    }
}
