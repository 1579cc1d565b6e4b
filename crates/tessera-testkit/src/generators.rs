//! Proptest generators for property-based testing.

use bytes::Bytes;
use proptest::prelude::*;

use tessera_core::{Address, AppendedFrame, Frame, FrameBody, Timestamp};

/// Generate a random address.
pub fn address() -> impl Strategy<Value = Address> {
    "https://[a-z]{1,12}\\.example(/[a-z0-9-]{0,16})?".prop_map(Address::new)
}

/// Generate byte strings of at most `max_len` bytes.
pub fn bytes(max_len: usize) -> impl Strategy<Value = Bytes> {
    prop::collection::vec(any::<u8>(), 0..=max_len).prop_map(Bytes::from)
}

/// Generate a content-hash sized byte string.
pub fn hash() -> impl Strategy<Value = Bytes> {
    any::<[u8; 32]>().prop_map(|h| Bytes::copy_from_slice(&h))
}

/// Generate a timestamp: mostly integer milliseconds, negative values
/// included, plus integers beyond `i64` and finite fractional numbers.
pub fn timestamp() -> impl Strategy<Value = Timestamp> {
    prop_oneof![
        6 => (-1_000_000i64..=4_000_000_000_000i64).prop_map(Timestamp::millis),
        1 => (i64::MAX as u64 + 1..=u64::MAX).prop_map(Timestamp::from),
        1 => any::<f64>().prop_filter_map("finite", Timestamp::from_f64),
    ]
}

/// Generate a frame body of any kind.
pub fn frame_body() -> impl Strategy<Value = FrameBody> {
    prop_oneof![
        bytes(256).prop_map(|payload| FrameBody::Payload { payload }),
        address().prop_map(|target_identifier| FrameBody::TrustExchange { target_identifier }),
        (hash(), address()).prop_map(|(source_hash, source_identifier)| {
            FrameBody::TrustAcceptance {
                source_hash,
                source_identifier,
            }
        }),
        bytes(64).prop_map(|payload| FrameBody::PublicKeyAcceptance { payload }),
        Just(FrameBody::Hash),
    ]
}

/// Generate a frame with optional nonce and timestamp.
pub fn frame() -> impl Strategy<Value = Frame> {
    (
        hash(),
        proptest::option::of(bytes(32)),
        proptest::option::of(timestamp()),
        frame_body(),
    )
        .prop_map(|(hash, nonce, timestamp, body)| Frame {
            hash,
            nonce,
            timestamp,
            body,
        })
}

/// Generate an appended frame with arbitrary position and link.
pub fn appended_frame() -> impl Strategy<Value = AppendedFrame> {
    (frame(), 0u64..=u32::MAX as u64, hash()).prop_map(|(frame, index, previous_hash)| {
        AppendedFrame {
            frame,
            index,
            previous_hash,
        }
    })
}

/// Generate a correctly linked chain of up to `max_len` frames.
pub fn linked_chain(max_len: usize) -> impl Strategy<Value = Vec<AppendedFrame>> {
    prop::collection::vec(frame(), 0..=max_len).prop_map(link_all)
}

/// Link frames in order, starting from an empty chain.
pub fn link_all(frames: Vec<Frame>) -> Vec<AppendedFrame> {
    let mut chain: Vec<AppendedFrame> = Vec::with_capacity(frames.len());
    for frame in frames {
        let appended = AppendedFrame::link(frame, chain.last());
        chain.push(appended);
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{
        canonical_content, decode_line, encode_line, frame_from_representation,
        frame_to_representation, GENESIS_HASH,
    };

    proptest! {
        #[test]
        fn test_linked_chain_invariant(chain in linked_chain(24)) {
            for (i, frame) in chain.iter().enumerate() {
                prop_assert_eq!(frame.index, i as u64);
            }
            if let Some(first) = chain.first() {
                prop_assert_eq!(&first.previous_hash[..], GENESIS_HASH);
            }
            for pair in chain.windows(2) {
                prop_assert_eq!(&pair[1].previous_hash, pair[0].hash());
            }
        }

        #[test]
        fn test_line_round_trip(frame in appended_frame()) {
            let decoded = decode_line(&encode_line(&frame)).unwrap();
            prop_assert_eq!(decoded, frame);
        }

        #[test]
        fn test_absent_fields_stay_absent(frame in frame()) {
            let value = frame_to_representation(&frame);
            let object = value.as_object().unwrap();
            prop_assert_eq!(object.contains_key("nonce"), frame.nonce.is_some());
            prop_assert_eq!(object.contains_key("timestamp"), frame.timestamp.is_some());
            prop_assert!(object.values().all(|v| !v.is_null()));

            let decoded = frame_from_representation(&value).unwrap();
            prop_assert_eq!(decoded, frame);
        }

        #[test]
        fn test_canonical_content_ignores_hash(frame in frame(), other in hash()) {
            let mut rehashed = frame.clone();
            rehashed.hash = other;
            prop_assert_eq!(canonical_content(&frame), canonical_content(&rehashed));
        }
    }
}
