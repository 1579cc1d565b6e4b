//! Frames: the closed set of record kinds a chain can hold.
//!
//! A [`Frame`] is content prior to being placed in a chain. Appending wraps
//! it in an [`AppendedFrame`] that records the chain position and the hash
//! of the predecessor.

use bytes::Bytes;
use std::fmt;

use crate::types::{Address, Timestamp};

/// Index of the implicit record preceding the first frame of every chain.
pub const GENESIS_INDEX: i64 = -1;

/// Hash of the implicit record preceding the first frame of every chain.
///
/// The first appended frame carries this as its `previous_hash`.
pub const GENESIS_HASH: &[u8] = &[];

/// Discriminator selecting which variant fields a frame carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Generic signed or attested data.
    Payload,
    /// Offer of trust to another party.
    TrustExchange,
    /// Acceptance of a received trust offer.
    TrustAcceptance,
    /// Acceptance of a counterparty's public key material.
    PublicKeyAcceptance,
    /// Bare linkage or witness record.
    Hash,
}

impl FrameKind {
    /// Every kind, in tag order.
    pub const ALL: [FrameKind; 5] = [
        FrameKind::Payload,
        FrameKind::TrustExchange,
        FrameKind::TrustAcceptance,
        FrameKind::PublicKeyAcceptance,
        FrameKind::Hash,
    ];

    /// The wire tag for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            FrameKind::Payload => "payload",
            FrameKind::TrustExchange => "trust-exchange",
            FrameKind::TrustAcceptance => "trust-acceptance",
            FrameKind::PublicKeyAcceptance => "public-key-acceptance",
            FrameKind::Hash => "hash",
        }
    }

    /// Parse a wire tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "payload" => Some(FrameKind::Payload),
            "trust-exchange" => Some(FrameKind::TrustExchange),
            "trust-acceptance" => Some(FrameKind::TrustAcceptance),
            "public-key-acceptance" => Some(FrameKind::PublicKeyAcceptance),
            "hash" => Some(FrameKind::Hash),
            _ => None,
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variant-specific content of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameBody {
    Payload {
        payload: Bytes,
    },
    TrustExchange {
        /// Address of the party being offered trust.
        target_identifier: Address,
    },
    TrustAcceptance {
        /// Hash of the trust-exchange frame being accepted.
        source_hash: Bytes,
        /// Address of the initiating party.
        source_identifier: Address,
    },
    PublicKeyAcceptance {
        /// The accepted public key material.
        payload: Bytes,
    },
    Hash,
}

impl FrameBody {
    pub fn kind(&self) -> FrameKind {
        match self {
            FrameBody::Payload { .. } => FrameKind::Payload,
            FrameBody::TrustExchange { .. } => FrameKind::TrustExchange,
            FrameBody::TrustAcceptance { .. } => FrameKind::TrustAcceptance,
            FrameBody::PublicKeyAcceptance { .. } => FrameKind::PublicKeyAcceptance,
            FrameBody::Hash => FrameKind::Hash,
        }
    }

    /// The payload bytes, for the kinds that carry one.
    pub fn payload(&self) -> Option<&Bytes> {
        match self {
            FrameBody::Payload { payload } | FrameBody::PublicKeyAcceptance { payload } => {
                Some(payload)
            }
            _ => None,
        }
    }

    /// The party a handshake frame is addressed to.
    ///
    /// Trust offers go to their target, acceptances back to the initiator.
    /// Other kinds name no recipient.
    pub fn recipient(&self) -> Option<&Address> {
        match self {
            FrameBody::TrustExchange { target_identifier } => Some(target_identifier),
            FrameBody::TrustAcceptance {
                source_identifier, ..
            } => Some(source_identifier),
            _ => None,
        }
    }
}

/// One unit of chain content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Content hash, computed by the owning chain's crypto provider.
    pub hash: Bytes,
    /// Random bytes for replay and uniqueness protection.
    pub nonce: Option<Bytes>,
    /// Author-claimed time marker. Untrusted.
    pub timestamp: Option<Timestamp>,
    /// Variant content.
    pub body: FrameBody,
}

impl Frame {
    pub fn new(hash: impl Into<Bytes>, body: FrameBody) -> Self {
        Self {
            hash: hash.into(),
            nonce: None,
            timestamp: None,
            body,
        }
    }

    pub fn with_nonce(mut self, nonce: impl Into<Bytes>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Set an integer millisecond timestamp.
    pub fn with_timestamp(mut self, millis: i64) -> Self {
        self.timestamp = Some(Timestamp::millis(millis));
        self
    }

    pub fn kind(&self) -> FrameKind {
        self.body.kind()
    }
}

/// A frame placed in a chain.
///
/// For a valid chain, `frames[i].index == i` and
/// `frames[i].previous_hash == frames[i - 1].hash()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendedFrame {
    pub frame: Frame,
    /// Position in the chain, starting at 0.
    pub index: u64,
    /// Hash of the preceding frame, or [`GENESIS_HASH`] for the first.
    pub previous_hash: Bytes,
}

impl AppendedFrame {
    /// Link `frame` after `head`, or at the start of an empty chain.
    pub fn link(frame: Frame, head: Option<&AppendedFrame>) -> Self {
        match head {
            Some(head) => Self {
                frame,
                index: head.index + 1,
                previous_hash: head.frame.hash.clone(),
            },
            None => Self {
                frame,
                index: (GENESIS_INDEX + 1) as u64,
                previous_hash: Bytes::from_static(GENESIS_HASH),
            },
        }
    }

    pub fn hash(&self) -> &Bytes {
        &self.frame.hash
    }

    pub fn kind(&self) -> FrameKind {
        self.frame.kind()
    }

    pub fn body(&self) -> &FrameBody {
        &self.frame.body
    }

    /// Whether this is the first frame of its chain.
    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.previous_hash.as_ref() == GENESIS_HASH
    }

    /// Whether `self` directly follows `previous` in a chain.
    pub fn follows(&self, previous: &AppendedFrame) -> bool {
        self.index == previous.index + 1 && self.previous_hash == previous.frame.hash
    }
}
