//! The trust-exchange handshake.
//!
//! 1. The initiator appends a `trust-exchange` frame naming the target and
//!    sends it through its exchange ([`offer_trust`]).
//! 2. The target appends a `trust-acceptance` frame pointing back at the
//!    offer's hash and the initiator's address, and returns it
//!    ([`accept_trust`], or [`TrustResponder`] on the receiving side).
//! 3. Either side may later record the other's public key
//!    ([`accept_public_key`]).
//!
//! These helpers only produce the linked records. Deciding when a peer is
//! trusted stays with the caller, through the party's trust registry.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use bytes::Bytes;
use tessera_core::{Address, AppendedFrame, FrameBody, FrameKind};
use tessera_exchange::{ExchangeError, Responder};

use crate::error::{Error, Result};
use crate::party::Party;

/// Both halves of a completed handshake, as seen by the initiator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustOffer {
    /// The `trust-exchange` frame on the initiator's chain.
    pub offer: AppendedFrame,
    /// The `trust-acceptance` frame returned by the target.
    pub acceptance: AppendedFrame,
}

/// Offer trust to `target` and wait for its acceptance.
///
/// The returned acceptance has been checked to answer this offer: its
/// `sourceHash` is the offer's hash and its `sourceIdentifier` is this party.
pub async fn offer_trust(party: &Party, target: &Address) -> Result<TrustOffer> {
    let ledger = party.ledger()?;
    let writer = ledger.writer()?;

    let nonce = writer.nonce().await?;
    let frame = writer
        .seal(
            FrameBody::TrustExchange {
                target_identifier: target.clone(),
            },
            Some(nonce),
            Some(now_millis()),
        )
        .await?;
    let offer = writer.append(frame).await?;

    let acceptance = party.exchange(offer.clone()).await?;
    check_acceptance(party.address(), &offer, &acceptance)?;

    tracing::debug!(party = %party.address(), target = %target, "trust offer accepted");
    Ok(TrustOffer { offer, acceptance })
}

/// Accept a trust offer sent by `from`, recording the acceptance on this
/// party's ledger.
pub async fn accept_trust(
    party: &Party,
    from: &Address,
    offer: &AppendedFrame,
) -> Result<AppendedFrame> {
    match offer.body() {
        FrameBody::TrustExchange { target_identifier } if target_identifier == party.address() => {}
        FrameBody::TrustExchange { target_identifier } => {
            return Err(Error::NotAddressed {
                target: target_identifier.clone(),
                party: party.address().clone(),
            })
        }
        other => {
            return Err(Error::UnexpectedFrame {
                expected: FrameKind::TrustExchange,
                actual: other.kind(),
            })
        }
    }

    let ledger = party.ledger()?;
    let writer = ledger.writer()?;

    let nonce = writer.nonce().await?;
    let frame = writer
        .seal(
            FrameBody::TrustAcceptance {
                source_hash: offer.hash().clone(),
                source_identifier: from.clone(),
            },
            Some(nonce),
            Some(now_millis()),
        )
        .await?;
    let acceptance = writer.append(frame).await?;

    tracing::debug!(party = %party.address(), from = %from, "accepted trust offer");
    Ok(acceptance)
}

/// Record acceptance of a counterparty's public key on this party's ledger.
pub async fn accept_public_key(party: &Party, public_key: Bytes) -> Result<AppendedFrame> {
    let ledger = party.ledger()?;
    let writer = ledger.writer()?;

    let nonce = writer.nonce().await?;
    let frame = writer
        .seal(
            FrameBody::PublicKeyAcceptance {
                payload: public_key,
            },
            Some(nonce),
            Some(now_millis()),
        )
        .await?;
    writer.append(frame).await
}

fn check_acceptance(
    initiator: &Address,
    offer: &AppendedFrame,
    acceptance: &AppendedFrame,
) -> Result<()> {
    match acceptance.body() {
        FrameBody::TrustAcceptance {
            source_hash,
            source_identifier,
        } => {
            if source_hash != offer.hash() {
                return Err(Error::AcceptanceMismatch(format!(
                    "source hash {} does not match offer hash {}",
                    hex::encode(source_hash),
                    hex::encode(offer.hash())
                )));
            }
            if source_identifier != initiator {
                return Err(Error::AcceptanceMismatch(format!(
                    "source identifier {} is not the initiator {}",
                    source_identifier, initiator
                )));
            }
            Ok(())
        }
        other => Err(Error::UnexpectedFrame {
            expected: FrameKind::TrustAcceptance,
            actual: other.kind(),
        }),
    }
}

/// Answers incoming trust offers on behalf of a party.
///
/// Holds the party weakly, so registering it with an exchange that the
/// party itself sends through does not keep the party alive.
#[derive(Debug, Clone)]
pub struct TrustResponder {
    party: Weak<Party>,
}

impl TrustResponder {
    pub fn new(party: &Arc<Party>) -> Self {
        Self {
            party: Arc::downgrade(party),
        }
    }
}

#[async_trait]
impl Responder for TrustResponder {
    async fn respond(
        &self,
        from: &Address,
        frame: AppendedFrame,
    ) -> tessera_exchange::Result<AppendedFrame> {
        let party = self
            .party
            .upgrade()
            .ok_or_else(|| ExchangeError::Rejected("party is gone".to_string()))?;

        accept_trust(&party, from, &frame)
            .await
            .map_err(|e| match e {
                Error::NotAddressed { .. } | Error::UnexpectedFrame { .. } => {
                    ExchangeError::Rejected(e.to_string())
                }
                other => ExchangeError::Responder(Box::new(other)),
            })
    }
}

/// Current time in milliseconds. Clamps to 0 if the clock is before the epoch.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
