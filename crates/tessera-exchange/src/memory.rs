//! In-process exchange for tests and single-process deployments.
//!
//! Parties register a [`Responder`] under their address. A frame is routed
//! to the responder of its recipient: the target of a trust offer, or the
//! initiator named by a trust acceptance. Frames and replies pass through
//! the JSON wire representation, so anything that would not survive a real
//! transport fails here too.
//!
//! Each delivery runs as its own task. A responder that panics or is
//! cancelled surfaces as [`ExchangeError::TransportError`], the same way a
//! dropped connection would.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tessera_core::{decode_line, encode_line, Address, AppendedFrame};
use tokio::sync::RwLock;

use crate::error::{ExchangeError, Result};
use crate::transport::{Exchange, Responder};

/// Routes frames between responders registered in one process.
///
/// Clones share the same routing table.
#[derive(Clone, Default)]
pub struct MemoryExchange {
    responders: Arc<RwLock<HashMap<Address, Arc<dyn Responder>>>>,
}

impl MemoryExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route frames addressed to `address` to `responder`, replacing any
    /// previous registration.
    pub async fn register(&self, address: Address, responder: Arc<dyn Responder>) {
        self.responders.write().await.insert(address, responder);
    }

    /// Returns whether a responder was registered.
    pub async fn unregister(&self, address: &Address) -> bool {
        self.responders.write().await.remove(address).is_some()
    }

    pub async fn is_registered(&self, address: &Address) -> bool {
        self.responders.read().await.contains_key(address)
    }
}

impl std::fmt::Debug for MemoryExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryExchange").finish_non_exhaustive()
    }
}

#[async_trait]
impl Exchange for MemoryExchange {
    async fn exchange(&self, from: &Address, frame: AppendedFrame) -> Result<AppendedFrame> {
        let kind = frame.kind();
        let to = frame
            .body()
            .recipient()
            .cloned()
            .ok_or(ExchangeError::NoRoute { kind })?;

        // Released before the responder runs, so it may exchange in turn.
        let responder = self
            .responders
            .read()
            .await
            .get(&to)
            .cloned()
            .ok_or_else(|| ExchangeError::PeerNotFound(to.clone()))?;

        tracing::debug!(from = %from, to = %to, kind = %kind, "routing frame");
        let delivered = decode_line(&encode_line(&frame))?;
        let sender = from.clone();
        let reply = tokio::spawn(async move { responder.respond(&sender, delivered).await })
            .await
            .map_err(|e| {
                ExchangeError::TransportError(format!("delivery to {to} failed: {e}"))
            })??;
        let reply = decode_line(&encode_line(&reply))?;

        tracing::trace!(from = %to, to = %from, kind = %reply.kind(), "routed reply");
        Ok(reply)
    }
}
