//! Exchange and responder traits.
//!
//! Implementations may use HTTP, a message queue, or direct in-process
//! calls. Callers only see one frame out and one frame back.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tessera_core::{Address, AppendedFrame};

use crate::error::{ExchangeError, Result};

/// Sends an appended frame to its counterparty and returns the answer,
/// typically the counterparty's acceptance record.
#[async_trait]
pub trait Exchange: Send + Sync {
    async fn exchange(&self, from: &Address, frame: AppendedFrame) -> Result<AppendedFrame>;
}

/// Receives a frame sent by `from` and answers it.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, from: &Address, frame: AppendedFrame) -> Result<AppendedFrame>;
}

#[async_trait]
impl<T: Exchange + ?Sized> Exchange for Arc<T> {
    async fn exchange(&self, from: &Address, frame: AppendedFrame) -> Result<AppendedFrame> {
        (**self).exchange(from, frame).await
    }
}

/// Exchange backed by an async closure.
///
/// ```rust,no_run
/// use tessera_core::{Address, AppendedFrame};
/// use tessera_exchange::{ExchangeError, FnExchange};
///
/// // Echo every frame back unchanged
/// let echo = FnExchange::new(|_from: Address, frame: AppendedFrame| async move {
///     Ok::<_, ExchangeError>(frame)
/// });
/// ```
pub struct FnExchange<F> {
    f: F,
}

impl<F> FnExchange<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> std::fmt::Debug for FnExchange<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnExchange")
    }
}

#[async_trait]
impl<F, Fut> Exchange for FnExchange<F>
where
    F: Fn(Address, AppendedFrame) -> Fut + Send + Sync,
    Fut: Future<Output = Result<AppendedFrame>> + Send,
{
    async fn exchange(&self, from: &Address, frame: AppendedFrame) -> Result<AppendedFrame> {
        (self.f)(from.clone(), frame).await
    }
}

/// Exchange for parties with no counterparty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExchange;

#[async_trait]
impl Exchange for NoExchange {
    async fn exchange(&self, _from: &Address, _frame: AppendedFrame) -> Result<AppendedFrame> {
        Err(ExchangeError::Unavailable)
    }
}
