//! Request pacing strategies.
//!
//! The pipeline calls [`Pacer::pace`] after every chunk request and after every
//! symbol. Swapping the strategy never touches fetch logic.

use std::{num::NonZeroU32, sync::Arc, time::Duration};

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;

use crate::config::RunContext;

#[async_trait]
pub trait Pacer: Send + Sync {
    /// Waits until the next request may be issued.
    async fn pace(&self);
}

/// Sleeps a fixed interval every time, whatever the previous request did.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn pace(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Even pacing against a provider quota of `n` requests per minute.
///
/// The bucket holds a single token, so calls are spaced `60s / n` apart and
/// no window of time ever sees more than its share of the quota.
pub struct QuotaPacer {
    limiter: DefaultDirectRateLimiter,
}

impl QuotaPacer {
    pub fn per_minute(requests: NonZeroU32) -> Self {
        Self {
            limiter: RateLimiter::direct(
                Quota::per_minute(requests).allow_burst(nonzero!(1u32)),
            ),
        }
    }
}

#[async_trait]
impl Pacer for QuotaPacer {
    async fn pace(&self) {
        self.limiter.until_ready().await;
    }
}

/// Pacer used between chunk requests: a quota limiter when a per-minute quota
/// is configured, otherwise the fixed chunk delay.
pub fn chunk_pacer(ctx: &RunContext) -> Arc<dyn Pacer> {
    match ctx.requests_per_minute {
        Some(quota) => Arc::new(QuotaPacer::per_minute(quota)),
        None => Arc::new(FixedDelay::new(ctx.chunk_delay)),
    }
}

/// Pacer used between symbols.
pub fn symbol_pacer(ctx: &RunContext) -> Arc<dyn Pacer> {
    Arc::new(FixedDelay::new(ctx.symbol_delay))
}
