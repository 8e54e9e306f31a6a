//! Request pacing shared by every clone of the client.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

/// Spaces outgoing requests so the profile source sees at most one per period.
///
/// Cloning shares the underlying limiter, so concurrent tasks are paced together.
#[derive(Clone)]
pub struct RequestPacer {
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl RequestPacer {
    /// Create a pacer; a zero period disables pacing.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        let limiter = Quota::with_period(period)
            .map(|quota| quota.allow_burst(NonZeroU32::MIN))
            .map(|quota| Arc::new(RateLimiter::direct(quota)));
        Self { limiter }
    }

    /// Wait until the next request may be sent.
    pub async fn ready(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }
}

impl std::fmt::Debug for RequestPacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPacer").field("enabled", &self.is_enabled()).finish()
    }
}
