//! Resilient profile fetcher.
//!
//! Resolves a [`SearchKey`] to a [`ProfileRecord`] through a [`ProfileSource`],
//! retrying transient failures with a randomized backoff:
//! - Attempts run strictly one after another
//! - A missing profile is terminal and never retried
//! - Sleep and randomness are injected so tests run with zero real wait
//! - Cancellation is observed between attempts and during backoff

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use rand::Rng;
use tokio::sync::watch;

use crate::config::Config;
use crate::error::{ClientError, FetchError};
use crate::models::{Candidate, ProfileRecord};
use crate::normalize::SearchKey;
use crate::source::ProfileSource;

/// Pauses between attempts.
#[async_trait::async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real sleeps on the Tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait::async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Uniform random backoff between two bounds (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub min: Duration,
    pub max: Duration,
}

impl BackoffPolicy {
    /// Create a policy; bounds are swapped if given in the wrong order.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max { Self { min, max } } else { Self { min: max, max: min } }
    }

    /// Draw the next delay.
    #[must_use]
    pub fn next_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        if min == max {
            return self.min;
        }
        Duration::from_millis(rng.gen_range(min..=max))
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(crate::config::api::BACKOFF_MIN, crate::config::api::BACKOFF_MAX)
    }
}

/// Sender half used by the owner of a session to cancel in-flight fetches.
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

/// Receiver half passed into [`ProfileFetcher::fetch_with_cancel`].
#[derive(Debug, Clone)]
pub struct CancelSignal(watch::Receiver<bool>);

/// Create a linked cancel handle and signal.
#[must_use]
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(tx), CancelSignal(rx))
}

impl CancelHandle {
    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

impl CancelSignal {
    /// A signal that never fires.
    #[must_use]
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        // Dropping the sender leaves the value at `false` forever.
        drop(tx);
        Self(rx)
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once cancellation is requested. Pends forever if the handle is gone.
    pub async fn cancelled(&mut self) {
        if self.0.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Outcome of a single attempt.
enum AttemptError {
    NotFound,
    Transient(ClientError),
}

impl From<ClientError> for AttemptError {
    fn from(err: ClientError) -> Self {
        Self::Transient(err)
    }
}

/// Fetches profiles with a bounded retry budget.
///
/// Holds no state between calls; clones share the source and sleeper.
#[derive(Clone)]
pub struct ProfileFetcher {
    source: Arc<dyn ProfileSource>,
    sleeper: Arc<dyn Sleeper>,
    backoff: BackoffPolicy,
}

impl ProfileFetcher {
    /// Create a fetcher with real sleeps and the default backoff.
    #[must_use]
    pub fn new(source: Arc<dyn ProfileSource>) -> Self {
        Self { source, sleeper: Arc::new(TokioSleeper), backoff: BackoffPolicy::default() }
    }

    /// Create a fetcher using the backoff bounds from `config`.
    #[must_use]
    pub fn from_config(source: Arc<dyn ProfileSource>, config: &Config) -> Self {
        Self::new(source).with_backoff(BackoffPolicy::new(config.backoff_min, config.backoff_max))
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    #[must_use]
    pub const fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    #[must_use]
    pub const fn backoff(&self) -> BackoffPolicy {
        self.backoff
    }

    /// Fetch without external cancellation.
    ///
    /// # Errors
    ///
    /// `NotFound` when the source has no match, `Exhausted` when every attempt
    /// failed transiently.
    pub async fn fetch(&self, key: &SearchKey, max_attempts: u32) -> Result<ProfileRecord, FetchError> {
        self.fetch_with_cancel(key, max_attempts, CancelSignal::never()).await
    }

    /// Fetch, giving up early when `cancel` fires between attempts.
    ///
    /// `max_attempts` below 1 is treated as 1.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Exhausted`, or `Cancelled`.
    pub async fn fetch_with_cancel(
        &self,
        key: &SearchKey,
        max_attempts: u32,
        mut cancel: CancelSignal,
    ) -> Result<ProfileRecord, FetchError> {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 1;

        loop {
            if cancel.is_cancelled() {
                tracing::info!(%key, attempt, "Fetch cancelled before attempt");
                return Err(FetchError::Cancelled);
            }

            tracing::debug!(%key, attempt, max_attempts, "Fetching profile");

            let err = match self.attempt(key).await {
                Ok(record) => {
                    tracing::info!(%key, attempt, name = record.display_name(), "Profile fetched");
                    return Ok(record);
                }
                Err(AttemptError::NotFound) => {
                    tracing::info!(%key, attempt, "Profile not found");
                    return Err(FetchError::not_found(key.as_str()));
                }
                Err(AttemptError::Transient(err)) => err,
            };

            if attempt >= max_attempts {
                tracing::warn!(%key, attempts = attempt, error = %err, "Fetch attempts exhausted");
                return Err(FetchError::Exhausted { attempts: attempt, last_error: err.to_string() });
            }

            let delay = self.backoff.next_delay(&mut rand::thread_rng());
            tracing::warn!(%key, attempt, error = %err, ?delay, "Transient fetch failure, backing off");

            tokio::select! {
                () = self.sleeper.sleep(delay) => {}
                () = cancel.cancelled() => {
                    tracing::info!(%key, attempt, "Fetch cancelled during backoff");
                    return Err(FetchError::Cancelled);
                }
            }

            attempt += 1;
        }
    }

    async fn attempt(&self, key: &SearchKey) -> Result<ProfileRecord, AttemptError> {
        let candidate = match key {
            SearchKey::Identifier(id) => self.resolve_id(id).await?,
            SearchKey::DisplayName(name) => self.resolve_name(name).await?,
        };
        Ok(self.source.enrich(&candidate).await?)
    }

    async fn resolve_id(&self, id: &str) -> Result<Candidate, AttemptError> {
        match self.source.lookup_by_id(id).await {
            Ok(Some(candidate)) => Ok(candidate),
            Ok(None) => Err(AttemptError::NotFound),
            Err(err) if err.is_not_found() => Err(AttemptError::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    async fn resolve_name(&self, name: &str) -> Result<Candidate, AttemptError> {
        let mut candidates = self.source.search_by_name(name);
        match candidates.next().await {
            Some(Ok(candidate)) => Ok(candidate),
            None => Err(AttemptError::NotFound),
            Some(Err(err)) if err.is_not_found() => Err(AttemptError::NotFound),
            Some(Err(err)) => Err(err.into()),
        }
    }
}

impl std::fmt::Debug for ProfileFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileFetcher").field("backoff", &self.backoff).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_backoff_within_bounds() {
        let policy = BackoffPolicy::new(Duration::from_secs(2), Duration::from_secs(5));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let d = policy.next_delay(&mut rng);
            assert!(d >= Duration::from_secs(2) && d <= Duration::from_secs(5), "{d:?}");
        }
    }

    #[test]
    fn test_backoff_degenerate_and_swapped() {
        let zero = BackoffPolicy::new(Duration::ZERO, Duration::ZERO);
        assert_eq!(zero.next_delay(&mut rand::thread_rng()), Duration::ZERO);

        let swapped = BackoffPolicy::new(Duration::from_secs(5), Duration::from_secs(2));
        assert_eq!(swapped.min, Duration::from_secs(2));
        assert_eq!(swapped.max, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_cancel_signal() {
        let (handle, mut signal) = cancel_pair();
        assert!(!signal.is_cancelled());
        handle.cancel();
        assert!(signal.is_cancelled());
        signal.cancelled().await;
    }

    #[test]
    fn test_never_signal() {
        assert!(!CancelSignal::never().is_cancelled());
    }
}
