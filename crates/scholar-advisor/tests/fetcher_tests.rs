//! Retry-loop tests with scripted sources and a recording sleeper.
//!
//! No test here waits on a real timer.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::stream;

use scholar_advisor::error::{ClientError, ClientResult, FetchError};
use scholar_advisor::fetcher::{BackoffPolicy, ProfileFetcher, Sleeper, cancel_pair};
use scholar_advisor::models::{Candidate, Metric, ProfileRecord};
use scholar_advisor::normalize::SearchKey;
use scholar_advisor::source::{CandidateStream, ProfileSource};

/// What one enrichment call returns.
#[derive(Clone)]
enum Step {
    Ok,
    Transient,
}

/// Source whose enrichment results are scripted call by call.
struct ScriptedSource {
    candidates: Vec<Candidate>,
    enrich_steps: Mutex<VecDeque<Step>>,
    lookups: AtomicUsize,
    searches: AtomicUsize,
    enrichments: AtomicUsize,
}

impl ScriptedSource {
    fn new(candidates: Vec<Candidate>, steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            candidates,
            enrich_steps: Mutex::new(steps.into_iter().collect()),
            lookups: AtomicUsize::new(0),
            searches: AtomicUsize::new(0),
            enrichments: AtomicUsize::new(0),
        }
    }

    fn with_author(steps: impl IntoIterator<Item = Step>) -> Self {
        let mut candidate = Candidate::new("3lUcciYAAAAJ");
        candidate.name = Some("Siti Rahma".to_string());
        Self::new(vec![candidate], steps)
    }

    fn attempts(&self) -> usize {
        self.enrichments.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ProfileSource for ScriptedSource {
    async fn lookup_by_id(&self, id: &str) -> ClientResult<Option<Candidate>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidates.iter().find(|c| c.author_id == id).cloned())
    }

    fn search_by_name<'a>(&'a self, _name: &'a str) -> CandidateStream<'a> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        Box::pin(stream::iter(self.candidates.clone().into_iter().map(Ok)))
    }

    async fn enrich(&self, candidate: &Candidate) -> ClientResult<ProfileRecord> {
        self.enrichments.fetch_add(1, Ordering::SeqCst);
        let step = self.enrich_steps.lock().unwrap().pop_front().unwrap_or(Step::Ok);
        match step {
            Step::Ok => Ok(ProfileRecord::new(candidate.name_or_id())
                .unwrap()
                .with_h_index(Metric::Reported(9))),
            Step::Transient => Err(ClientError::server(503, "Service Unavailable")),
        }
    }
}

/// Source whose lookup always fails with the given status.
struct FailingLookup(u16);

#[async_trait::async_trait]
impl ProfileSource for FailingLookup {
    async fn lookup_by_id(&self, _id: &str) -> ClientResult<Option<Candidate>> {
        match self.0 {
            404 => Err(ClientError::not_found("author")),
            429 => Err(ClientError::rate_limited(1)),
            status => Err(ClientError::server(status, "boom")),
        }
    }

    fn search_by_name<'a>(&'a self, _name: &'a str) -> CandidateStream<'a> {
        Box::pin(stream::iter(vec![Err(ClientError::rate_limited(1))]))
    }

    async fn enrich(&self, _candidate: &Candidate) -> ClientResult<ProfileRecord> {
        unreachable!("lookup never succeeds")
    }
}

/// Sleeper that records requested delays and returns immediately.
#[derive(Default)]
struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    fn count(&self) -> usize {
        self.delays.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Sleeper that never wakes up.
struct StuckSleeper;

#[async_trait::async_trait]
impl Sleeper for StuckSleeper {
    async fn sleep(&self, _duration: Duration) {
        std::future::pending::<()>().await;
    }
}

fn fetcher_for(source: Arc<dyn ProfileSource>, sleeper: Arc<RecordingSleeper>) -> ProfileFetcher {
    ProfileFetcher::new(source)
        .with_sleeper(sleeper)
        .with_backoff(BackoffPolicy::new(Duration::from_secs(2), Duration::from_secs(5)))
}

fn name_key(name: &str) -> SearchKey {
    SearchKey::DisplayName(name.to_string())
}

// =============================================================================
// Terminal outcomes
// =============================================================================

#[tokio::test]
async fn test_empty_name_search_is_not_found_without_retry() {
    let source = Arc::new(ScriptedSource::new(vec![], []));
    let sleeper = Arc::new(RecordingSleeper::default());
    let fetcher = fetcher_for(source.clone(), sleeper.clone());

    let err = fetcher.fetch(&name_key("Nobody Known"), 3).await.unwrap_err();

    assert_eq!(err, FetchError::not_found("Nobody Known"));
    assert_eq!(source.searches.load(Ordering::SeqCst), 1);
    assert_eq!(source.attempts(), 0);
    assert_eq!(sleeper.count(), 0);
}

#[tokio::test]
async fn test_unknown_identifier_is_not_found_without_retry() {
    let source = Arc::new(ScriptedSource::with_author([]));
    let sleeper = Arc::new(RecordingSleeper::default());
    let fetcher = fetcher_for(source.clone(), sleeper.clone());

    let err = fetcher.fetch(&SearchKey::Identifier("MISSING".to_string()), 5).await.unwrap_err();

    assert!(matches!(err, FetchError::NotFound { ref key } if key == "MISSING"));
    assert_eq!(source.lookups.load(Ordering::SeqCst), 1);
    assert_eq!(sleeper.count(), 0);
}

#[tokio::test]
async fn test_lookup_404_is_terminal() {
    let sleeper = Arc::new(RecordingSleeper::default());
    let fetcher = fetcher_for(Arc::new(FailingLookup(404)), sleeper.clone());

    let err = fetcher.fetch(&SearchKey::Identifier("X".to_string()), 3).await.unwrap_err();

    assert!(err.is_terminal());
    assert!(matches!(err, FetchError::NotFound { .. }));
    assert_eq!(sleeper.count(), 0);
}

// =============================================================================
// Retries
// =============================================================================

#[tokio::test]
async fn test_first_attempt_success() {
    let source = Arc::new(ScriptedSource::with_author([Step::Ok]));
    let sleeper = Arc::new(RecordingSleeper::default());
    let fetcher = fetcher_for(source.clone(), sleeper.clone());

    let record = fetcher.fetch(&SearchKey::Identifier("3lUcciYAAAAJ".to_string()), 3).await.unwrap();

    assert_eq!(record.display_name(), "Siti Rahma");
    assert_eq!(record.h_index(), Metric::Reported(9));
    assert_eq!(source.attempts(), 1);
    assert_eq!(sleeper.count(), 0);
}

#[tokio::test]
async fn test_two_transient_failures_then_success() {
    let source = Arc::new(ScriptedSource::with_author([Step::Transient, Step::Transient, Step::Ok]));
    let sleeper = Arc::new(RecordingSleeper::default());
    let fetcher = fetcher_for(source.clone(), sleeper.clone());

    let record = fetcher.fetch(&name_key("Siti Rahma"), 3).await.unwrap();

    assert_eq!(record.display_name(), "Siti Rahma");
    assert_eq!(source.attempts(), 3);
    assert_eq!(sleeper.count(), 2);
}

#[tokio::test]
async fn test_all_transient_exhausts_budget() {
    let source = Arc::new(ScriptedSource::with_author([
        Step::Transient,
        Step::Transient,
        Step::Transient,
        Step::Ok,
    ]));
    let sleeper = Arc::new(RecordingSleeper::default());
    let fetcher = fetcher_for(source.clone(), sleeper.clone());

    let err = fetcher.fetch(&name_key("Siti Rahma"), 3).await.unwrap_err();

    match err {
        FetchError::Exhausted { attempts, last_error } => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("503"), "last error was {last_error}");
        }
        other => panic!("expected Exhausted, got {other:?}"),
    }
    assert_eq!(source.attempts(), 3);
    assert_eq!(sleeper.count(), 2);
}

#[tokio::test]
async fn test_backoff_delays_within_bounds() {
    let source = Arc::new(ScriptedSource::with_author(vec![Step::Transient; 5]));
    let sleeper = Arc::new(RecordingSleeper::default());
    let fetcher = fetcher_for(source, sleeper.clone());

    let _ = fetcher.fetch(&name_key("Siti Rahma"), 5).await;

    let delays = sleeper.delays.lock().unwrap().clone();
    assert_eq!(delays.len(), 4);
    for delay in delays {
        assert!(delay >= Duration::from_secs(2) && delay <= Duration::from_secs(5), "{delay:?}");
    }
}

#[tokio::test]
async fn test_zero_attempts_treated_as_one() {
    let source = Arc::new(ScriptedSource::with_author([Step::Transient]));
    let sleeper = Arc::new(RecordingSleeper::default());
    let fetcher = fetcher_for(source.clone(), sleeper.clone());

    let err = fetcher.fetch(&name_key("Siti Rahma"), 0).await.unwrap_err();

    assert!(matches!(err, FetchError::Exhausted { attempts: 1, .. }));
    assert_eq!(sleeper.count(), 0);
}

#[tokio::test]
async fn test_rate_limited_search_is_retried() {
    let sleeper = Arc::new(RecordingSleeper::default());
    let fetcher = fetcher_for(Arc::new(FailingLookup(429)), sleeper.clone());

    let err = fetcher.fetch(&name_key("Busy Source"), 2).await.unwrap_err();

    assert!(matches!(err, FetchError::Exhausted { attempts: 2, .. }));
    assert_eq!(sleeper.count(), 1);
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn test_cancel_before_first_attempt() {
    let source = Arc::new(ScriptedSource::with_author([Step::Ok]));
    let fetcher = fetcher_for(source.clone(), Arc::new(RecordingSleeper::default()));
    let (handle, signal) = cancel_pair();
    handle.cancel();

    let err = fetcher.fetch_with_cancel(&name_key("Siti Rahma"), 3, signal).await.unwrap_err();

    assert_eq!(err, FetchError::Cancelled);
    assert_eq!(source.attempts(), 0);
}

#[tokio::test]
async fn test_cancel_during_backoff() {
    let source = Arc::new(ScriptedSource::with_author([Step::Transient, Step::Ok]));
    let fetcher = ProfileFetcher::new(source.clone()).with_sleeper(Arc::new(StuckSleeper));
    let (handle, signal) = cancel_pair();

    let key = name_key("Siti Rahma");
    let task = tokio::spawn(async move { fetcher.fetch_with_cancel(&key, 3, signal).await });

    // Wait until the first attempt has happened, then cancel the stuck backoff.
    while source.attempts() == 0 {
        tokio::task::yield_now().await;
    }
    handle.cancel();

    let err = task.await.unwrap().unwrap_err();
    assert_eq!(err, FetchError::Cancelled);
    assert_eq!(source.attempts(), 1);
}
