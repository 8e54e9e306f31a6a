//! The boundary to the external academic-profile source.

use futures::stream::BoxStream;

use crate::error::ClientResult;
use crate::models::{Candidate, ProfileRecord};

/// Lazily produced search results, in the source's relevance order.
pub type CandidateStream<'a> = BoxStream<'a, ClientResult<Candidate>>;

/// Remote operations the fetcher consumes.
///
/// Each call may be slow, rate limited, or fail outright. The fetcher treats
/// [`ClientError::NotFound`](crate::error::ClientError::NotFound) from a lookup as
/// terminal and every other error as transient.
#[async_trait::async_trait]
pub trait ProfileSource: Send + Sync {
    /// Look a profile up by identifier. `Ok(None)` means the source has no such profile.
    async fn lookup_by_id(&self, id: &str) -> ClientResult<Option<Candidate>>;

    /// Search profiles by name. The stream is lazy; callers usually take one item.
    fn search_by_name<'a>(&'a self, name: &'a str) -> CandidateStream<'a>;

    /// Expand a candidate into the full record (metrics and publications).
    async fn enrich(&self, candidate: &Candidate) -> ClientResult<ProfileRecord>;
}
