//! Academic profile API client.
//!
//! Provides async HTTP client with:
//! - Connection pooling via reqwest
//! - Request pacing shared across clones (governor)
//! - Response caching with 5-minute TTL
//! - Lazy, paginated author search
//!
//! Retries are not done here: [`ProfileFetcher`](crate::fetcher::ProfileFetcher)
//! owns the attempt budget.

mod middleware;

pub use middleware::RequestPacer;

use std::time::Duration;

use async_stream::stream;
use moka::future::Cache;
use reqwest::Client;
use url::Url;

use crate::config::{Config, api, fields};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    AuthorDetail, AuthorPapersResult, AuthorSearchResult, Candidate, PaperSummary, ProfileRecord,
};
use crate::source::{CandidateStream, ProfileSource};

/// Profile source client.
#[derive(Clone)]
pub struct ScholarClient {
    /// HTTP client.
    client: Client,

    /// Response cache.
    cache: Cache<String, serde_json::Value>,

    /// Whether caching is enabled.
    cache_enabled: bool,

    /// API key (optional).
    api_key: Option<String>,

    /// API base URL.
    base_url: Url,

    /// Request pacing.
    pacer: RequestPacer,

    /// Request timeout, reported on timeouts.
    request_timeout: Duration,

    /// Page size for name searches.
    search_page_size: u32,

    /// Publications requested during enrichment.
    publication_limit: u32,
}

impl ScholarClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails or the base URL
    /// cannot carry path segments.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::ACCEPT, "application/json".parse()?);

        if let Some(ref key) = config.scholar_api_key {
            headers.insert("x-api-key", key.parse()?);
        }

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("scholar-advisor/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let base_url = Url::parse(&config.scholar_api_url)?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "scholar API URL '{}' cannot take path segments",
            config.scholar_api_url
        );

        let cache = Cache::builder()
            .max_capacity(config.cache_max_size)
            .time_to_live(config.cache_ttl.max(Duration::from_millis(1)))
            .build();

        Ok(Self {
            client,
            cache,
            cache_enabled: config.cache_max_size > 0 && !config.cache_ttl.is_zero(),
            api_key: config.scholar_api_key.clone(),
            base_url,
            pacer: RequestPacer::new(config.rate_limit_delay),
            request_timeout: config.request_timeout,
            search_page_size: config.search_page_size.max(1),
            publication_limit: config.publication_limit,
        })
    }

    /// Check if an API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Get candidate fields for an author by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` on 404, other variants on API failure.
    pub async fn get_candidate(&self, author_id: &str) -> ClientResult<Candidate> {
        let url = self.endpoint(&["author", author_id]);
        let params = vec![("fields".to_string(), fields::CANDIDATE.join(","))];

        self.get(&url, &params).await
    }

    /// Get full author details by ID.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn get_author(&self, author_id: &str) -> ClientResult<AuthorDetail> {
        let url = self.endpoint(&["author", author_id]);
        let params = vec![("fields".to_string(), fields::PROFILE.join(","))];

        self.get(&url, &params).await
    }

    /// Get an author's publications, in the source's order.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn get_author_papers(
        &self,
        author_id: &str,
        limit: u32,
    ) -> ClientResult<Vec<PaperSummary>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let url = self.endpoint(&["author", author_id, "papers"]);
        let params = vec![
            ("limit".to_string(), limit.to_string()),
            ("fields".to_string(), fields::PUBLICATION.join(",")),
        ];

        let result: AuthorPapersResult = self.get(&url, &params).await?;
        Ok(result.data)
    }

    /// Search for authors (one page).
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search_authors(
        &self,
        query: &str,
        offset: i32,
        limit: u32,
    ) -> ClientResult<AuthorSearchResult> {
        let url = self.endpoint(&["author", "search"]);

        let params = vec![
            ("query".to_string(), query.to_string()),
            ("offset".to_string(), offset.to_string()),
            ("limit".to_string(), limit.to_string()),
            ("fields".to_string(), fields::CANDIDATE.join(",")),
        ];

        self.get(&url, &params).await
    }

    /// Stream search results page by page; a page is requested only when needed.
    pub fn search_authors_stream<'a>(&'a self, query: &'a str) -> CandidateStream<'a> {
        Box::pin(stream! {
            let mut offset = 0;
            loop {
                let page = match self.search_authors(query, offset, self.search_page_size).await {
                    Ok(page) => page,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                };
                tracing::debug!(query, offset, count = page.data.len(), "Author search page");

                let next = page.next;
                let empty = page.data.is_empty();
                for candidate in page.data {
                    yield Ok(candidate);
                }

                match next {
                    Some(n) if !empty && n > offset => offset = n,
                    _ => break,
                }
            }
        })
    }

    /// Append path segments to the base URL. Each segment is percent-encoded,
    /// so an id containing `/`, `?` or `#` stays a single segment.
    fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }

    /// Make a GET request.
    async fn get<T>(&self, url: &str, params: &[(String, String)]) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        // Check cache
        let cache_key = self.cache_key("GET", url, params);
        if self.cache_enabled {
            if let Some(cached) = self.cache.get(&cache_key).await {
                tracing::trace!(url, "Cache hit");
                return serde_json::from_value(cached).map_err(ClientError::from);
            }
        }

        self.pacer.ready().await;

        let response = self.client.get(url).query(params).send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout(self.request_timeout)
            } else {
                ClientError::from(e)
            }
        })?;

        let response = self.handle_response(response).await?;
        let value: serde_json::Value = response.json().await?;

        if self.cache_enabled {
            self.cache.insert(cache_key, value.clone()).await;
        }

        serde_json::from_value(value).map_err(ClientError::from)
    }

    /// Handle API response status codes.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);

                Err(ClientError::rate_limited(retry_after))
            }
            404 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::not_found(text))
            }
            400 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::bad_request(text))
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }

    /// Generate cache key.
    fn cache_key(&self, method: &str, url: &str, params: &[(String, String)]) -> String {
        use md5::{Digest, Md5};

        let mut hasher = Md5::new();
        hasher.update(method.as_bytes());
        hasher.update(b"|");
        hasher.update(url.as_bytes());
        hasher.update(b"|");

        for (k, v) in params {
            hasher.update(k.as_bytes());
            hasher.update(b"=");
            hasher.update(v.as_bytes());
            hasher.update(b"&");
        }

        format!("{:x}", hasher.finalize())
    }
}

#[async_trait::async_trait]
impl ProfileSource for ScholarClient {
    async fn lookup_by_id(&self, id: &str) -> ClientResult<Option<Candidate>> {
        match self.get_candidate(id).await {
            Ok(candidate) => Ok(Some(candidate)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn search_by_name<'a>(&'a self, name: &'a str) -> CandidateStream<'a> {
        self.search_authors_stream(name)
    }

    async fn enrich(&self, candidate: &Candidate) -> ClientResult<ProfileRecord> {
        let detail = self.get_author(&candidate.author_id).await?;
        let papers = self.get_author_papers(&candidate.author_id, self.publication_limit).await?;
        Ok(detail.into_record(candidate.name_or_id(), &papers))
    }
}

impl std::fmt::Debug for ScholarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScholarClient")
            .field("base_url", &self.base_url.as_str())
            .field("has_api_key", &self.has_api_key())
            .finish()
    }
}
