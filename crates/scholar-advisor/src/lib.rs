//! Scholar Advisor
//!
//! Career-assessment assistant for Indonesian lecturers. Takes a pasted scholar
//! profile link, identifier, or name, fetches the citation profile, and asks a
//! text-generation model for a promotion-readiness narrative.
//!
//! # Features
//!
//! - **Forgiving input**: profile URLs, bare IDs, and IDs with trailing query
//!   parameters all normalize to the same identifier
//! - **Resilient fetch**: bounded retries with randomized backoff; a missing
//!   profile fails fast
//! - **Session cache**: repeated submissions of the same form skip the network
//! - **Model fallback**: unavailable generation models are skipped in order
//!
//! # Example
//!
//! ```no_run
//! use scholar_advisor::{Advisor, AdvisorRequest, Config, SessionCache};
//! use scholar_advisor::fetcher::CancelSignal;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     config.validate()?;
//!     let advisor = Advisor::from_config(&config)?;
//!     let mut session = SessionCache::new();
//!
//!     let request = AdvisorRequest::new("https://scholar.example/citations?user=3lUcciYAAAAJ&hl=en");
//!     let analysis = advisor.analyze(&request, &mut session, CancelSignal::never()).await?;
//!     println!("{}", analysis.narrative);
//!     Ok(())
//! }
//! ```

pub mod advisor;
pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod formatters;
pub mod generation;
pub mod models;
pub mod normalize;
pub mod server;
pub mod session;
pub mod source;

pub use advisor::{Advisor, Analysis, ProfileLookup};
pub use client::ScholarClient;
pub use config::Config;
pub use error::{AdvisorError, ClientError, FetchError, GenerationError};
pub use fetcher::ProfileFetcher;
pub use models::{AdvisorRequest, ProfileRecord};
pub use normalize::{SearchKey, classify, normalize};
pub use session::SessionCache;
