//! Page fetcher implementations.
//!
//! - `HttpFetcher` - reqwest GET/HEAD with a bounded timeout
//! - `GuardedFetcher` - SSRF validation and URL normalization around any fetcher
//!
//! # Example
//!
//! ```rust,ignore
//! use feedback_analysis::fetchers::{GuardedFetcher, HttpFetcher};
//!
//! let fetcher = GuardedFetcher::new(HttpFetcher::new(&FetchConfig::default())?);
//! let page = fetcher.fetch("https://example.com/reviews").await?;
//! ```

mod guarded;
mod http;
pub mod normalize;

pub use guarded::GuardedFetcher;
pub use http::HttpFetcher;
pub use normalize::normalize_url;

// Re-export from traits for convenience
pub use crate::traits::fetcher::{FetchedPage, PageFetcher};
